use crate::clients::knmi::KnmiForecastClient;
use crate::dataset::joiner::SeriesJoiner;
use crate::error::DatasetError;
use crate::store::export::ForecastTable;
use crate::types::records::ForecastRecord;
use log::info;

/// Replaces the stored forecast with the current iPluim forecast.
pub struct ForecastJob {
    client: KnmiForecastClient,
    table: ForecastTable,
}

impl ForecastJob {
    pub fn new(client: KnmiForecastClient, table: ForecastTable) -> Self {
        Self { client, table }
    }

    /// Returns the number of forecast hours stored. Hours missing from any of the
    /// three elements are left out.
    pub async fn run(&self) -> Result<usize, DatasetError> {
        let temperature = self.client.temperature().await?;
        let precipitation = self.client.precipitation().await?;
        let clouds = self.client.cloud_cover().await?;

        let frame = SeriesJoiner.join(
            &[
                ("temperatuur", &temperature),
                ("neerslag", &precipitation),
                ("bewolking", &clouds),
            ],
            None,
        )?;
        let records: Vec<ForecastRecord> = frame
            .rows()
            .iter()
            .map(|row| ForecastRecord {
                timestamp: row.timestamp,
                temperatuur: row.values[0],
                neerslag: row.values[1],
                bewolking: row.values[2],
            })
            .collect();

        self.table.replace(&records).await?;
        info!("Stored forecast for {} hour(s)", records.len());
        Ok(records.len())
    }
}
