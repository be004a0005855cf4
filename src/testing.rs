//! Test doubles for the network and the clock.

use crate::clients::error::ClientError;
use crate::clients::transport::JsonTransport;
use crate::clock::Clock;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Mutex;

type Responder = Box<dyn Fn(&str, &[(String, String)]) -> Result<Value, ClientError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A [`JsonTransport`] answering from a closure and recording every request.
pub struct ScriptedTransport {
    responder: Responder,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&str, &[(String, String)]) -> Result<Value, ClientError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(body: Value) -> Self {
        Self::new(move |_, _| Ok(body.clone()))
    }

    pub fn failing_with_status(code: u16) -> Self {
        Self::new(move |url, _| {
            Err(ClientError::Upstream {
                url: url.to_string(),
                status: StatusCode::from_u16(code).unwrap(),
            })
        })
    }

    /// Number of requests that reached the network.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonTransport for ScriptedTransport {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            query: query.to_vec(),
        });
        (self.responder)(url, query)
    }
}

/// A clock that tests move by hand.
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap() = today;
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

/// Epoch milliseconds of the first forecast hour served by [`fake_providers`], 2024-03-01 06:00 UTC.
pub const FORECAST_START_MS: i64 = 1_709_272_800_000;

/// Serves every provider endpoint the crate talks to.
///
/// * SolarEdge: one site with id 77 whose data period is `period_start..=period_end`. Each
///   requested day has four quarter hours from 12:00 local, the last one null.
/// * KNMI history: all 24 hours of every requested day, with `T = 150`, `DR = 0` and `N = 6`.
/// * KNMI forecast: three hours starting at [`FORECAST_START_MS`].
pub fn fake_providers(period_start: NaiveDate, period_end: NaiveDate) -> ScriptedTransport {
    ScriptedTransport::new(move |url, query| {
        let param = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };

        if url.ends_with("/sites/list") {
            Ok(json!({"sites": {"count": 1, "site": [{"id": 77, "name": "Dak"}]}}))
        } else if url.ends_with("/dataPeriod") {
            Ok(json!({"dataPeriod": {
                "startDate": period_start.to_string(),
                "endDate": period_end.to_string()
            }}))
        } else if url.ends_with("/energy") {
            let from = NaiveDate::parse_from_str(&param("startDate"), "%Y-%m-%d").unwrap();
            let to = NaiveDate::parse_from_str(&param("endDate"), "%Y-%m-%d").unwrap();
            let mut values = Vec::new();
            for day in days(from, to) {
                for quarter in 0..4u32 {
                    let value = if quarter == 3 {
                        Value::Null
                    } else {
                        json!(100.0 + f64::from(quarter))
                    };
                    values.push(json!({
                        "date": format!("{} 12:{:02}:00", day, quarter * 15),
                        "value": value
                    }));
                }
            }
            Ok(json!({"energy": {"timeUnit": "QUARTER_OF_AN_HOUR", "unit": "Wh", "values": values}}))
        } else if url.contains("uurgegevens") {
            let from = NaiveDate::parse_from_str(&param("start"), "%Y%m%d").unwrap();
            let to = NaiveDate::parse_from_str(&param("end"), "%Y%m%d").unwrap();
            let mut records = Vec::new();
            for day in days(from, to) {
                for hour in 1..=24 {
                    records.push(json!({
                        "station_code": 377,
                        "date": format!("{}T00:00:00.000Z", day),
                        "hour": hour,
                        "T": 150,
                        "DR": 0,
                        "N": 6
                    }));
                }
            }
            Ok(Value::Array(records))
        } else if url.ends_with("_Expert_20010.json") {
            let hours: Vec<i64> = (0..3).map(|h| FORECAST_START_MS + h * 3_600_000).collect();
            let category = |share: f64| hours.iter().map(|ms| json!([ms, share])).collect::<Vec<_>>();
            Ok(json!({"series": [
                {"name": "Onbewolkt", "data": category(20.0)},
                {"name": "Licht bewolkt", "data": category(20.0)},
                {"name": "Half bewolkt", "data": category(20.0)},
                {"name": "Zwaar bewolkt", "data": category(20.0)},
                {"name": "Geheel bewolkt", "data": category(20.0)}
            ]}))
        } else if url.contains("_Expert_") {
            let data: Vec<Value> = (0..3)
                .map(|h| json!([FORECAST_START_MS + h * 3_600_000, 5.0 + h as f64]))
                .collect();
            Ok(json!({"series": [{"name": "Hoge resolutie", "data": data}]}))
        } else {
            Err(ClientError::Upstream {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            })
        }
    })
}

fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(from), |day| day.checked_add_days(Days::new(1)))
        .take_while(move |day| *day <= to)
}
