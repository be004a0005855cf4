//! Sun position for a place and instant, computed with the NREL solar position
//! algorithm from `spa_sra`.

use crate::dataset::error::{ExportError, SolarPositionError};
use crate::dataset::joiner::DerivedFeature;
use chrono::{DateTime, Local, Utc};
use spa_sra::spa::{Function, Input, SpaData};

/// Sun position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Angle above the horizon, negative below it.
    pub altitude: f64,
    /// Clockwise from north: 90 is east, 180 south.
    pub azimuth: f64,
}

pub trait SolarPosition: Send + Sync {
    fn position(&self, latitude: f64, longitude: f64, at: DateTime<Utc>) -> Result<SunPosition, SolarPositionError>;
}

/// Topocentric zenith and azimuth from SPA, with refraction for a standard atmosphere.
#[derive(Debug, Clone, Copy)]
pub struct SpaSolarPosition {
    /// Site elevation in meters.
    pub elevation: f64,
    /// Annual mean pressure in millibars.
    pub pressure: f64,
    /// Annual mean temperature in degrees Celsius.
    pub temperature: f64,
}

impl Default for SpaSolarPosition {
    fn default() -> Self {
        Self {
            elevation: 0.0,
            pressure: 1013.0,
            temperature: 10.0,
        }
    }
}

impl SolarPosition for SpaSolarPosition {
    fn position(&self, latitude: f64, longitude: f64, at: DateTime<Utc>) -> Result<SunPosition, SolarPositionError> {
        let mut input = Input::from_date_time(at.with_timezone(&Local));
        input.latitude = latitude;
        input.longitude = longitude;
        input.elevation = self.elevation;
        input.pressure = self.pressure;
        input.temperature = self.temperature;
        input.function = Function::SpaZa;

        let mut spa = SpaData::new(input);
        spa.spa_calculate().map_err(|e| SolarPositionError {
            timestamp: at,
            message: e.to_string(),
        })?;

        Ok(SunPosition {
            altitude: 90.0 - spa.spa_za.zenith,
            azimuth: spa.spa_za.azimuth,
        })
    }
}

/// The `alt` and `azi` columns of the joined dataset for one fixed location.
pub struct SolarGeometryFeature<P: SolarPosition> {
    position: P,
    latitude: f64,
    longitude: f64,
}

impl<P: SolarPosition> SolarGeometryFeature<P> {
    pub fn new(position: P, latitude: f64, longitude: f64) -> Self {
        Self {
            position,
            latitude,
            longitude,
        }
    }
}

impl<P: SolarPosition> DerivedFeature for SolarGeometryFeature<P> {
    fn names(&self) -> &'static [&'static str] {
        &["alt", "azi"]
    }

    fn compute(&self, at: DateTime<Utc>) -> Result<Vec<f64>, ExportError> {
        let sun = self.position.position(self.latitude, self.longitude, at)?;
        Ok(vec![sun.altitude, sun.azimuth])
    }
}
