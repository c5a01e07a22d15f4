use std::sync::Arc;

use crate::models::SensorParameter;
use crate::utils::naming;

/// One physical sensor's data stream at a station.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFeed {
    pub id: i64,
    pub sensor_parameter: Arc<SensorParameter>,
    /// Disambiguates identical sensors at one station; may be empty.
    pub discriminant: String,
    pub min_z: f64,
    pub max_z: f64,
}

impl DeviceFeed {
    pub fn new(
        id: i64,
        sensor_parameter: Arc<SensorParameter>,
        discriminant: String,
        min_z: f64,
        max_z: f64,
    ) -> Self {
        Self {
            id,
            sensor_parameter,
            discriminant,
            min_z,
            max_z,
        }
    }

    pub fn canonical_name(&self) -> String {
        naming::canonical_name(&self.sensor_parameter, &self.discriminant)
    }

    pub fn standard_name(&self) -> &str {
        self.sensor_parameter.standard_name()
    }

    pub fn long_name(&self) -> &str {
        &self.sensor_parameter.parameter.label
    }
}
