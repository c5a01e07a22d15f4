use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{AgentAffiliation, DeviceFeed};
use crate::utils::constants::{CURRENT_MISSING_VALUE, LEGACY_MISSING_VALUE};

/// Which sensor-service API generation produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    Legacy,
    Current,
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiVersion::Legacy => write!(f, "legacy"),
            ApiVersion::Current => write!(f, "current"),
        }
    }
}

/// Sign convention of the vertical-position column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalConvention {
    /// Depth below the surface, positive down.
    DownPositive,
    /// Height relative to the surface, positive up.
    UpPositive,
}

impl VerticalConvention {
    pub fn positive(&self) -> &'static str {
        match self {
            VerticalConvention::DownPositive => "down",
            VerticalConvention::UpPositive => "up",
        }
    }

    /// Convert a positive-down depth reported by the sensor service into this convention.
    pub fn from_depth(&self, depth: f64) -> f64 {
        match self {
            VerticalConvention::DownPositive => depth,
            VerticalConvention::UpPositive if depth == 0.0 => 0.0,
            VerticalConvention::UpPositive => -depth,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentDetails {
    pub platform_type: String,
    pub wmo_id: Option<String>,
    pub qc_info_url: Option<String>,
    pub archive_path: Option<String>,
    pub submit_to_ndbc: bool,
    /// Stations migrated from the legacy system carry no QARTOD results.
    pub qc_enabled: bool,
    pub creator: AgentAffiliation,
    pub publisher: AgentAffiliation,
    pub contributors: Vec<AgentAffiliation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationVariant {
    Legacy,
    Current(Box<CurrentDetails>),
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Station {
    pub id: i64,

    #[validate(length(min = 1))]
    pub label: String,

    pub urn: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Epoch seconds.
    pub start_time: i64,
    pub end_time: i64,

    pub min_z: f64,
    pub max_z: f64,

    pub device_feeds: Vec<DeviceFeed>,
    pub variant: StationVariant,
}

impl Station {
    pub fn api_version(&self) -> ApiVersion {
        match self.variant {
            StationVariant::Legacy => ApiVersion::Legacy,
            StationVariant::Current(_) => ApiVersion::Current,
        }
    }

    pub fn current_details(&self) -> Option<&CurrentDetails> {
        match &self.variant {
            StationVariant::Current(details) => Some(details),
            StationVariant::Legacy => None,
        }
    }

    pub fn qc_enabled(&self) -> bool {
        self.current_details().is_some_and(|d| d.qc_enabled)
    }

    pub fn vertical_convention(&self) -> VerticalConvention {
        match self.variant {
            StationVariant::Legacy => VerticalConvention::DownPositive,
            StationVariant::Current(_) => VerticalConvention::UpPositive,
        }
    }

    /// Missing value advertised on device-feed columns.
    pub fn missing_value(&self) -> f64 {
        match self.variant {
            StationVariant::Legacy => LEGACY_MISSING_VALUE,
            StationVariant::Current(_) => CURRENT_MISSING_VALUE,
        }
    }

    pub fn device_feed(&self, feed_id: i64) -> Option<&DeviceFeed> {
        self.device_feeds.iter().find(|df| df.id == feed_id)
    }

    /// Name of the table column carrying a feed's values.
    ///
    /// Legacy tables key columns by canonical name, current ones by feed id, so a
    /// feed sampled at several depths always lands in one column.
    pub fn value_column(&self, feed: &DeviceFeed) -> String {
        match self.variant {
            StationVariant::Legacy => feed.canonical_name(),
            StationVariant::Current(_) => format!("value_{}", feed.id),
        }
    }

    pub fn qc_agg_column(&self, feed: &DeviceFeed) -> String {
        format!("qc_agg_{}", feed.id)
    }

    pub fn qc_tests_column(&self, feed: &DeviceFeed) -> String {
        format!("qc_tests_{}", feed.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_station(latitude: f64) -> Station {
        Station {
            id: 60387,
            label: "42013 - C10 - WFS Central Buoy, 25m Isobath".to_string(),
            urn: "urn:ioos:station:edu.usf.marine.comps:C10".to_string(),
            latitude,
            longitude: -82.924,
            start_time: 1449788400,
            end_time: 1539822900,
            min_z: 0.0,
            max_z: 22.38,
            device_feeds: Vec::new(),
            variant: StationVariant::Legacy,
        }
    }

    #[test]
    fn test_station_validation() {
        let station = legacy_station(27.173);

        assert!(station.validate().is_ok());
        assert_eq!(station.api_version(), ApiVersion::Legacy);
        assert!(!station.qc_enabled());
        assert_eq!(station.missing_value(), -9999.99);
    }

    #[test]
    fn test_invalid_coordinates() {
        let station = legacy_station(91.0);

        assert!(station.validate().is_err());
    }

    #[test]
    fn test_vertical_convention() {
        assert_eq!(VerticalConvention::DownPositive.from_depth(4.5), 4.5);
        assert_eq!(VerticalConvention::UpPositive.from_depth(4.5), -4.5);
        assert_eq!(VerticalConvention::UpPositive.from_depth(0.0), 0.0);
        assert!(VerticalConvention::UpPositive
            .from_depth(0.0)
            .is_sign_positive());
        assert_eq!(VerticalConvention::UpPositive.positive(), "up");
    }
}
