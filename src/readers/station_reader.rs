use crate::error::{ProcessingError, Result};
use crate::models::{
    AffiliationKind, AgentAffiliation, Catalog, CurrentDetails, DeviceFeed, SensorParameter,
    Station, StationVariant,
};
use crate::utils::constants::SUBMIT_TO_NDBC_TAG;
use crate::utils::time::seconds_from_utc_string;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Deserialize)]
struct CurrentEnvelope {
    data: CurrentMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentMetadata {
    stations: Vec<RawCurrentStation>,
    device_feeds: Vec<RawDeviceFeed>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentStation {
    id: i64,
    label: String,
    uuid: String,
    platform_type: String,
    location: RawLocation,
    feed_stats: RawFeedStats,
    affiliations: Vec<RawAffiliation>,
    #[serde(default)]
    tags: Vec<String>,
    qc_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedStats {
    start_date: String,
    end_date: String,
    qc_info_url: Option<String>,
    archive_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAffiliation {
    agent_id: i64,
    #[serde(rename = "type")]
    affiliation_type: String,
    foreign_name: Option<String>,
    foreign_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeviceFeed {
    id: i64,
    sensor_parameter_id: i64,
    discriminant: Option<String>,
    min_z: f64,
    max_z: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDocument {
    stations: Vec<RawLegacyStation>,
    #[serde(default)]
    enhanced_parameters: HashMap<String, RawEnhancedParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLegacyStation {
    id: i64,
    label: String,
    urn: String,
    latitude: f64,
    longitude: f64,
    start_date: i64,
    end_date: i64,
    #[serde(default)]
    parameters: Vec<RawStationParameter>,
}

#[derive(Debug, Deserialize)]
struct RawStationParameter {
    #[serde(default)]
    devices: Vec<RawLegacyDevice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLegacyDevice {
    id: i64,
    enhanced_parameter_id: i64,
    discriminant: Option<String>,
    depth_min: f64,
    depth_max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnhancedParameter {
    parameter_id: i64,
    cell_methods: Option<String>,
    interval: Option<String>,
    vertical_datum: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Vertical extent across all feeds: lowest minimum, highest maximum.
fn vertical_extent(feeds: &[DeviceFeed], station_id: i64) -> Result<(f64, f64)> {
    if feeds.is_empty() {
        return Err(ProcessingError::MissingData(format!(
            "station {} has no device feeds",
            station_id
        )));
    }
    let min_z = feeds.iter().map(|f| f.min_z).fold(f64::INFINITY, f64::min);
    let max_z = feeds.iter().map(|f| f.max_z).fold(f64::NEG_INFINITY, f64::max);
    Ok((min_z, max_z))
}

/// Resolves a station metadata document into a [`Station`] against a shared catalog.
pub struct StationReader<'a> {
    catalog: &'a Catalog,
    station_id: Option<i64>,
}

impl<'a> StationReader<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            station_id: None,
        }
    }

    /// Station id that was requested; only used to report an empty result.
    pub fn with_station_id(mut self, station_id: Option<i64>) -> Self {
        self.station_id = station_id;
        self
    }

    fn no_station(&self) -> ProcessingError {
        ProcessingError::NoStationFound {
            station_id: self.station_id,
        }
    }

    /// Resolve a `{"data": {"stations": [...], "deviceFeeds": [...]}}` document.
    pub fn read_current(&self, document: &Value) -> Result<Station> {
        let envelope = CurrentEnvelope::deserialize(document)?;
        let metadata = envelope.data;
        let raw = metadata
            .stations
            .into_iter()
            .next()
            .ok_or_else(|| self.no_station())?;

        let device_feeds = metadata
            .device_feeds
            .into_iter()
            .map(|df| {
                let sensor_parameter = self.catalog.sensor_parameter(df.sensor_parameter_id)?;
                Ok(DeviceFeed::new(
                    df.id,
                    Arc::clone(sensor_parameter),
                    df.discriminant.unwrap_or_default(),
                    df.min_z,
                    df.max_z,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        let (min_z, max_z) = vertical_extent(&device_feeds, raw.id)?;

        let (longitude, latitude) = match raw.location.coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => {
                return Err(ProcessingError::MissingData(format!(
                    "station {} location needs [lon, lat] coordinates",
                    raw.id
                )))
            }
        };

        let start_time = seconds_from_utc_string(&raw.feed_stats.start_date)?;
        let end_time = seconds_from_utc_string(&raw.feed_stats.end_date)?;

        let mut creator = None;
        let mut publisher = None;
        let mut contributors = Vec::new();
        let mut wmo_id = None;
        for affiliation in raw.affiliations {
            let agent = Arc::clone(self.catalog.agent(affiliation.agent_id)?);
            let resolved = AgentAffiliation {
                role: self.catalog.role_for(&affiliation.affiliation_type),
                affiliation_type: affiliation.affiliation_type,
                agent,
                foreign_name: non_empty(affiliation.foreign_name),
                foreign_url: non_empty(affiliation.foreign_url),
            };

            if resolved.agent.is_wmo() {
                wmo_id = resolved.foreign_name.clone();
            }

            match resolved.kind() {
                AffiliationKind::Creator => {
                    if creator.replace(resolved).is_some() {
                        return Err(ProcessingError::InvalidFormat(format!(
                            "station {} has more than one owner affiliation",
                            raw.id
                        )));
                    }
                }
                AffiliationKind::Publisher => {
                    if publisher.replace(resolved).is_some() {
                        return Err(ProcessingError::InvalidFormat(format!(
                            "station {} has more than one publisher affiliation",
                            raw.id
                        )));
                    }
                }
                AffiliationKind::Contributor => contributors.push(resolved),
            }
        }
        let creator = creator.ok_or_else(|| {
            ProcessingError::MissingData(format!("station {} has no owner affiliation", raw.id))
        })?;
        let publisher = publisher.ok_or_else(|| {
            ProcessingError::MissingData(format!("station {} has no publisher affiliation", raw.id))
        })?;

        let details = CurrentDetails {
            platform_type: raw.platform_type,
            wmo_id,
            qc_info_url: non_empty(raw.feed_stats.qc_info_url),
            archive_path: non_empty(raw.feed_stats.archive_path),
            submit_to_ndbc: raw.tags.iter().any(|t| t == SUBMIT_TO_NDBC_TAG),
            qc_enabled: raw.qc_enabled.unwrap_or(true),
            creator,
            publisher,
            contributors,
        };

        let station = Station {
            id: raw.id,
            label: raw.label,
            urn: raw.uuid,
            latitude,
            longitude,
            start_time,
            end_time,
            min_z,
            max_z,
            device_feeds,
            variant: StationVariant::Current(Box::new(details)),
        };
        station.validate()?;

        info!(
            "Resolved current station {} '{}' with {} device feeds",
            station.id,
            station.label,
            station.device_feeds.len()
        );
        Ok(station)
    }

    /// Resolve a `{"stations": [...], "enhancedParameters": {...}}` document.
    pub fn read_legacy(&self, document: &Value) -> Result<Station> {
        let legacy = LegacyDocument::deserialize(document)?;

        let mut sensor_parameters: HashMap<i64, Arc<SensorParameter>> =
            HashMap::with_capacity(legacy.enhanced_parameters.len());
        for (key, ep) in legacy.enhanced_parameters {
            let id: i64 = key.parse().map_err(|_| {
                ProcessingError::InvalidFormat(format!("Invalid enhanced parameter id: '{}'", key))
            })?;
            let parameter = Arc::clone(self.catalog.parameter(ep.parameter_id)?);
            let unit = parameter
                .default_unit()
                .cloned()
                .ok_or_else(|| ProcessingError::lookup("unit", ep.parameter_id))?;
            sensor_parameters.insert(
                id,
                Arc::new(SensorParameter::new(
                    id,
                    parameter,
                    unit,
                    ep.cell_methods.unwrap_or_default(),
                    ep.interval.unwrap_or_default(),
                    ep.vertical_datum.unwrap_or_default(),
                )),
            );
        }

        let raw = legacy
            .stations
            .into_iter()
            .next()
            .ok_or_else(|| self.no_station())?;

        let mut device_feeds = Vec::new();
        for device in raw.parameters.into_iter().flat_map(|p| p.devices) {
            let sensor_parameter = sensor_parameters
                .get(&device.enhanced_parameter_id)
                .cloned()
                .ok_or_else(|| {
                    ProcessingError::lookup("enhanced parameter", device.enhanced_parameter_id)
                })?;
            debug!(
                "Station {} device {} uses enhanced parameter {}",
                raw.id, device.id, device.enhanced_parameter_id
            );
            device_feeds.push(DeviceFeed::new(
                device.id,
                sensor_parameter,
                device.discriminant.unwrap_or_default(),
                device.depth_min,
                device.depth_max,
            ));
        }
        let (min_z, max_z) = vertical_extent(&device_feeds, raw.id)?;

        let station = Station {
            id: raw.id,
            label: raw.label,
            urn: raw.urn,
            latitude: raw.latitude,
            longitude: raw.longitude,
            start_time: raw.start_date,
            end_time: raw.end_date,
            min_z,
            max_z,
            device_feeds,
            variant: StationVariant::Legacy,
        };
        station.validate()?;

        info!(
            "Resolved legacy station {} '{}' with {} devices",
            station.id,
            station.label,
            station.device_feeds.len()
        );
        Ok(station)
    }
}
