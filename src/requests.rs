use serde::Serialize;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};
use crate::models::Station;
use crate::utils::time::{now_seconds, seconds_from_utc_string};
use crate::utils::TIME_SERIES_LABEL;

/// One already-parsed `variable op value` constraint from the host's query.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub variable: String,
    pub op: String,
    pub value: String,
}

impl Constraint {
    pub fn new(variable: &str, op: &str, value: &str) -> Self {
        Self {
            variable: variable.to_string(),
            op: op.to_string(),
            value: value.to_string(),
        }
    }

    fn is_operator(c: char) -> bool {
        matches!(c, '<' | '>' | '=' | '!' | '~')
    }

    fn seconds(&self) -> Result<i64> {
        let value = self.value.trim();
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v as i64),
            _ => seconds_from_utc_string(value).map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "Invalid {} constraint value: '{}'",
                    self.variable, self.value
                ))
            }),
        }
    }
}

impl FromStr for Constraint {
    type Err = String;

    /// Parse `variable<op>value`, e.g. `time>=1513015500`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let start = s
            .find(Self::is_operator)
            .ok_or_else(|| format!("No operator in constraint '{}'", s))?;
        let end = s[start..]
            .find(|c| !Self::is_operator(c))
            .map_or(s.len(), |i| start + i);
        let variable = s[..start].trim();
        if variable.is_empty() {
            return Err(format!("No variable in constraint '{}'", s));
        }
        Ok(Constraint::new(variable, &s[start..end], s[end..].trim()))
    }
}

/// Inclusive request window in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub begin: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Build a window from `time` constraints; without an upper bound the window ends
    /// `padding_secs` after now.
    pub fn from_constraints(constraints: &[Constraint], padding_secs: i64) -> Result<Self> {
        Self::from_constraints_at(constraints, now_seconds(), padding_secs)
    }

    pub fn from_constraints_at(constraints: &[Constraint], now: i64, padding_secs: i64) -> Result<Self> {
        let mut window = TimeWindow {
            begin: 0,
            end: now + padding_secs,
        };
        for constraint in constraints.iter().filter(|c| c.variable == TIME_SERIES_LABEL) {
            if constraint.op.starts_with('>') {
                window.begin = constraint.seconds()?;
            } else if constraint.op.starts_with('<') {
                window.end = constraint.seconds()?;
            }
        }
        Ok(window)
    }
}

/// Body of a current-API metadata request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorFilter {
    pub stations: Vec<i64>,
    #[serde(rename = "parameterGroups")]
    pub parameter_groups: Vec<i64>,
}

impl SensorFilter {
    pub fn for_station(station_id: i64) -> Self {
        Self {
            stations: vec![station_id],
            parameter_groups: Vec::new(),
        }
    }

    pub fn with_parameter_groups(mut self, parameter_groups: Vec<i64>) -> Self {
        self.parameter_groups = parameter_groups;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Query parameters for the legacy station metadata endpoint.
pub fn legacy_metadata_query_params(station_id: i64) -> Vec<(&'static str, String)> {
    vec![
        ("method", "GetStationsResultSetRowsJSON".to_string()),
        ("version", "3".to_string()),
        ("stationids", station_id.to_string()),
        ("region", "all".to_string()),
        ("realtimeonly", "false".to_string()),
        ("verbose", "true".to_string()),
        ("jsoncallback", "false".to_string()),
    ]
}

/// A legacy-style observation query for every parameter a station reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRequest {
    pub station_id: i64,
    pub parameter_ids: Vec<i64>,
    /// `(parameter id, unit symbol)` pairs.
    pub units: Vec<(i64, String)>,
    pub window: TimeWindow,
}

impl ObservationRequest {
    /// Parameters are listed once each, in device-feed order.
    pub fn for_station(station: &Station, window: TimeWindow) -> Self {
        let mut parameter_ids = Vec::new();
        let mut units = Vec::new();
        for feed in &station.device_feeds {
            let sp = &feed.sensor_parameter;
            let parameter_id = sp.parameter.id;
            if parameter_ids.contains(&parameter_id) {
                continue;
            }
            parameter_ids.push(parameter_id);
            units.push((parameter_id, sp.unit.symbol.clone()));
        }
        Self {
            station_id: station.id,
            parameter_ids,
            units,
            window,
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let parameter_ids: Vec<String> = self.parameter_ids.iter().map(|id| id.to_string()).collect();
        let units: Vec<String> = self
            .units
            .iter()
            .map(|(id, unit)| format!("{};{}", id, unit))
            .collect();
        vec![
            ("stationid", self.station_id.to_string()),
            ("parameterids", parameter_ids.join(",")),
            ("units", units.join(",")),
            ("start_time", self.window.begin.to_string()),
            ("end_time", self.window.end.to_string()),
            ("jsoncallback", "false".to_string()),
            ("version", "3".to_string()),
            ("force_binned_data", "false".to_string()),
            ("method", "GetSensorObservationsJSON".to_string()),
        ]
    }
}
