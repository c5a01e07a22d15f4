use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::{AssembledTable, Cell, ColumnType, DeviceFeed, Station, StationVariant};
use crate::utils::constants::{MISSING_VALUE_SENTINEL, QC_FLAG_MISSING, TIME_SERIES_LABEL};
use crate::utils::time::seconds_from_utc_string;

#[derive(Debug, Deserialize)]
struct Block {
    #[serde(default)]
    data: Vec<Series>,
}

#[derive(Debug, Deserialize)]
struct Series {
    metadata: SeriesMetadata,
    #[serde(rename = "variableValueCollection")]
    collection: ValueCollection,
}

#[derive(Debug, Deserialize)]
struct SeriesMetadata {
    label: String,
    device_id: Option<i64>,
    depth: Option<f64>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueCollection {
    #[serde(default)]
    values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GroupedEnvelope {
    data: GroupedData,
}

#[derive(Debug, Deserialize)]
struct GroupedData {
    #[serde(rename = "groupedFeeds", default)]
    grouped_feeds: Vec<GroupedFeed>,
}

#[derive(Debug, Deserialize)]
struct GroupedFeed {
    metadata: GroupMetadata,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct GroupMetadata {
    time: ColumnRef,
    #[serde(default)]
    lon: Option<ColumnRef>,
    #[serde(default)]
    lat: Option<ColumnRef>,
    #[serde(default)]
    z: Option<ColumnRef>,
    #[serde(default)]
    values: Vec<ValueRef>,
    #[serde(default)]
    qartod: Vec<QartodRef>,
}

#[derive(Debug, Deserialize)]
struct ColumnRef {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ValueRef {
    index: usize,
    #[serde(rename = "deviceFeedIds")]
    device_feed_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct QartodRef {
    index: usize,
    #[serde(rename = "testsIndex")]
    tests_index: Option<usize>,
}

/// Parse one sample; anything that is not a finite number is a recoverable error.
pub fn parse_sample(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ProcessingError::MalformedValue(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ProcessingError::MalformedValue(s.clone())),
        other => Err(ProcessingError::MalformedValue(other.to_string())),
    }
}

/// Parse a sample, substituting the missing-value sentinel when it is malformed.
fn sample_or_sentinel(value: &Value) -> Result<f64> {
    match parse_sample(value) {
        Ok(v) => Ok(v),
        Err(e) if e.is_recoverable() => {
            debug!("{}; using {}", e, MISSING_VALUE_SENTINEL);
            Ok(MISSING_VALUE_SENTINEL)
        }
        Err(e) => Err(e),
    }
}

/// Time stamps are epoch seconds or ISO-8601 strings; anything else aborts assembly.
fn parse_time(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid time value: {}", n))),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => Ok(v),
            Err(_) => Ok(seconds_from_utc_string(s)? as f64),
        },
        other => Err(ProcessingError::InvalidFormat(format!(
            "Invalid time value: {}",
            other
        ))),
    }
}

fn parse_qc_flag(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(QC_FLAG_MISSING),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(QC_FLAG_MISSING),
        _ => QC_FLAG_MISSING,
    }
}

fn parse_qc_tests(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Column names of the shared time/location/identifier columns.
struct AxisColumns {
    station: &'static str,
    longitude: &'static str,
    latitude: &'static str,
    time: &'static str,
    vertical: &'static str,
}

const LEGACY_AXES: AxisColumns = AxisColumns {
    station: "station",
    longitude: "longitude",
    latitude: "latitude",
    time: "time",
    vertical: "depth",
};

const CURRENT_AXES: AxisColumns = AxisColumns {
    station: "station",
    longitude: "lon",
    latitude: "lat",
    time: "time",
    vertical: "z",
};

/// Flattens a station's time-series payload into an [`AssembledTable`].
pub struct TableAssembler<'a> {
    station: &'a Station,
    axes: &'static AxisColumns,
}

impl<'a> TableAssembler<'a> {
    pub fn new(station: &'a Station) -> Self {
        let axes = match station.variant {
            StationVariant::Legacy => &LEGACY_AXES,
            StationVariant::Current(_) => &CURRENT_AXES,
        };
        Self { station, axes }
    }

    /// Empty table with every column this station can produce, in output order.
    fn prepare(&self) -> AssembledTable {
        let axes = self.axes;
        let sentinel = Cell::F64(MISSING_VALUE_SENTINEL);
        let fill = Cell::F64(self.station.missing_value());
        let mut table = AssembledTable::new();
        table.add_column(axes.station, ColumnType::String, Cell::Str(String::new()), true);
        table.add_column(axes.longitude, ColumnType::Double, sentinel.clone(), true);
        table.add_column(axes.latitude, ColumnType::Double, sentinel.clone(), true);
        table.add_column(axes.time, ColumnType::Double, sentinel.clone(), false);
        table.add_column(axes.vertical, ColumnType::Double, sentinel.clone(), false);

        let qc = self.station.qc_enabled();
        for feed in &self.station.device_feeds {
            table.add_column(
                &self.station.value_column(feed),
                ColumnType::Double,
                fill.clone(),
                false,
            );
            if qc {
                table.add_column(
                    &self.station.qc_agg_column(feed),
                    ColumnType::Int,
                    Cell::I64(QC_FLAG_MISSING),
                    false,
                );
                table.add_column(
                    &self.station.qc_tests_column(feed),
                    ColumnType::String,
                    Cell::Str(String::new()),
                    false,
                );
            }
        }
        table
    }

    fn resolve_feed(&self, feed_id: i64) -> Option<&'a DeviceFeed> {
        let station: &'a Station = self.station;
        match station.device_feed(feed_id) {
            Some(feed) => Some(feed),
            None => {
                debug!("{}; skipping", ProcessingError::UnresolvedFeed { feed_id });
                None
            }
        }
    }

    /// Station label and position are written once and back-filled on finish.
    fn finish(&self, mut table: AssembledTable) -> AssembledTable {
        if table.is_empty() {
            debug!("No data rows for station {}", self.station.id);
            return table;
        }
        let axes = self.axes;
        if table.column_len(axes.station) == 0 {
            table.push_str(axes.station, &self.station.label);
        }
        if table.column_len(axes.longitude) == 0 {
            table.push_f64(axes.longitude, self.station.longitude);
        }
        if table.column_len(axes.latitude) == 0 {
            table.push_f64(axes.latitude, self.station.latitude);
        }
        let table = table.finish();
        info!(
            "Assembled {} rows x {} columns for station {}",
            table.row_count(),
            table.columns().len(),
            self.station.id
        );
        table
    }

    /// Assemble `[{"data": [{"metadata": {...}, "variableValueCollection": {"values": [...]}}]}]`.
    ///
    /// A feed reported at several depths reuses its value column, and the vertical
    /// column only grows for depths not seen before. Rows line up only when every
    /// feed is sampled at the same set of depths.
    pub fn assemble_blocks(&self, payload: &Value) -> Result<AssembledTable> {
        let blocks = Vec::<Block>::deserialize(payload)?;
        let convention = self.station.vertical_convention();
        let axes = self.axes;
        let mut table = self.prepare();
        let mut seen_depths: Vec<f64> = Vec::new();

        for series in blocks.iter().flat_map(|b| b.data.iter()) {
            let values = &series.collection.values;

            if series.metadata.label == TIME_SERIES_LABEL {
                for value in values {
                    table.push_f64(axes.time, parse_time(value)?);
                }
                continue;
            }

            let Some(device_id) = series.metadata.device_id else {
                debug!("Series '{}' has no device id; skipping", series.metadata.label);
                continue;
            };
            let Some(feed) = self.resolve_feed(device_id) else {
                continue;
            };

            let sp_unit = &feed.sensor_parameter.unit.symbol;
            if let Some(unit) = series.metadata.unit.as_deref() {
                if unit != sp_unit {
                    debug!(
                        "Feed {} reported in '{}' but described in '{}'",
                        feed.id, unit, sp_unit
                    );
                }
            }

            let column = self.station.value_column(feed);
            for value in values {
                table.push_f64(&column, sample_or_sentinel(value)?);
            }

            let z = convention.from_depth(series.metadata.depth.unwrap_or(0.0));
            if !seen_depths.contains(&z) {
                seen_depths.push(z);
                for _ in 0..values.len() {
                    table.push_f64(axes.vertical, z);
                }
            }
            debug!(
                "Feed {} contributed {} values at z={} to '{}'",
                feed.id,
                values.len(),
                z,
                column
            );
        }

        Ok(self.finish(table))
    }

    /// Assemble `{"data": {"groupedFeeds": [...]}}` from the current sensor service.
    ///
    /// Each group appends its rows to the shared axes; feeds not present in a group
    /// are padded so every column stays row-aligned.
    pub fn assemble_grouped(&self, payload: &Value) -> Result<AssembledTable> {
        let envelope = GroupedEnvelope::deserialize(payload)?;
        let convention = self.station.vertical_convention();
        let axes = self.axes;
        let qc = self.station.qc_enabled();
        let mut table = self.prepare();

        for group in &envelope.data.grouped_feeds {
            let meta = &group.metadata;
            let feeds: Vec<(usize, Option<&QartodRef>, &DeviceFeed)> = meta
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, value_ref)| {
                    let feed_id = *value_ref.device_feed_ids.first()?;
                    if value_ref.device_feed_ids.len() > 1 {
                        debug!(
                            "Grouped value {} lists {} feeds; using feed {}",
                            value_ref.index,
                            value_ref.device_feed_ids.len(),
                            feed_id
                        );
                    }
                    let feed = self.resolve_feed(feed_id)?;
                    Some((value_ref.index, meta.qartod.get(i), feed))
                })
                .collect();

            for row in &group.data {
                let time = row.get(meta.time.index).ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!(
                        "Row has no time value at index {}",
                        meta.time.index
                    ))
                })?;
                table.push_f64(axes.time, parse_time(time)?);

                let cell = |column: &Option<ColumnRef>| {
                    column
                        .as_ref()
                        .and_then(|c| row.get(c.index))
                        .and_then(|v| parse_sample(v).ok())
                };
                table.push_f64(axes.longitude, cell(&meta.lon).unwrap_or(self.station.longitude));
                table.push_f64(axes.latitude, cell(&meta.lat).unwrap_or(self.station.latitude));
                table.push_f64(
                    axes.vertical,
                    cell(&meta.z).map_or(0.0, |depth| convention.from_depth(depth)),
                );

                for (index, qartod, feed) in &feeds {
                    let value = match row.get(*index) {
                        Some(v) => sample_or_sentinel(v)?,
                        None => self.station.missing_value(),
                    };
                    table.push_f64(&self.station.value_column(feed), value);

                    if qc {
                        let flag = parse_qc_flag(qartod.and_then(|q| row.get(q.index)));
                        let tests = parse_qc_tests(
                            qartod
                                .and_then(|q| q.tests_index)
                                .and_then(|i| row.get(i)),
                        );
                        table.push_i64(&self.station.qc_agg_column(feed), flag);
                        table.push(&self.station.qc_tests_column(feed), Cell::Str(tests));
                    }
                }
            }

            table.pad_columns(table.column_len(axes.time));
            debug!(
                "Group with {} feeds added {} rows",
                feeds.len(),
                group.data.len()
            );
        }

        Ok(self.finish(table))
    }

    /// Pick the payload layout from its shape: grouped feeds are an object, blocks an array.
    pub fn assemble(&self, payload: &Value) -> Result<AssembledTable> {
        match payload {
            Value::Array(_) => self.assemble_blocks(payload),
            Value::Object(_) if self.station.current_details().is_some() => {
                self.assemble_grouped(payload)
            }
            _ => Err(ProcessingError::InvalidFormat(format!(
                "Unsupported {} payload for station {}",
                self.station.api_version(),
                self.station.id
            ))),
        }
    }
}
