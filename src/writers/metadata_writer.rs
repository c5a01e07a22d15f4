use crate::error::Result;
use crate::models::{ApiVersion, Attributes, ColumnDescriptor};
use crate::processors::ResolvedStation;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serializable view of a resolved station's published metadata.
#[derive(Debug, Serialize)]
pub struct StationMetadata<'a> {
    pub station_id: i64,
    pub label: &'a str,
    pub urn: &'a str,
    pub api_version: ApiVersion,
    pub global_attributes: &'a Attributes,
    pub columns: &'a [ColumnDescriptor],
}

impl<'a> From<&'a ResolvedStation> for StationMetadata<'a> {
    fn from(resolved: &'a ResolvedStation) -> Self {
        Self {
            station_id: resolved.station.id,
            label: &resolved.station.label,
            urn: &resolved.station.urn,
            api_version: resolved.station.api_version(),
            global_attributes: &resolved.global_attributes,
            columns: &resolved.columns,
        }
    }
}

pub struct MetadataWriter {
    pretty: bool,
}

impl MetadataWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn write_to<W: Write>(&self, stations: &[ResolvedStation], writer: W) -> Result<()> {
        let views: Vec<StationMetadata<'_>> = stations.iter().map(StationMetadata::from).collect();
        if self.pretty {
            serde_json::to_writer_pretty(writer, &views)?;
        } else {
            serde_json::to_writer(writer, &views)?;
        }
        Ok(())
    }

    pub fn write_path(&self, stations: &[ResolvedStation], path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(stations, std::io::BufWriter::new(file))
    }
}

impl Default for MetadataWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnType, Station, StationVariant};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn resolved() -> ResolvedStation {
        let mut global_attributes = Attributes::new();
        global_attributes.set("id", 42i64).set("title", "Pier");
        let mut column = ColumnDescriptor::new("lat", "latitude", ColumnType::Double);
        column.attributes.set("axis", "Y");
        ResolvedStation {
            station: Station {
                id: 42,
                label: "Pier".to_string(),
                urn: "urn:pier".to_string(),
                latitude: 1.0,
                longitude: 2.0,
                start_time: 0,
                end_time: 0,
                min_z: 0.0,
                max_z: 0.0,
                device_feeds: Vec::new(),
                variant: StationVariant::Legacy,
            },
            global_attributes,
            columns: vec![column],
        }
    }

    #[test]
    fn test_metadata_json_shape() -> Result<()> {
        let mut buffer = Vec::new();
        MetadataWriter::new()
            .with_pretty(false)
            .write_to(&[resolved()], &mut buffer)?;

        let value: Value = serde_json::from_slice(&buffer)?;
        assert_eq!(value[0]["station_id"], 42);
        assert_eq!(value[0]["api_version"], "legacy");
        assert_eq!(value[0]["global_attributes"]["title"], "Pier");
        assert_eq!(value[0]["columns"][0]["name"], "latitude");
        assert_eq!(value[0]["columns"][0]["data_type"], "double");
        assert_eq!(value[0]["columns"][0]["attributes"]["axis"], "Y");
        Ok(())
    }
}
