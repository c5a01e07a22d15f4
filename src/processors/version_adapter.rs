use serde_json::Value;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{
    ApiVersion, AssembledTable, Attributes, Catalog, ColumnDescriptor, Station,
};
use crate::processors::{AttributeBuilder, TableAssembler};
use crate::readers::StationReader;
use crate::settings::Settings;

impl ApiVersion {
    /// Detect the API generation from a station metadata document's shape.
    pub fn detect(document: &Value) -> Result<Self> {
        if document
            .get("data")
            .and_then(|d| d.get("stations"))
            .is_some()
        {
            Ok(ApiVersion::Current)
        } else if document.get("stations").is_some_and(Value::is_array) {
            Ok(ApiVersion::Legacy)
        } else {
            Err(ProcessingError::InvalidFormat(
                "Document is neither a legacy nor a current station metadata document".to_string(),
            ))
        }
    }
}

/// Shared inputs of a station resolution.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a Catalog,
    pub settings: &'a Settings,
    /// Requested station, reported when the document holds none.
    pub station_id: Option<i64>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(catalog: &'a Catalog, settings: &'a Settings) -> Self {
        Self {
            catalog,
            settings,
            station_id: None,
        }
    }

    pub fn with_station_id(mut self, station_id: Option<i64>) -> Self {
        self.station_id = station_id;
        self
    }
}

/// Everything the metadata path hands to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStation {
    pub station: Station,
    pub global_attributes: Attributes,
    pub columns: Vec<ColumnDescriptor>,
}

type ResolveFn = fn(&Value, &ResolveContext<'_>, Attributes) -> Result<ResolvedStation>;
type AssembleFn = fn(&Station, &Value) -> Result<AssembledTable>;

/// Version-specific resolve and assemble behavior.
pub struct MappingStrategy {
    pub version: ApiVersion,
    resolve: ResolveFn,
    assemble: AssembleFn,
}

fn finish_resolution(
    station: Station,
    ctx: &ResolveContext<'_>,
    base: Attributes,
) -> ResolvedStation {
    let (global_attributes, columns) = AttributeBuilder::new(ctx.settings).build(&station, base);
    ResolvedStation {
        station,
        global_attributes,
        columns,
    }
}

fn resolve_legacy(document: &Value, ctx: &ResolveContext<'_>, base: Attributes) -> Result<ResolvedStation> {
    let station = StationReader::new(ctx.catalog)
        .with_station_id(ctx.station_id)
        .read_legacy(document)?;
    Ok(finish_resolution(station, ctx, base))
}

fn resolve_current(document: &Value, ctx: &ResolveContext<'_>, base: Attributes) -> Result<ResolvedStation> {
    let station = StationReader::new(ctx.catalog)
        .with_station_id(ctx.station_id)
        .read_current(document)?;
    Ok(finish_resolution(station, ctx, base))
}

fn assemble_legacy(station: &Station, payload: &Value) -> Result<AssembledTable> {
    TableAssembler::new(station).assemble_blocks(payload)
}

fn assemble_current(station: &Station, payload: &Value) -> Result<AssembledTable> {
    TableAssembler::new(station).assemble(payload)
}

static LEGACY_STRATEGY: MappingStrategy = MappingStrategy {
    version: ApiVersion::Legacy,
    resolve: resolve_legacy,
    assemble: assemble_legacy,
};

static CURRENT_STRATEGY: MappingStrategy = MappingStrategy {
    version: ApiVersion::Current,
    resolve: resolve_current,
    assemble: assemble_current,
};

/// Routes resolution and assembly to the strategy of one API generation.
#[derive(Clone, Copy)]
pub struct VersionAdapter {
    strategy: &'static MappingStrategy,
}

impl VersionAdapter {
    pub fn for_version(version: ApiVersion) -> Self {
        let strategy = match version {
            ApiVersion::Legacy => &LEGACY_STRATEGY,
            ApiVersion::Current => &CURRENT_STRATEGY,
        };
        Self { strategy }
    }

    pub fn for_station(station: &Station) -> Self {
        Self::for_version(station.api_version())
    }

    pub fn detect(document: &Value) -> Result<Self> {
        let version = ApiVersion::detect(document)?;
        debug!("Detected {} station document", version);
        Ok(Self::for_version(version))
    }

    pub fn version(&self) -> ApiVersion {
        self.strategy.version
    }

    pub fn resolve(
        &self,
        document: &Value,
        ctx: &ResolveContext<'_>,
        base: Attributes,
    ) -> Result<ResolvedStation> {
        (self.strategy.resolve)(document, ctx, base)
    }

    pub fn assemble(&self, station: &Station, payload: &Value) -> Result<AssembledTable> {
        (self.strategy.assemble)(station, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_versions() {
        assert_eq!(
            ApiVersion::detect(&json!({"data": {"stations": [], "deviceFeeds": []}})).unwrap(),
            ApiVersion::Current
        );
        assert_eq!(
            ApiVersion::detect(&json!({"stations": [], "enhancedParameters": {}})).unwrap(),
            ApiVersion::Legacy
        );
        assert!(ApiVersion::detect(&json!({"units": []})).is_err());
    }

    #[test]
    fn test_adapter_selects_strategy() {
        assert_eq!(
            VersionAdapter::for_version(ApiVersion::Legacy).version(),
            ApiVersion::Legacy
        );
        let adapter =
            VersionAdapter::detect(&json!({"data": {"stations": [], "deviceFeeds": []}})).unwrap();
        assert_eq!(adapter.version(), ApiVersion::Current);
    }

    #[test]
    fn test_resolve_empty_document_reports_requested_station() {
        let catalog = Catalog::default();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings).with_station_id(Some(7));
        let document = json!({"stations": [], "enhancedParameters": {}});

        let result = VersionAdapter::for_version(ApiVersion::Legacy).resolve(
            &document,
            &ctx,
            Attributes::new(),
        );
        assert!(matches!(
            result,
            Err(ProcessingError::NoStationFound { station_id: Some(7) })
        ));
    }
}
