/// Missing-value sentinels
pub const MISSING_VALUE_SENTINEL: f64 = -9999.99;
pub const CURRENT_MISSING_VALUE: f64 = -9999.0;
pub const LEGACY_MISSING_VALUE: f64 = MISSING_VALUE_SENTINEL;

/// QARTOD flag values
pub const QC_FLAG_MISSING: i64 = 9;
pub const QC_FLAG_VALUES: &str = "1, 2, 3, 4, 9";
pub const QC_FLAG_MEANINGS: &str = "PASS NOT_EVALUATED SUSPECT FAIL MISSING";
pub const QC_TESTS_COMMENT: &str = "11-character string with results of individual QARTOD tests. \
    1: Gap Test, 2: Syntax Test, 3: Location Test, 4: Gross Range Test, 5: Climatology Test, \
    6: Spike Test, 7: Rate of Change Test, 8: Flat-line Test, 9: Multi-variate Test, \
    10: Attenuated Signal Test, 11: Neighbor Test";

/// Payload labels
pub const TIME_SERIES_LABEL: &str = "time";
pub const SUBMIT_TO_NDBC_TAG: &str = "submit_to_ndbc";
pub const WMO_AGENT_SLUG: &str = "un.wmo";

/// Affiliation types
pub const AFFILIATION_OWNER: &str = "owner";
pub const AFFILIATION_PUBLISHER: &str = "publisher";

/// Axis column names of both table layouts; parameters with these names get `READING_SUFFIX`
pub const AXIS_COLUMN_NAMES: &[&str] = &[
    "station",
    "longitude",
    "latitude",
    "time",
    "depth",
    "lon",
    "lat",
    "z",
];
pub const READING_SUFFIX: &str = "_reading";

/// Unknown unit fallback
pub const UNKNOWN_UNIT_ID: i64 = -1;
pub const UNKNOWN_UNIT: &str = "unknown";
pub const NON_STANDARD_UNIT_SYSTEM: &str = "NON_STANDARD";

/// Attribute vocabulary
pub const TIME_UNITS: &str = "seconds since 1970-01-01T00:00:00";
pub const CATEGORY_TIME: &str = "Time";
pub const CATEGORY_LOCATION: &str = "Location";
pub const CATEGORY_IDENTIFIER: &str = "Identifier";
pub const CATEGORY_OTHER: &str = "Other";
pub const CDM_TIMESERIES: &str = "TimeSeries";
pub const CONVENTIONS: &str = "IOOS-1.2, CF-1.6, ACDD-1.3";
pub const STANDARD_NAME_VOCABULARY: &str =
    "NetCDF Climate and Forecast (CF) Metadata Convention Standard Name";
pub const PLATFORM_VOCABULARY: &str = "http://mmisw.org/ont/ioos/platform";
pub const ROLE_VOCABULARY: &str = "CI_RoleCode";

/// Standard names eligible for GTS ingest when a station is flagged for NDBC submission
pub const STANDARD_NAMES_TO_SUBMIT_TO_NDBC: &[&str] = &[
    "air_pressure",
    "air_temperature",
    "depth",
    "dew_point_temperature",
    "downwelling_longwave_flux_in_air",
    "eastward_sea_water_velocity",
    "fractional_saturation_of_oxygen_in_sea_water",
    "lwe_thickness_of_precipitation_amount",
    "mass_concentration_of_chlorophyll_in_sea_water",
    "mass_concentration_of_oxygen_in_sea_water",
    "northward_sea_water_velocity",
    "relative_humidity",
    "sea_surface_dominant_wave_period",
    "sea_surface_height_above_sea_level",
    "sea_surface_wave_from_direction",
    "sea_surface_wave_significant_height",
    "sea_water_ph_reported_on_total_scale",
    "sea_water_practical_salinity",
    "sea_water_temperature",
    "sea_water_turbidity",
    "short_wave_radiation",
    "surface_downwelling_photosynthetic_radiative_flux_in_air",
    "turbidity",
    "wind_from_direction",
    "wind_speed",
    "wind_speed_of_gust",
];

/// Processing defaults
pub const DEFAULT_END_TIME_PADDING_SECS: i64 = 3600;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
