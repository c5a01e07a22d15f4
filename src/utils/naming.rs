use crate::models::SensorParameter;
use crate::utils::constants::{AXIS_COLUMN_NAMES, READING_SUFFIX};

/// Lowercase and replace every character outside `[a-z0-9_]` with an underscore.
///
/// # Examples
/// ```
/// use station_normalizer::utils::slugify;
///
/// assert_eq!(slugify("Time: Mean"), "time__mean");
/// ```
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stable variable name for a sensor parameter sampled by one device.
///
/// The parameter name comes first (axis names such as `depth` or `time` are reserved
/// and become `depth_reading`, `time_reading`), followed by the non-empty cell method,
/// interval, vertical datum and discriminant fragments, each slugified on its own.
pub fn canonical_name(sensor_parameter: &SensorParameter, discriminant: &str) -> String {
    let mut name = slugify(sensor_parameter.standard_name());
    if AXIS_COLUMN_NAMES.contains(&name.as_str()) {
        name.push_str(READING_SUFFIX);
    }
    let fragments = [
        ("_cm_", sensor_parameter.cell_methods.as_str()),
        ("_over_", sensor_parameter.interval.as_str()),
        ("_geoid_", sensor_parameter.vertical_datum.as_str()),
        ("_", discriminant),
    ];
    for (prefix, fragment) in fragments {
        if !fragment.is_empty() {
            name.push_str(prefix);
            name.push_str(&slugify(fragment));
        }
    }
    name
}

pub fn qc_agg_name(canonical: &str) -> String {
    format!("{}_qc_agg", canonical)
}

pub fn qc_tests_name(canonical: &str) -> String {
    format!("{}_qc_tests", canonical)
}

/// Human-facing label: underscores become spaces and the first letter is upper-cased.
pub fn readable_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parameter, ParameterUnitAssociation, Unit};
    use std::sync::Arc;

    fn sensor_parameter(name: &str, cell_methods: &str, interval: &str, datum: &str) -> SensorParameter {
        let unit = Arc::new(Unit::unknown());
        let parameter = Arc::new(Parameter {
            id: 1,
            group_id: None,
            urn: String::new(),
            name: name.to_string(),
            label: name.to_string(),
            units: vec![ParameterUnitAssociation::unknown()],
        });
        SensorParameter::new(
            10,
            parameter,
            unit,
            cell_methods.to_string(),
            interval.to_string(),
            datum.to_string(),
        )
    }

    #[test]
    fn test_plain_parameter_name() {
        let sp = sensor_parameter("relative_humidity", "", "", "");
        assert_eq!(canonical_name(&sp, ""), "relative_humidity");
    }

    #[test]
    fn test_discriminant_is_slugified() {
        let sp = sensor_parameter("relative_humidity", "", "", "");
        assert_eq!(canonical_name(&sp, "pier 1"), "relative_humidity_pier_1");
    }

    #[test]
    fn test_depth_is_renamed() {
        let sp = sensor_parameter("depth", "", "", "");
        assert_eq!(canonical_name(&sp, ""), "depth_reading");
    }

    #[test]
    fn test_all_fragments_in_order() {
        let sp = sensor_parameter(
            "colored_dissolved_organic_matter",
            "time: mean",
            "PT6M",
            "NAVD88",
        );
        assert_eq!(
            canonical_name(&sp, "Sonde A"),
            "colored_dissolved_organic_matter_cm_time__mean_over_pt6m_geoid_navd88_sonde_a"
        );
    }

    #[test]
    fn test_cell_method_and_interval() {
        let sp = sensor_parameter("colored_dissolved_organic_matter", "time: mean", "PT6M", "");
        assert_eq!(
            canonical_name(&sp, ""),
            "colored_dissolved_organic_matter_cm_time__mean_over_pt6m"
        );
    }

    #[test]
    fn test_slugify_replaces_every_symbol() {
        assert_eq!(slugify("sea-water (surface)"), "sea_water__surface_");
        assert_eq!(slugify("ABC_123"), "abc_123");
    }

    #[test]
    fn test_qc_companion_names() {
        assert_eq!(qc_agg_name("air_temperature"), "air_temperature_qc_agg");
        assert_eq!(qc_tests_name("air_temperature"), "air_temperature_qc_tests");
    }

    #[test]
    fn test_axis_names_are_reserved() {
        for (parameter, expected) in [
            ("time", "time_reading"),
            ("station", "station_reading"),
            ("latitude", "latitude_reading"),
            ("Longitude", "longitude_reading"),
            ("z", "z_reading"),
        ] {
            let sp = sensor_parameter(parameter, "", "", "");
            assert_eq!(canonical_name(&sp, ""), expected);
        }
        let sp = sensor_parameter("depth", "", "", "NAVD88");
        assert_eq!(canonical_name(&sp, ""), "depth_reading_geoid_navd88");
        let sp = sensor_parameter("time_of_day", "", "", "");
        assert_eq!(canonical_name(&sp, ""), "time_of_day");
    }

    #[test]
    fn test_readable_label() {
        assert_eq!(readable_label("sea_water_temperature"), "Sea water temperature");
        assert_eq!(readable_label(""), "");
    }
}
