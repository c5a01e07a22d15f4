use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::utils::constants::DEFAULT_END_TIME_PADDING_SECS;

pub const ENV_PREFIX: &str = "STATION_NORMALIZER";
const STATION_ID_PLACEHOLDER: &str = "{id}";

fn validate_id_template(template: &str) -> std::result::Result<(), ValidationError> {
    if template.contains(STATION_ID_PLACEHOLDER) {
        Ok(())
    } else {
        Err(ValidationError::new("missing_id_placeholder"))
    }
}

/// The organization appended to every current station's contributor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProcessorContributor {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub role: String,
    #[validate(url)]
    pub url: String,
    #[validate(email)]
    pub email: String,
}

impl Default for ProcessorContributor {
    fn default() -> Self {
        Self {
            name: "Axiom Data Science".to_string(),
            role: "processor".to_string(),
            url: "https://www.axiomdatascience.com".to_string(),
            email: "feedback@axiomdatascience.com".to_string(),
        }
    }
}

/// Global attributes applied to legacy stations when the caller supplies none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LegacyDefaults {
    #[validate(length(min = 1))]
    pub institution: String,
    #[validate(url)]
    pub info_url: String,
    #[validate(url)]
    pub source_url: String,
}

impl Default for LegacyDefaults {
    fn default() -> Self {
        Self {
            institution: "Axiom Data Science".to_string(),
            info_url: "http://axiomdatascience.com".to_string(),
            source_url: "http://sensors.axds.co/stationsensorservice/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(length(min = 1))]
    pub naming_authority: String,

    /// Station landing page; `{id}` is replaced by the station id.
    #[validate(custom(function = "validate_id_template"))]
    pub info_url_template: String,

    #[validate(length(min = 1))]
    pub ioos_code_prefix: String,

    #[validate(nested)]
    pub processor: ProcessorContributor,

    #[validate(nested)]
    pub legacy: LegacyDefaults,

    /// Added to "now" when a request has no upper time bound.
    #[validate(range(min = 0, max = 604800))]
    pub end_time_padding_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naming_authority: "com.axiomdatascience".to_string(),
            info_url_template: "https://sensors.ioos.us/?sensor_version=v2#metadata/{id}/station"
                .to_string(),
            ioos_code_prefix: "urn:ioos:station:com.axiomdatascience:".to_string(),
            processor: ProcessorContributor::default(),
            legacy: LegacyDefaults::default(),
            end_time_padding_secs: DEFAULT_END_TIME_PADDING_SECS,
        }
    }
}

impl Settings {
    /// Load defaults, then an optional TOML file, then `STATION_NORMALIZER__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn info_url(&self, station_id: i64) -> String {
        self.info_url_template
            .replace(STATION_ID_PLACEHOLDER, &station_id.to_string())
    }

    pub fn ioos_code(&self, station_id: i64) -> String {
        format!("{}{}", self.ioos_code_prefix, station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.info_url(60387),
            "https://sensors.ioos.us/?sensor_version=v2#metadata/60387/station"
        );
        assert_eq!(
            settings.ioos_code(60387),
            "urn:ioos:station:com.axiomdatascience:60387"
        );
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
naming_authority = "org.example"
end_time_padding_secs = 60

[processor]
name = "Example Processing"
email = "data@example.org"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.naming_authority, "org.example");
        assert_eq!(settings.end_time_padding_secs, 60);
        assert_eq!(settings.processor.name, "Example Processing");
        assert_eq!(settings.processor.role, "processor");
        assert_eq!(settings.legacy, LegacyDefaults::default());
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let settings = Settings {
            info_url_template: "https://sensors.ioos.us/".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_processor_email_is_rejected() {
        let mut settings = Settings::default();
        settings.processor.email = "not-an-email".to_string();
        assert!(settings.validate().is_err());
    }
}
