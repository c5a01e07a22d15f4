use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ProcessingError, Result};
use crate::models::{Agent, Parameter, SensorParameter, Unit};
use crate::utils::readable_label;

/// Read-only lookup tables shared by every station resolution.
///
/// Built once by [`crate::readers::CatalogReader`] and never mutated afterwards, so a
/// single instance can be borrowed from any number of worker threads.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    units: HashMap<i64, Arc<Unit>>,
    parameters: HashMap<i64, Arc<Parameter>>,
    sensor_parameters: HashMap<i64, Arc<SensorParameter>>,
    agents: HashMap<i64, Arc<Agent>>,
    roles: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub units: usize,
    pub parameters: usize,
    pub sensor_parameters: usize,
    pub agents: usize,
    pub affiliation_types: usize,
}

impl std::fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} units, {} parameters, {} sensor parameters, {} agents, {} affiliation types",
            self.units, self.parameters, self.sensor_parameters, self.agents, self.affiliation_types
        )
    }
}

impl Catalog {
    pub fn new(
        units: HashMap<i64, Arc<Unit>>,
        parameters: HashMap<i64, Arc<Parameter>>,
        sensor_parameters: HashMap<i64, Arc<SensorParameter>>,
        agents: HashMap<i64, Arc<Agent>>,
        roles: HashMap<String, String>,
    ) -> Self {
        Self {
            units,
            parameters,
            sensor_parameters,
            agents,
            roles,
        }
    }

    pub fn unit(&self, id: i64) -> Result<&Arc<Unit>> {
        self.units
            .get(&id)
            .ok_or_else(|| ProcessingError::lookup("unit", id))
    }

    pub fn parameter(&self, id: i64) -> Result<&Arc<Parameter>> {
        self.parameters
            .get(&id)
            .ok_or_else(|| ProcessingError::lookup("parameter", id))
    }

    pub fn sensor_parameter(&self, id: i64) -> Result<&Arc<SensorParameter>> {
        self.sensor_parameters
            .get(&id)
            .ok_or_else(|| ProcessingError::lookup("sensor parameter", id))
    }

    pub fn agent(&self, id: i64) -> Result<&Arc<Agent>> {
        self.agents
            .get(&id)
            .ok_or_else(|| ProcessingError::lookup("agent", id))
    }

    /// Role code for an affiliation type; unknown types map to themselves.
    pub fn role_for(&self, affiliation_type: &str) -> String {
        self.roles
            .get(affiliation_type)
            .cloned()
            .unwrap_or_else(|| affiliation_type.to_string())
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<Unit>> {
        self.units.values()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Arc<Parameter>> {
        self.parameters.values()
    }

    /// `(id, name, readable label)` for every parameter, ordered by id.
    pub fn parameter_listing(&self) -> Vec<(i64, &str, String)> {
        let mut listing: Vec<(i64, &str, String)> = self
            .parameters
            .values()
            .map(|p| (p.id, p.name.as_str(), readable_label(&p.name)))
            .collect();
        listing.sort_by_key(|(id, _, _)| *id);
        listing
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            units: self.units.len(),
            parameters: self.parameters.len(),
            sensor_parameters: self.sensor_parameters.len(),
            agents: self.agents.len(),
            affiliation_types: self.roles.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_catalog_is_shareable() {
        assert_send_sync::<Catalog>();
    }

    #[test]
    fn test_missing_entries_are_lookup_errors() {
        let catalog = Catalog::default();

        match catalog.sensor_parameter(42) {
            Err(ProcessingError::Lookup { kind, id }) => {
                assert_eq!(kind, "sensor parameter");
                assert_eq!(id, 42);
            }
            other => panic!("expected lookup error, got {:?}", other),
        }
        assert!(catalog.agent(7).is_err());
    }

    #[test]
    fn test_role_falls_back_to_type() {
        let mut roles = HashMap::new();
        roles.insert("owner".to_string(), "originator".to_string());
        let catalog = Catalog::new(
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            roles,
        );

        assert_eq!(catalog.role_for("owner"), "originator");
        assert_eq!(catalog.role_for("sponsor"), "sponsor");
        assert_eq!(catalog.summary().affiliation_types, 1);
    }

    #[test]
    fn test_parameter_listing_is_sorted_and_readable() {
        let parameter = |id: i64, name: &str| {
            Arc::new(Parameter {
                id,
                group_id: None,
                urn: String::new(),
                name: name.to_string(),
                label: String::new(),
                units: Vec::new(),
            })
        };
        let parameters: HashMap<i64, Arc<Parameter>> = [
            (9, parameter(9, "wind_speed")),
            (2, parameter(2, "sea_water_temperature")),
        ]
        .into_iter()
        .collect();
        let catalog = Catalog::new(
            HashMap::new(),
            parameters,
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
        );

        assert_eq!(
            catalog.parameter_listing(),
            vec![
                (2, "sea_water_temperature", "Sea water temperature".to_string()),
                (9, "wind_speed", "Wind speed".to_string()),
            ]
        );
    }
}
