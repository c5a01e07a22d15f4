use crate::error::{ProcessingError, Result};
use crate::models::{Agent, Catalog, Parameter, ParameterUnitAssociation, SensorParameter, Unit};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    units: Vec<RawUnit>,
    parameter_type_units: Vec<RawParameterTypeUnit>,
    parameters: Vec<RawParameter>,
    #[serde(default)]
    sensor_parameters: Vec<RawSensorParameter>,
    #[serde(default)]
    agents: Vec<RawAgent>,
    #[serde(default)]
    agent_association_types: Vec<RawAssociationType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnit {
    id: i64,
    unit: String,
    label: String,
    unit_system: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameterTypeUnit {
    id_parameter_type: i64,
    id_unit: i64,
    unit_system_default: bool,
    parameter_type_default: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameter {
    id: i64,
    id_parameter_group: Option<i64>,
    id_parameter_type: Option<i64>,
    urn: String,
    parameter_name: String,
    label: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSensorParameter {
    id: i64,
    parameter_id: i64,
    unit_id: i64,
    cell_methods: Option<String>,
    time_interval: Option<String>,
    vertical_datum: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAgent {
    id: i64,
    label: String,
    slug: String,
    sector_type: String,
    url: Option<String>,
    contact: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssociationType {
    name: String,
    role_code: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Builds a [`Catalog`] from the sensor service's global lookup document.
pub struct CatalogReader;

impl CatalogReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse an already-decoded lookup document.
    pub fn parse(&self, document: &Value) -> Result<Catalog> {
        let raw = RawCatalog::deserialize(document)?;
        let catalog = self.build(raw)?;
        info!("Loaded catalog: {}", catalog.summary());
        Ok(catalog)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Catalog> {
        let document: Value = serde_json::from_reader(reader)?;
        self.parse(&document)
    }

    pub fn read_path(&self, path: &Path) -> Result<Catalog> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    fn build(&self, raw: RawCatalog) -> Result<Catalog> {
        let units: HashMap<i64, Arc<Unit>> = raw
            .units
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    Arc::new(Unit::new(u.id, u.unit, u.label, u.unit_system)),
                )
            })
            .collect();

        // Grouped by parameter type, source order preserved within each group
        let mut associations: HashMap<i64, Vec<ParameterUnitAssociation>> = HashMap::new();
        for ptu in raw.parameter_type_units {
            let unit = units
                .get(&ptu.id_unit)
                .cloned()
                .ok_or_else(|| ProcessingError::lookup("unit", ptu.id_unit))?;
            associations
                .entry(ptu.id_parameter_type)
                .or_default()
                .push(ParameterUnitAssociation::new(
                    ptu.id_parameter_type,
                    unit,
                    ptu.unit_system_default,
                    ptu.parameter_type_default,
                ));
        }

        let mut parameters: HashMap<i64, Arc<Parameter>> = HashMap::with_capacity(raw.parameters.len());
        for p in raw.parameters {
            let units_for_type = match p.id_parameter_type.and_then(|t| associations.get(&t)) {
                Some(list) if !list.is_empty() => list.clone(),
                _ => {
                    debug!("Parameter {} has no unit associations; using unknown unit", p.id);
                    vec![ParameterUnitAssociation::unknown()]
                }
            };
            parameters.insert(
                p.id,
                Arc::new(Parameter {
                    id: p.id,
                    group_id: p.id_parameter_group,
                    urn: p.urn,
                    name: p.parameter_name,
                    label: p.label,
                    units: units_for_type,
                }),
            );
        }

        let mut sensor_parameters: HashMap<i64, Arc<SensorParameter>> =
            HashMap::with_capacity(raw.sensor_parameters.len());
        for sp in raw.sensor_parameters {
            let parameter = parameters
                .get(&sp.parameter_id)
                .cloned()
                .ok_or_else(|| ProcessingError::lookup("parameter", sp.parameter_id))?;
            let unit = units
                .get(&sp.unit_id)
                .cloned()
                .ok_or_else(|| ProcessingError::lookup("unit", sp.unit_id))?;
            sensor_parameters.insert(
                sp.id,
                Arc::new(SensorParameter::new(
                    sp.id,
                    parameter,
                    unit,
                    sp.cell_methods.unwrap_or_default(),
                    sp.time_interval.unwrap_or_default(),
                    sp.vertical_datum.unwrap_or_default(),
                )),
            );
        }

        let agents: HashMap<i64, Arc<Agent>> = raw
            .agents
            .into_iter()
            .map(|a| {
                (
                    a.id,
                    Arc::new(Agent {
                        id: a.id,
                        label: a.label,
                        slug: a.slug,
                        sector_type: a.sector_type,
                        url: non_empty(a.url),
                        email: non_empty(a.contact),
                        country: non_empty(a.country),
                    }),
                )
            })
            .collect();

        let roles: HashMap<String, String> = raw
            .agent_association_types
            .into_iter()
            .map(|t| {
                let role = t.role_code.unwrap_or_else(|| t.name.clone());
                (t.name, role)
            })
            .collect();

        Ok(Catalog::new(units, parameters, sensor_parameters, agents, roles))
    }
}

impl Default for CatalogReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        CatalogReader::new().read_from(reader)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        CatalogReader::new().read_path(path)
    }
}
