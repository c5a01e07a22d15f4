use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::utils::constants::{NON_STANDARD_UNIT_SYSTEM, UNKNOWN_UNIT, UNKNOWN_UNIT_ID};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub symbol: String,
    pub label: String,
    pub unit_system: String,
}

impl Unit {
    pub fn new(id: i64, symbol: String, label: String, unit_system: String) -> Self {
        Self {
            id,
            symbol,
            label,
            unit_system,
        }
    }

    /// Placeholder for parameters whose type has no unit associations.
    pub fn unknown() -> Self {
        Self {
            id: UNKNOWN_UNIT_ID,
            symbol: UNKNOWN_UNIT.to_string(),
            label: UNKNOWN_UNIT.to_string(),
            unit_system: NON_STANDARD_UNIT_SYSTEM.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_UNIT_ID
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterUnitAssociation {
    pub parameter_type_id: i64,
    pub unit: Arc<Unit>,
    pub unit_system_default: bool,
    pub parameter_type_default: bool,
}

impl ParameterUnitAssociation {
    pub fn new(
        parameter_type_id: i64,
        unit: Arc<Unit>,
        unit_system_default: bool,
        parameter_type_default: bool,
    ) -> Self {
        Self {
            parameter_type_id,
            unit,
            unit_system_default,
            parameter_type_default,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_UNIT_ID, Arc::new(Unit::unknown()), true, true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: i64,
    pub group_id: Option<i64>,
    pub urn: String,
    pub name: String,
    pub label: String,
    /// Never empty; the catalog synthesizes an unknown-unit entry when needed.
    pub units: Vec<ParameterUnitAssociation>,
}

impl Parameter {
    pub fn default_unit(&self) -> Option<&Arc<Unit>> {
        self.units
            .iter()
            .find(|ptu| ptu.parameter_type_default)
            .or_else(|| self.units.first())
            .map(|ptu| &ptu.unit)
    }
}

/// One way a parameter is actually sampled, e.g. "mean over 6 minutes".
#[derive(Debug, Clone, PartialEq)]
pub struct SensorParameter {
    pub id: i64,
    pub parameter: Arc<Parameter>,
    pub unit: Arc<Unit>,
    pub cell_methods: String,
    pub interval: String,
    pub vertical_datum: String,
}

impl SensorParameter {
    pub fn new(
        id: i64,
        parameter: Arc<Parameter>,
        unit: Arc<Unit>,
        cell_methods: String,
        interval: String,
        vertical_datum: String,
    ) -> Self {
        Self {
            id,
            parameter,
            unit,
            cell_methods,
            interval,
            vertical_datum,
        }
    }

    pub fn standard_name(&self) -> &str {
        &self.parameter.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: i64, symbol: &str) -> Arc<Unit> {
        Arc::new(Unit::new(
            id,
            symbol.to_string(),
            symbol.to_string(),
            "METRIC".to_string(),
        ))
    }

    fn parameter(units: Vec<ParameterUnitAssociation>) -> Parameter {
        Parameter {
            id: 1,
            group_id: Some(22),
            urn: "http://mmisw.org/ont/cf/parameter/air_temperature".to_string(),
            name: "air_temperature".to_string(),
            label: "Air Temperature".to_string(),
            units,
        }
    }

    #[test]
    fn test_default_unit_prefers_parameter_type_default() {
        let param = parameter(vec![
            ParameterUnitAssociation::new(7, unit(1, "degree_Celsius"), true, false),
            ParameterUnitAssociation::new(7, unit(2, "degree_Fahrenheit"), false, true),
        ]);

        assert_eq!(param.default_unit().unwrap().symbol, "degree_Fahrenheit");
    }

    #[test]
    fn test_default_unit_falls_back_to_first() {
        let param = parameter(vec![
            ParameterUnitAssociation::new(7, unit(1, "degree_Celsius"), true, false),
            ParameterUnitAssociation::new(7, unit(2, "degree_Fahrenheit"), true, false),
        ]);

        assert_eq!(param.default_unit().unwrap().id, 1);
    }

    #[test]
    fn test_unknown_unit() {
        let ptu = ParameterUnitAssociation::unknown();
        assert!(ptu.unit.is_unknown());
        assert!(ptu.unit_system_default);
        assert!(ptu.parameter_type_default);
        assert_eq!(ptu.unit.unit_system, "NON_STANDARD");
    }
}
