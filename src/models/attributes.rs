use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single CF/ACDD attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Int(i64),
    Double(f64),
    IntList(Vec<i64>),
    DoubleList(Vec<f64>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Double(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Double(d) => write!(f, "{}", d),
            AttributeValue::IntList(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            AttributeValue::DoubleList(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(value: Vec<i64>) -> Self {
        AttributeValue::IntList(value)
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(value: Vec<f64>) -> Self {
        AttributeValue::DoubleList(value)
    }
}

/// Name-ordered attribute set, so two builds from the same input compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn set_if_absent(&mut self, key: &str, value: impl Into<AttributeValue>) -> &mut Self {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    /// Set a text attribute only when it has content; empty values are treated as absent.
    pub fn set_text(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.0.insert(key.to_string(), AttributeValue::Text(v.to_string()));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttributeValue::as_f64)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Attributes(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Double,
    Int,
    String,
}

/// Everything the host needs to register one output variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name inside the assembled table.
    pub source_name: String,
    /// Published variable name.
    pub name: String,
    pub data_type: ColumnType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<i64>,
    pub attributes: Attributes,
}

impl ColumnDescriptor {
    pub fn new(source_name: &str, name: &str, data_type: ColumnType) -> Self {
        Self {
            source_name: source_name.to_string(),
            name: name.to_string(),
            data_type,
            feed_id: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_feed_id(mut self, feed_id: i64) -> Self {
        self.feed_id = Some(feed_id);
        self
    }

    pub fn standard_name(&self) -> Option<&str> {
        self.attributes.get_str("standard_name")
    }

    pub fn label(&self) -> Option<&str> {
        self.attributes.get_str("long_name")
    }

    pub fn units(&self) -> Option<&str> {
        self.attributes.get_str("units")
    }

    pub fn missing_value(&self) -> Option<&AttributeValue> {
        self.attributes.get("missing_value")
    }

    pub fn ancillary_variables(&self) -> Vec<&str> {
        self.attributes
            .get_str("ancillary_variables")
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}
