pub mod agent;
pub mod attributes;
pub mod catalog;
pub mod device;
pub mod parameter;
pub mod station;
pub mod table;

pub use agent::{AffiliationKind, Agent, AgentAffiliation};
pub use attributes::{AttributeValue, Attributes, ColumnDescriptor, ColumnType};
pub use catalog::{Catalog, CatalogSummary};
pub use device::DeviceFeed;
pub use parameter::{Parameter, ParameterUnitAssociation, SensorParameter, Unit};
pub use station::{ApiVersion, CurrentDetails, Station, StationVariant, VerticalConvention};
pub use table::{AssembledTable, Cell, Column, ColumnData};
