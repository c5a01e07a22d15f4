pub mod attribute_builder;
pub mod batch_resolver;
pub mod table_assembler;
pub mod version_adapter;

pub use attribute_builder::{find_column, is_gts_eligible, AttributeBuilder};
pub use batch_resolver::{BatchOutcome, BatchResolver, StationDocument};
pub use table_assembler::{parse_sample, TableAssembler};
pub use version_adapter::{MappingStrategy, ResolveContext, ResolvedStation, VersionAdapter};
