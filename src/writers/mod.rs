pub mod csv_writer;
pub mod metadata_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use metadata_writer::{MetadataWriter, StationMetadata};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use crate::models::{AssembledTable, ColumnDescriptor};

/// Published name for every table column, falling back to the table's own name.
pub(crate) fn published_names<'a>(
    table: &'a AssembledTable,
    descriptors: &'a [ColumnDescriptor],
) -> Vec<&'a str> {
    table
        .columns()
        .iter()
        .map(|column| {
            descriptors
                .iter()
                .find(|d| d.source_name == column.name)
                .map_or(column.name.as_str(), |d| d.name.as_str())
        })
        .collect()
}
