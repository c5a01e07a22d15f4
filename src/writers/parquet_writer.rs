use crate::error::{ProcessingError, Result};
use crate::models::{AssembledTable, Attributes, ColumnData, ColumnDescriptor};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::writers::published_names;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write an assembled table with descriptor attributes as field metadata and the
    /// global attributes as schema metadata. An empty table writes nothing.
    pub fn write_table(
        &self,
        table: &AssembledTable,
        descriptors: &[ColumnDescriptor],
        global_attributes: &Attributes,
        path: &Path,
    ) -> Result<()> {
        if table.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema(table, descriptors, global_attributes);
        let batch = self.table_to_batch(table, schema.clone())?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
        Ok(())
    }

    fn create_schema(
        &self,
        table: &AssembledTable,
        descriptors: &[ColumnDescriptor],
        global_attributes: &Attributes,
    ) -> Arc<Schema> {
        let names = published_names(table, descriptors);
        let fields: Vec<Field> = table
            .columns()
            .iter()
            .zip(names)
            .map(|(column, name)| {
                let data_type = match column.data {
                    ColumnData::F64(_) => DataType::Float64,
                    ColumnData::I64(_) => DataType::Int64,
                    ColumnData::Str(_) => DataType::Utf8,
                };
                let metadata = descriptors
                    .iter()
                    .find(|d| d.source_name == column.name)
                    .map(|d| string_metadata(&d.attributes))
                    .unwrap_or_default();
                Field::new(name, data_type, false).with_metadata(metadata)
            })
            .collect();

        Arc::new(Schema::new_with_metadata(
            fields,
            string_metadata(global_attributes),
        ))
    }

    fn table_to_batch(&self, table: &AssembledTable, schema: Arc<Schema>) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = table
            .columns()
            .iter()
            .map(|column| -> ArrayRef {
                match &column.data {
                    ColumnData::F64(values) => Arc::new(Float64Array::from(values.clone())),
                    ColumnData::I64(values) => Arc::new(Int64Array::from(values.clone())),
                    ColumnData::Str(values) => Arc::new(StringArray::from(values.clone())),
                }
            })
            .collect();

        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let columns = file_metadata.schema_descr().num_columns();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            columns,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn string_metadata(attributes: &Attributes) -> HashMap<String, String> {
    attributes
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub columns: usize,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.columns,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}
