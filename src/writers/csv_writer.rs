use crate::error::Result;
use crate::models::{AssembledTable, ColumnDescriptor};
use crate::writers::published_names;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Flat CSV output of an assembled table, one header line of published names.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_table(
        &self,
        table: &AssembledTable,
        descriptors: &[ColumnDescriptor],
        path: &Path,
    ) -> Result<usize> {
        let file = std::fs::File::create(path)?;
        let rows = self.write_to(table, descriptors, file)?;
        debug!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }

    pub fn write_to<W: Write>(
        &self,
        table: &AssembledTable,
        descriptors: &[ColumnDescriptor],
        writer: W,
    ) -> Result<usize> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv.write_record(published_names(table, descriptors))?;
        let rows = table.row_count();
        for i in 0..rows {
            csv.write_record(table.row(i).iter().map(|cell| cell.to_string()))?;
        }
        csv.flush()?;
        Ok(rows)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, ColumnType};
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn sample_table() -> AssembledTable {
        let mut table = AssembledTable::new();
        table.add_column("station", ColumnType::String, Cell::Str(String::new()), true);
        table.add_column("lat", ColumnType::Double, Cell::F64(f64::NAN), true);
        table.add_column("time", ColumnType::Int, Cell::I64(0), false);
        table.add_column("qc_agg_7", ColumnType::Int, Cell::I64(9), false);
        table.push_str("station", "Pier");
        table.push_f64("lat", 27.5);
        table.push_i64("time", 100);
        table.push_i64("time", 200);
        table.push_i64("qc_agg_7", 1);
        table.finish()
    }

    #[test]
    fn test_write_to_buffer() -> Result<()> {
        let descriptors = vec![ColumnDescriptor::new("lat", "latitude", ColumnType::Double)];
        let mut buffer = Vec::new();

        let rows = CsvWriter::new().write_to(&sample_table(), &descriptors, &mut buffer)?;

        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "station,latitude,time,qc_agg_7\nPier,27.5,100,1\nPier,27.5,200,9\n"
        );
        Ok(())
    }

    #[test]
    fn test_write_table_to_file() -> Result<()> {
        let temp_file = NamedTempFile::new().unwrap();

        CsvWriter::new()
            .with_delimiter(b'\t')
            .write_table(&sample_table(), &[], temp_file.path())?;

        let contents = std::fs::read_to_string(temp_file.path())?;
        assert!(contents.starts_with("station\tlat\ttime\tqc_agg_7\n"));
        Ok(())
    }
}
