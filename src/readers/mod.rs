pub mod catalog_reader;
pub mod station_reader;

pub use catalog_reader::CatalogReader;
pub use station_reader::StationReader;
