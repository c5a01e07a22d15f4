use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::requests::Constraint;

#[derive(Parser)]
#[command(name = "station-normalizer")]
#[command(about = "Normalize sensor-service station metadata and time series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (TOML)")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a sensor catalog and report its contents
    Catalog {
        #[arg(short, long, help = "Catalog JSON document")]
        catalog: PathBuf,
    },

    /// Resolve station metadata documents into published attributes
    Metadata {
        #[arg(short, long, help = "Catalog JSON document")]
        catalog: PathBuf,

        #[arg(required = true, help = "Station metadata JSON documents")]
        documents: Vec<PathBuf>,

        #[arg(short, long, help = "Write resolved metadata JSON here instead of stdout")]
        output_file: Option<PathBuf>,

        #[arg(short, long)]
        station_id: Option<i64>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, default_value = "false")]
        fail_fast: bool,
    },

    /// Assemble an observation payload into a flat table
    Assemble {
        #[arg(short, long, help = "Catalog JSON document")]
        catalog: PathBuf,

        #[arg(short, long, help = "Station metadata JSON document")]
        metadata: PathBuf,

        #[arg(short, long, help = "Observation payload JSON document")]
        data: PathBuf,

        #[arg(short, long)]
        output_file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Parquet)]
        format: OutputFormat,

        #[arg(long, default_value = "snappy")]
        compression: String,

        #[arg(short, long)]
        station_id: Option<i64>,
    },

    /// Print the observation request for a station and time constraints
    Request {
        #[arg(short, long, help = "Catalog JSON document")]
        catalog: PathBuf,

        #[arg(short, long, help = "Station metadata JSON document")]
        metadata: PathBuf,

        #[arg(
            long = "constraint",
            help = "Constraint such as 'time>=2017-12-11T18:05:00Z' (repeatable)"
        )]
        constraints: Vec<Constraint>,

        #[arg(long, value_delimiter = ',', help = "Parameter group ids for the sensor filter")]
        groups: Vec<i64>,

        #[arg(short, long)]
        station_id: Option<i64>,
    },
}
