use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::models::{ApiVersion, Attributes, Catalog};
use crate::processors::{BatchResolver, ResolveContext, StationDocument, VersionAdapter};
use crate::readers::CatalogReader;
use crate::requests::{
    legacy_metadata_query_params, Constraint, ObservationRequest, SensorFilter, TimeWindow,
};
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, MetadataWriter, ParquetWriter};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("Loading settings from {}", path.display()),
            None => "Loading settings from the environment".to_string(),
        })?;

    match cli.command {
        Commands::Catalog { catalog } => {
            let catalog = load_catalog(&catalog).await?;
            println!("{}", catalog.summary());
            for (id, name, label) in catalog.parameter_listing() {
                println!("  {:>6}  {:<40} {}", id, name, label);
            }
        }

        Commands::Metadata {
            catalog,
            documents,
            output_file,
            station_id,
            max_workers,
            fail_fast,
        } => {
            let catalog = load_catalog(&catalog).await?;

            let mut station_documents = Vec::with_capacity(documents.len());
            for path in &documents {
                let document = read_json(path).await?;
                station_documents.push(StationDocument::new(path.display().to_string(), document));
            }

            println!(
                "Resolving {} station documents with {} workers...",
                station_documents.len(),
                max_workers
            );
            let progress =
                ProgressReporter::new(station_documents.len() as u64, "Resolving...", false);

            let outcomes = tokio::task::spawn_blocking(move || {
                let ctx = ResolveContext::new(&catalog, &settings).with_station_id(station_id);
                BatchResolver::new(max_workers)
                    .with_fail_fast(fail_fast)
                    .resolve_all(&station_documents, &ctx, &Attributes::new(), Some(&progress))
            })
            .await??;

            let mut resolved = Vec::with_capacity(outcomes.len());
            for outcome in outcomes {
                match outcome.result {
                    Ok(station) => resolved.push(station),
                    Err(e) => println!("✗ {}: {}", outcome.source, e),
                }
            }

            let writer = MetadataWriter::new();
            match output_file {
                Some(path) => {
                    create_parent_dir(&path)?;
                    writer.write_path(&resolved, &path)?;
                    println!(
                        "Wrote metadata for {} stations to {}",
                        resolved.len(),
                        path.display()
                    );
                }
                None => writer.write_to(&resolved, std::io::stdout().lock())?,
            }
        }

        Commands::Assemble {
            catalog,
            metadata,
            data,
            output_file,
            format,
            compression,
            station_id,
        } => {
            let catalog = load_catalog(&catalog).await?;
            let document = read_json(&metadata).await?;
            let payload = read_json(&data).await?;

            let ctx = ResolveContext::new(&catalog, &settings).with_station_id(station_id);
            let adapter = VersionAdapter::detect(&document)?;
            let resolved = adapter.resolve(&document, &ctx, Attributes::new())?;

            let progress = ProgressReporter::new_spinner("Assembling table...", false);
            let table = adapter.assemble(&resolved.station, &payload)?;
            progress.finish_with_message(&format!(
                "Assembled {} rows x {} columns",
                table.row_count(),
                table.columns().len()
            ));

            if table.is_empty() {
                println!("No observations to write");
                return Ok(());
            }

            create_parent_dir(&output_file)?;
            match format {
                OutputFormat::Csv => {
                    CsvWriter::new().write_table(&table, &resolved.columns, &output_file)?;
                }
                OutputFormat::Parquet => {
                    let writer = ParquetWriter::new().with_compression(&compression)?;
                    writer.write_table(
                        &table,
                        &resolved.columns,
                        &resolved.global_attributes,
                        &output_file,
                    )?;
                    println!("\n{}", writer.get_file_info(&output_file)?.summary());
                }
            }
            info!("Wrote {} to {}", resolved.station.label, output_file.display());
        }

        Commands::Request {
            catalog,
            metadata,
            constraints,
            groups,
            station_id,
        } => {
            let catalog = load_catalog(&catalog).await?;
            let document = read_json(&metadata).await?;

            let ctx = ResolveContext::new(&catalog, &settings).with_station_id(station_id);
            for line in request_lines(&document, &ctx, &constraints, groups)? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Metadata and observation requests for the station a metadata document resolves to.
fn request_lines(
    document: &Value,
    ctx: &ResolveContext<'_>,
    constraints: &[Constraint],
    groups: Vec<i64>,
) -> Result<Vec<String>> {
    let resolved = VersionAdapter::detect(document)?.resolve(document, ctx, Attributes::new())?;
    let station = &resolved.station;

    let window = TimeWindow::from_constraints(constraints, ctx.settings.end_time_padding_secs)?;
    let request = ObservationRequest::for_station(station, window);

    let mut lines = vec![
        format!("Station {} ({})", station.id, station.label),
        "\nMetadata request:".to_string(),
    ];
    match station.api_version() {
        ApiVersion::Current => {
            let filter = SensorFilter::for_station(station.id).with_parameter_groups(groups);
            lines.push(format!("  filter={}", filter.to_json()?));
        }
        ApiVersion::Legacy => {
            for (key, value) in legacy_metadata_query_params(station.id) {
                lines.push(format!("  {}={}", key, value));
            }
        }
    }
    lines.push("\nObservation request:".to_string());
    for (key, value) in request.query_params() {
        lines.push(format!("  {}={}", key, value));
    }
    Ok(lines)
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Creating log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Arc::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = result {
        warn!("Logging already initialized: {}", e);
    }
    Ok(())
}

async fn read_json(path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Parsing JSON in {}", path.display()))
}

async fn load_catalog(path: &Path) -> Result<Catalog> {
    let document = read_json(path).await?;
    CatalogReader::new()
        .parse(&document)
        .with_context(|| format!("Loading catalog {}", path.display()))
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::path::PathBuf;

    fn fixture(name: &str) -> Value {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name);
        let text = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_request_lines_for_resolved_station() {
        let catalog = CatalogReader::new().parse(&fixture("catalog.json")).unwrap();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings);
        let constraints = vec!["time>=2017-12-11T18:05:00Z".parse::<Constraint>().unwrap()];

        let lines = request_lines(&fixture("legacy_metadata.json"), &ctx, &constraints, Vec::new())
            .unwrap();

        assert!(lines[0].starts_with("Station 20362 "));
        assert!(lines.contains(&"  stationid=20362".to_string()));
        assert!(lines.contains(&"  parameterids=47,50".to_string()));
        assert!(lines.contains(&"  start_time=1513015500".to_string()));
    }

    #[test]
    fn test_request_lines_carry_requested_station_id() {
        let catalog = Catalog::default();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings).with_station_id(Some(7));
        let document = serde_json::json!({"stations": [], "enhancedParameters": {}});

        let error = request_lines(&document, &ctx, &[], Vec::new()).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<ProcessingError>(),
            Some(ProcessingError::NoStationFound { station_id: Some(7) })
        ));
    }
}
