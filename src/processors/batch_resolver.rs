use crate::error::{ProcessingError, Result};
use crate::models::Attributes;
use crate::processors::{ResolveContext, ResolvedStation, VersionAdapter};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// A station metadata document and where it came from.
#[derive(Debug, Clone)]
pub struct StationDocument {
    pub source: String,
    pub document: Value,
}

impl StationDocument {
    pub fn new(source: impl Into<String>, document: Value) -> Self {
        Self {
            source: source.into(),
            document,
        }
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub source: String,
    pub result: Result<ResolvedStation>,
}

/// Resolves many station documents in parallel against one shared catalog.
pub struct BatchResolver {
    max_workers: usize,
    fail_fast: bool,
}

impl BatchResolver {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            fail_fast: false,
        }
    }

    /// Abort the whole batch on the first failed document.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    fn resolve_one(
        document: &StationDocument,
        ctx: &ResolveContext<'_>,
        base: &Attributes,
    ) -> Result<ResolvedStation> {
        let adapter = VersionAdapter::detect(&document.document)?;
        adapter.resolve(&document.document, ctx, base.clone())
    }

    /// Outcomes are returned in input order.
    pub fn resolve_all(
        &self,
        documents: &[StationDocument],
        ctx: &ResolveContext<'_>,
        base: &Attributes,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<BatchOutcome>> {
        let total = documents.len();
        let processed = AtomicUsize::new(0);

        if let Some(p) = progress {
            p.set_message(&format!("Resolving {} station documents...", total));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let resolve = |doc: &StationDocument| {
            let result = Self::resolve_one(doc, ctx, base);
            processed.fetch_add(1, Ordering::Relaxed);
            if let Some(p) = progress {
                p.increment(1);
            }
            result
        };

        if self.fail_fast {
            // Collecting into a Result stops handing out documents after the first error
            let resolved: Result<Vec<BatchOutcome>> = pool.install(|| {
                documents
                    .par_iter()
                    .map(|doc| {
                        resolve(doc)
                            .map(|station| BatchOutcome {
                                source: doc.source.clone(),
                                result: Ok(station),
                            })
                            .map_err(|e| {
                                warn!("Failed to resolve {}: {}", doc.source, e);
                                e
                            })
                    })
                    .collect()
            });
            return match resolved {
                Ok(outcomes) => {
                    self.report(progress, total, 0, &processed);
                    Ok(outcomes)
                }
                Err(e) => {
                    if let Some(p) = progress {
                        p.abandon_with_message(&format!(
                            "Stopped after {} of {} station documents",
                            processed.load(Ordering::Relaxed),
                            total
                        ));
                    }
                    Err(e)
                }
            };
        }

        let outcomes: Vec<BatchOutcome> = pool.install(|| {
            documents
                .par_iter()
                .map(|doc| BatchOutcome {
                    source: doc.source.clone(),
                    result: resolve(doc),
                })
                .collect()
        });

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                warn!("Failed to resolve {}: {}", outcome.source, e);
            }
        }

        self.report(progress, total, failed, &processed);
        Ok(outcomes)
    }

    fn report(
        &self,
        progress: Option<&ProgressReporter>,
        total: usize,
        failed: usize,
        processed: &AtomicUsize,
    ) {
        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Resolved {} of {} station documents",
                total - failed,
                total
            ));
        }
        info!(
            "Batch resolution finished: {} documents, {} failed",
            processed.load(Ordering::Relaxed),
            failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Catalog;
    use crate::settings::Settings;
    use serde_json::json;

    fn legacy_document(id: i64) -> Value {
        json!({
            "stations": [{
                "id": id, "label": format!("Station {}", id), "urn": format!("urn:{}", id),
                "latitude": 10.0, "longitude": 20.0, "startDate": 0, "endDate": 10,
                "parameters": []
            }],
            "enhancedParameters": {}
        })
    }

    #[test]
    fn test_outcomes_keep_input_order_and_errors() {
        let catalog = Catalog::default();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings);
        let documents = vec![
            StationDocument::new("a.json", legacy_document(1)),
            StationDocument::new("b.json", json!({"unexpected": true})),
            StationDocument::new("c.json", legacy_document(3)),
        ];

        let outcomes = BatchResolver::new(2)
            .resolve_all(&documents, &ctx, &Attributes::new(), None)
            .unwrap();

        let sources: Vec<&str> = outcomes.iter().map(|o| o.source.as_str()).collect();
        assert_eq!(sources, vec!["a.json", "b.json", "c.json"]);
        // No device feeds in these documents, so every one of them fails
        assert!(outcomes.iter().all(|o| o.result.is_err()));
    }

    #[test]
    fn test_fail_fast_returns_error() {
        let catalog = Catalog::default();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings);
        let documents = vec![StationDocument::new("bad.json", json!([]))];

        let result = BatchResolver::new(1)
            .with_fail_fast(true)
            .resolve_all(&documents, &ctx, &Attributes::new(), None);
        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_fail_fast_stops_early_and_closes_progress() {
        let catalog = Catalog::default();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings);
        let documents: Vec<StationDocument> = (0..64)
            .map(|i| StationDocument::new(format!("{}.json", i), json!([])))
            .collect();
        let progress = ProgressReporter::new(documents.len() as u64, "Resolving...", false);

        let result = BatchResolver::new(1)
            .with_fail_fast(true)
            .resolve_all(&documents, &ctx, &Attributes::new(), Some(&progress));

        assert!(result.is_err());
        assert!(progress.is_finished());
        assert!(progress.position() < documents.len() as u64);
    }

    #[test]
    fn test_without_fail_fast_every_document_is_resolved() {
        let catalog = Catalog::default();
        let settings = Settings::default();
        let ctx = ResolveContext::new(&catalog, &settings);
        let documents: Vec<StationDocument> = (0..8)
            .map(|i| StationDocument::new(format!("{}.json", i), json!([])))
            .collect();
        let progress = ProgressReporter::new(documents.len() as u64, "Resolving...", false);

        let outcomes = BatchResolver::new(2)
            .resolve_all(&documents, &ctx, &Attributes::new(), Some(&progress))
            .unwrap();

        assert_eq!(outcomes.len(), 8);
        assert!(progress.is_finished());
        assert_eq!(progress.position(), 8);
    }
}
