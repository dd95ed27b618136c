//! Fan-out/fan-in over the selected variants
//!
//! The coordinator launches one [`FetchTask`](crate::fetch_task::FetchTask) per
//! selected variant and waits for all of them. Every selected variant yields
//! exactly one [`FetchOutcome`]:
//!
//! - variants whose version cannot be resolved fail immediately and are never launched
//! - launched tasks are joined through their `JoinHandle`s, so a task that panics
//!   still reports a failure instead of disappearing
//!
//! One variant's failure never prevents or aborts another variant's task.

use crate::artifacts::ArtifactSource;
use crate::config::Config;
use crate::error::FetchError;
use crate::fetch_task::{FetchRequest, fetch_variant};
use crate::filter::{Selection, select_variants};
use crate::types::FetchOutcome;
use crate::versions::{BaseVersions, resolve_version};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs fetch tasks for every selected variant
pub struct Coordinator {
    config: Arc<Config>,
    versions: Arc<BaseVersions>,
    source: Arc<dyn ArtifactSource>,
}

impl Coordinator {
    /// Create a coordinator over read-only configuration and base versions
    pub fn new(
        config: Arc<Config>,
        versions: Arc<BaseVersions>,
        source: Arc<dyn ArtifactSource>,
    ) -> Self {
        Self {
            config,
            versions,
            source,
        }
    }

    /// Variants selected by the configured include/ignore lists
    pub fn selection(&self) -> Selection {
        select_variants(
            &self.config.variants,
            &self.config.include,
            &self.config.ignore,
        )
    }

    /// Run all selected variants and return every outcome, keyed by variant id
    ///
    /// The returned vector has one entry per selected variant, in selection order.
    pub async fn run_outcomes(&self, cancel: CancellationToken) -> Vec<(String, FetchOutcome)> {
        let selection = self.selection();
        if selection.is_empty() {
            tracing::info!("no variants selected, nothing to fetch");
            return Vec::new();
        }

        tracing::info!(
            run_id = %self.config.run_id,
            variants = selection.len(),
            source = self.source.name(),
            "fetching release notes"
        );

        let pending: Vec<(String, Pending)> = selection
            .iter()
            .map(|(variant, subpath)| {
                let pending = match self.request_for(variant, subpath) {
                    Ok(request) => Pending::Launched(tokio::spawn(fetch_variant(
                        request,
                        Arc::clone(&self.source),
                        cancel.clone(),
                    ))),
                    Err(e) => {
                        tracing::warn!(variant = %variant, error = %e, "variant not launched");
                        Pending::Rejected(e)
                    }
                };
                (variant.to_string(), pending)
            })
            .collect();

        let outcomes = join_all(
            pending
                .into_iter()
                .map(|(variant, pending)| async move {
                    let outcome = pending.wait(&variant).await;
                    (variant, outcome)
                }),
        )
        .await;

        let failed = outcomes.iter().filter(|(_, o)| o.is_err()).count();
        tracing::info!(
            succeeded = outcomes.len() - failed,
            failed,
            "all fetch tasks finished"
        );
        outcomes
    }

    /// Run all selected variants and return only the failures
    ///
    /// An empty vector means every variant succeeded. Order is unspecified.
    pub async fn run(&self, cancel: CancellationToken) -> Vec<FetchError> {
        self.run_outcomes(cancel)
            .await
            .into_iter()
            .filter_map(|(_, outcome)| outcome.err())
            .collect()
    }

    fn request_for(&self, variant: &str, subpath: &Path) -> Result<FetchRequest, FetchError> {
        let configuration_error = |reason: String| FetchError::Configuration {
            variant: variant.to_string(),
            reason,
        };

        let base = self
            .versions
            .get(variant)
            .ok_or_else(|| configuration_error("no base image version configured".into()))?;
        let version = resolve_version(base, &self.config.build_date)
            .map_err(|e| configuration_error(e.to_string()))?;

        Ok(FetchRequest {
            variant: variant.to_string(),
            subpath: subpath.to_path_buf(),
            run_id: self.config.run_id.clone(),
            version,
            output_root: self.config.output_root.clone(),
            workspace_root: self.config.workspace_root.clone(),
        })
    }
}

/// A selected variant that is either running or was rejected before launch
enum Pending {
    Launched(JoinHandle<FetchOutcome>),
    Rejected(FetchError),
}

impl Pending {
    async fn wait(self, variant: &str) -> FetchOutcome {
        match self {
            Pending::Rejected(e) => Err(e),
            Pending::Launched(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(variant = %variant, error = %e, "fetch task panicked");
                    Err(FetchError::TaskPanicked {
                        variant: variant.to_string(),
                        reason: e.to_string(),
                    })
                }
            },
        }
    }
}
