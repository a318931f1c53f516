use crate::accumulator::{Accumulator, Dataset};
use crate::config::TwitterConfig;
use crate::sheets::{build_table, SheetPublisher};
use crate::twitter::{TimelineSource, UserId};
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

/// Everything fetched for one user, ready to publish.
#[derive(Debug)]
pub struct Export {
    pub handle: String,
    pub user_id: UserId,
    pub dataset: Dataset,
}

impl Export {
    pub fn table(&self) -> Vec<Vec<Value>> {
        build_table(&self.dataset.records)
    }

    /// Operator notice for a timeline that ran out early.
    pub fn shortfall_notice(&self) -> Option<String> {
        self.dataset.exhausted.then(|| {
            format!(
                "Only {} tweets could be fetched for @{}; exporting those",
                self.dataset.len(),
                self.handle
            )
        })
    }
}

/// Resolve `handle` and collect about `requested` of its most recent tweets.
pub async fn fetch_export<S: TimelineSource + ?Sized>(
    source: &S,
    config: &TwitterConfig,
    handle: &str,
    requested: usize,
) -> Result<Export> {
    let requested = if requested > config.max_total {
        warn!(
            requested,
            max_total = config.max_total,
            "request exceeds the deepest reachable timeline, capping"
        );
        config.max_total
    } else {
        requested
    };

    let user_id = source
        .lookup_user(handle)
        .await
        .with_context(|| format!("Failed to look up @{}", handle))?;
    info!(%handle, %user_id, "resolved user");

    let dataset = Accumulator::new(source, config.page_limits())
        .collect(&user_id, requested)
        .await
        .with_context(|| format!("Failed to fetch tweets for @{}", handle))?;

    if dataset.len() != requested {
        info!(
            requested,
            fetched = dataset.len(),
            exhausted = dataset.exhausted,
            "row count differs from request"
        );
    }

    Ok(Export {
        handle: handle.to_string(),
        user_id,
        dataset,
    })
}

pub async fn publish_export<P: SheetPublisher + ?Sized>(publisher: &P, export: &Export) -> Result<()> {
    publisher
        .publish(&export.table())
        .await
        .context("Failed to write to the spreadsheet")?;
    info!(rows = export.dataset.len(), "spreadsheet updated");
    Ok(())
}
