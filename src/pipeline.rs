use std::env;

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureSchema, FeatureTable};
use crate::labels::{LabelTable, labels_for_match};
use crate::table::{ActionTable, MatchActions};

static POOL: OnceCell<Option<rayon::ThreadPool>> = OnceCell::new();

/// Identifies one row of every per-action table the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub game_id: u64,
    pub action_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub generated_at: String,
    pub config: PipelineConfig,
    pub keys: Vec<RowKey>,
    pub features: FeatureTable,
    pub labels: LabelTable,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys, feature rows and labels must describe the same rows.
    pub fn check_aligned(&self) -> Result<()> {
        if self.features.len() != self.keys.len() || self.labels.len() != self.keys.len() {
            return Err(PipelineError::Misaligned(format!(
                "keys={} features={} labels={}",
                self.keys.len(),
                self.features.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }
}

struct MatchPartition {
    keys: Vec<RowKey>,
    rows: Vec<Vec<f64>>,
    labels: LabelTable,
}

pub fn build_dataset(table: &ActionTable, cfg: &PipelineConfig) -> Result<Dataset> {
    cfg.validate()?;
    let schema = FeatureSchema::new(cfg);
    let partitions = with_worker_pool(|| {
        table
            .matches()
            .par_iter()
            .map(|m| process_match(m, &schema, cfg.horizon))
            .collect::<Vec<_>>()
    });
    Ok(assemble(partitions, &schema, cfg))
}

/// Same as [`build_dataset`] on a dedicated pool of `threads` workers.
pub fn build_dataset_with_threads(
    table: &ActionTable,
    cfg: &PipelineConfig,
    threads: usize,
) -> Result<Dataset> {
    cfg.validate()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|err| PipelineError::Config(format!("worker pool: {err}")))?;
    let schema = FeatureSchema::new(cfg);
    let partitions = pool.install(|| {
        table
            .matches()
            .par_iter()
            .map(|m| process_match(m, &schema, cfg.horizon))
            .collect::<Vec<_>>()
    });
    Ok(assemble(partitions, &schema, cfg))
}

/// Row keys and feature rows for every action, without labels.
pub fn compute_features(
    table: &ActionTable,
    cfg: &PipelineConfig,
) -> Result<(Vec<RowKey>, FeatureTable)> {
    cfg.validate()?;
    let schema = FeatureSchema::new(cfg);
    let per_match: Vec<Vec<Vec<f64>>> = with_worker_pool(|| {
        table
            .matches()
            .par_iter()
            .map(|m| schema.extract_match(&m.actions))
            .collect()
    });
    let rows = per_match.into_iter().flatten().collect();
    Ok((
        row_keys(table),
        FeatureTable {
            columns: schema.columns().to_vec(),
            rows,
        },
    ))
}

pub fn compute_labels(table: &ActionTable, cfg: &PipelineConfig) -> Result<LabelTable> {
    cfg.validate()?;
    let per_match: Vec<LabelTable> = with_worker_pool(|| {
        table
            .matches()
            .par_iter()
            .map(|m| labels_for_match(&m.actions, cfg.horizon).into_iter().collect())
            .collect()
    });
    let mut out = LabelTable::default();
    for part in per_match {
        out.scores.extend(part.scores);
        out.concedes.extend(part.concedes);
    }
    Ok(out)
}

pub fn row_keys(table: &ActionTable) -> Vec<RowKey> {
    table.matches().iter().flat_map(match_keys).collect()
}

fn match_keys(m: &MatchActions) -> impl Iterator<Item = RowKey> + '_ {
    (0..m.actions.len()).map(move |action_index| RowKey {
        game_id: m.game_id,
        action_index,
    })
}

fn process_match(m: &MatchActions, schema: &FeatureSchema, horizon: usize) -> MatchPartition {
    let rows = schema.extract_match(&m.actions);
    let labels = labels_for_match(&m.actions, horizon).into_iter().collect();
    debug!(game_id = m.game_id, actions = m.actions.len(), "processed match");
    MatchPartition {
        keys: match_keys(m).collect(),
        rows,
        labels,
    }
}

fn assemble(
    partitions: Vec<MatchPartition>,
    schema: &FeatureSchema,
    cfg: &PipelineConfig,
) -> Dataset {
    let total: usize = partitions.iter().map(|p| p.keys.len()).sum();
    let mut keys = Vec::with_capacity(total);
    let mut rows = Vec::with_capacity(total);
    let mut labels = LabelTable::default();
    let matches = partitions.len();
    for part in partitions {
        keys.extend(part.keys);
        rows.extend(part.rows);
        labels.scores.extend(part.labels.scores);
        labels.concedes.extend(part.labels.concedes);
    }
    info!(matches, rows = total, width = schema.width(), "built dataset");
    Dataset {
        generated_at: chrono::Utc::now().to_rfc3339(),
        config: cfg.clone(),
        keys,
        features: FeatureTable {
            columns: schema.columns().to_vec(),
            rows,
        },
        labels,
    }
}

fn with_worker_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let pool = POOL.get_or_init(|| {
        let threads = worker_threads()?;
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .ok()
    });
    match pool {
        Some(pool) => pool.install(action),
        None => action(),
    }
}

/// `ACTION_VALUE_THREADS`, when set; otherwise rayon's global pool is used.
fn worker_threads() -> Option<usize> {
    env::var("ACTION_VALUE_THREADS")
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .map(|n| n.clamp(1, 64))
}
