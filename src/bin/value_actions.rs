use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use action_value::config::PipelineConfig;
use action_value::evaluation::{self, BinaryMetrics};
use action_value::ingest::load_action_table;
use action_value::model::{BaseRateModel, ProbabilityModel, predict_probabilities};
use action_value::pipeline::build_dataset;
use action_value::synthetic::synthetic_table;
use action_value::valuation::{ProbabilityRow, value_actions};

const DEFAULT_SYNTHETIC_MATCHES: usize = 20;
const DEFAULT_SYNTHETIC_ACTIONS: usize = 1500;
const DEFAULT_SEED: u64 = 7;
const DEFAULT_TOP: usize = 10;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let mut cfg = PipelineConfig::from_env().context("read ACTION_VALUE_* environment")?;
    if let Some(k) = parse_usize_arg("--window") {
        cfg = cfg.with_window(k);
    }
    if let Some(h) = parse_usize_arg("--horizon") {
        cfg = cfg.with_horizon(h);
    }
    cfg.validate()?;

    let table = match parse_path_arg("--actions") {
        Some(path) => load_action_table(&path, &cfg)
            .with_context(|| format!("load actions from {}", path.display()))?,
        None => {
            let matches = parse_usize_arg("--synthetic").unwrap_or(DEFAULT_SYNTHETIC_MATCHES);
            let seed = parse_u64_arg("--seed").unwrap_or(DEFAULT_SEED);
            synthetic_table(matches.max(1), DEFAULT_SYNTHETIC_ACTIONS, seed, &cfg)
                .context("generate synthetic matches")?
        }
    };
    if table.is_empty() {
        return Err(anyhow!("no actions to value"));
    }

    let dataset = build_dataset(&table, &cfg).context("build dataset")?;

    let probabilities: Vec<ProbabilityRow> = match parse_path_arg("--predictions") {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read predictions {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parse predictions {}", path.display()))?
        }
        None => {
            let mut scores = BaseRateModel::default();
            let mut concedes = BaseRateModel::default();
            scores.fit(&dataset.features, &dataset.labels.scores)?;
            concedes.fit(&dataset.features, &dataset.labels.concedes)?;
            predict_probabilities(&scores, &concedes, &dataset)?
        }
    };

    let score_preds: Vec<f64> = probabilities.iter().map(|p| p.scores).collect();
    let concede_preds: Vec<f64> = probabilities.iter().map(|p| p.concedes).collect();
    if score_preds.len() == dataset.len() {
        print_metrics("scores", evaluation::evaluate(&score_preds, &dataset.labels.scores));
        print_metrics(
            "concedes",
            evaluation::evaluate(&concede_preds, &dataset.labels.concedes),
        );
        print_calibration(&score_preds, &dataset.labels.scores);
    }

    let values = value_actions(&table, &probabilities, &cfg).context("value actions")?;

    let top = parse_usize_arg("--top").unwrap_or(DEFAULT_TOP).max(1);
    let mut ranked = values.clone();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    println!("Top {top} actions by total value");
    for v in ranked.iter().take(top) {
        println!(
            "  game {:>6} #{:<5} player {:>8} {:<14} off {:+.4} def {:+.4} total {:+.4}",
            v.key.game_id,
            v.key.action_index,
            v.player_id,
            v.action_type.name(),
            v.offensive,
            v.defensive,
            v.total
        );
    }

    if let Some(out) = parse_path_arg("--out") {
        let raw = serde_json::to_string(&values).context("serialize values")?;
        fs::write(&out, raw).with_context(|| format!("write {}", out.display()))?;
        println!("values written to {}", out.display());
    }
    Ok(())
}

fn print_metrics(label: &str, m: BinaryMetrics) {
    println!(
        "{label:<9} n={} brier={:.5} log_loss={:.5} acc={:.4} auc={:.4} base_rate={:.4}",
        m.samples, m.brier, m.log_loss, m.accuracy, m.roc_auc, m.base_rate
    );
}

fn print_calibration(preds: &[f64], outcomes: &[bool]) {
    println!("scores calibration");
    for bin in evaluation::calibration_bins(preds, outcomes, 10) {
        if bin.count == 0 {
            continue;
        }
        println!(
            "  [{:.1}, {:.1}) n={:<6} pred={:.4} actual={:.4}",
            bin.bucket_start, bin.bucket_end, bin.count, bin.avg_pred, bin.actual_rate
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("action_value=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&format!("{name}="))
            && !v.trim().is_empty()
        {
            return Some(PathBuf::from(v.trim()));
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}

fn parse_usize_arg(name: &str) -> Option<usize> {
    parse_arg::<usize>(name)
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    parse_arg::<u64>(name)
}

fn parse_arg<T: std::str::FromStr>(name: &str) -> Option<T> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<T>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<T>()
        {
            return Some(v);
        }
    }
    None
}
