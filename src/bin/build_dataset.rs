use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use action_value::config::PipelineConfig;
use action_value::ingest::load_action_table;
use action_value::pipeline::build_dataset;
use action_value::synthetic::synthetic_table;

const DEFAULT_SYNTHETIC_ACTIONS: usize = 1500;
const DEFAULT_SEED: u64 = 7;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let cfg = load_config()?;
    let table = if let Some(path) = parse_path_arg("--actions") {
        load_action_table(&path, &cfg)
            .with_context(|| format!("load actions from {}", path.display()))?
    } else if let Some(matches) = parse_usize_arg("--synthetic") {
        let actions = parse_usize_arg("--synthetic-actions").unwrap_or(DEFAULT_SYNTHETIC_ACTIONS);
        let seed = parse_u64_arg("--seed").unwrap_or(DEFAULT_SEED);
        synthetic_table(matches.max(1), actions.max(1), seed, &cfg)
            .context("generate synthetic matches")?
    } else {
        return Err(anyhow!(
            "usage: build_dataset (--actions <file.json|file.parquet> | --synthetic <matches>) \
             [--window K] [--horizon H] [--config cfg.json] [--out dataset.json]"
        ));
    };

    let dataset = build_dataset(&table, &cfg).context("build dataset")?;
    dataset.check_aligned()?;
    let (score_rate, concede_rate) = dataset.labels.positive_rates();

    println!("Dataset summary");
    println!("  matches:        {}", table.num_matches());
    println!("  rows:           {}", dataset.len());
    println!("  feature width:  {}", dataset.features.width());
    println!("  window / horizon: {} / {}", cfg.window_size, cfg.horizon);
    println!("  scores rate:    {:.4}", score_rate);
    println!("  concedes rate:  {:.4}", concede_rate);

    if let Some(out) = parse_path_arg("--out") {
        if let Some(parent) = out.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
        let raw = serde_json::to_string(&dataset).context("serialize dataset")?;
        fs::write(&out, raw).with_context(|| format!("write {}", out.display()))?;
        println!("  written to:     {}", out.display());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("action_value=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--config` (or defaults), then `ACTION_VALUE_*` overrides, then `--window`/`--horizon`.
fn load_config() -> Result<PipelineConfig> {
    let base = match parse_path_arg("--config") {
        Some(path) => PipelineConfig::load(&path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut cfg = base
        .with_env_overrides()
        .context("read ACTION_VALUE_* environment")?;
    if let Some(k) = parse_usize_arg("--window") {
        cfg = cfg.with_window(k);
    }
    if let Some(h) = parse_usize_arg("--horizon") {
        cfg = cfg.with_horizon(h);
    }
    cfg.validate()?;
    Ok(cfg)
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
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<usize>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<usize>()
        {
            return Some(v);
        }
    }
    None
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<u64>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<u64>()
        {
            return Some(v);
        }
    }
    None
}
