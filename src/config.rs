use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_PITCH_LENGTH: f64 = 105.0;
pub const DEFAULT_PITCH_WIDTH: f64 = 68.0;
pub const DEFAULT_WINDOW_SIZE: usize = 3;
pub const DEFAULT_HORIZON: usize = 10;
pub const DEFAULT_SAME_PHASE_SECONDS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub length: f64,
    pub width: f64,
}

impl Default for Pitch {
    fn default() -> Self {
        Self {
            length: DEFAULT_PITCH_LENGTH,
            width: DEFAULT_PITCH_WIDTH,
        }
    }
}

impl Pitch {
    /// Centre of the goal the canonical attacking team plays towards.
    pub fn goal(&self) -> (f64, f64) {
        (self.length, self.width / 2.0)
    }

    pub fn mirror_x(&self, x: f64) -> f64 {
        self.length - x
    }

    pub fn mirror_y(&self, y: f64) -> f64 {
        self.width - y
    }
}

/// What to do with a match whose actions are not sorted by (period, seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    #[default]
    Reject,
    /// Stable sort; exact ties keep their input order.
    StableSort,
}

impl OrderingPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" | "strict" => Some(Self::Reject),
            "sort" | "stable_sort" | "stable-sort" => Some(Self::StableSort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub pitch: Pitch,
    /// Number of slots per game state (anchor plus predecessors).
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Number of actions scanned forward for labels, the anchor included.
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_same_phase_seconds")]
    pub same_phase_seconds: f64,
    #[serde(default)]
    pub ordering: OrderingPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pitch: Pitch::default(),
            window_size: DEFAULT_WINDOW_SIZE,
            horizon: DEFAULT_HORIZON,
            same_phase_seconds: DEFAULT_SAME_PHASE_SECONDS,
            ordering: OrderingPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Defaults overridden by `ACTION_VALUE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Applies any `ACTION_VALUE_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_f64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());
        let parse_usize = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        if let Some(v) = parse_f64("ACTION_VALUE_PITCH_LENGTH") {
            self.pitch.length = v;
        }
        if let Some(v) = parse_f64("ACTION_VALUE_PITCH_WIDTH") {
            self.pitch.width = v;
        }
        if let Some(v) = parse_usize("ACTION_VALUE_WINDOW") {
            self.window_size = v;
        }
        if let Some(v) = parse_usize("ACTION_VALUE_HORIZON") {
            self.horizon = v;
        }
        if let Some(v) = parse_f64("ACTION_VALUE_SAME_PHASE_SECS") {
            self.same_phase_seconds = v;
        }
        if let Some(raw) = lookup("ACTION_VALUE_ORDERING") {
            self.ordering = OrderingPolicy::parse(&raw).ok_or_else(|| {
                PipelineError::Config(format!("unknown ordering policy `{}`", raw.trim()))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg = serde_json::from_str::<Self>(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PipelineError::Config("window size must be at least 1".into()));
        }
        if self.horizon == 0 {
            return Err(PipelineError::Config("horizon must be at least 1".into()));
        }
        if !(self.pitch.length.is_finite() && self.pitch.length > 0.0) {
            return Err(PipelineError::Config(format!(
                "pitch length must be positive, got {}",
                self.pitch.length
            )));
        }
        if !(self.pitch.width.is_finite() && self.pitch.width > 0.0) {
            return Err(PipelineError::Config(format!(
                "pitch width must be positive, got {}",
                self.pitch.width
            )));
        }
        if !(self.same_phase_seconds.is_finite() && self.same_phase_seconds >= 0.0) {
            return Err(PipelineError::Config(format!(
                "same-phase seconds must be non-negative, got {}",
                self.same_phase_seconds
            )));
        }
        Ok(())
    }
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_same_phase_seconds() -> f64 {
    DEFAULT_SAME_PHASE_SECONDS
}
