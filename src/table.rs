use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::actions::{Action, MAX_PERIOD};
use crate::config::{OrderingPolicy, Pitch, PipelineConfig};
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchActions {
    pub game_id: u64,
    pub actions: Vec<Action>,
}

impl MatchActions {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionTable {
    matches: Vec<MatchActions>,
}

impl ActionTable {
    /// Groups a flat action list by match (first appearance order), then
    /// validates each match and applies the configured ordering policy.
    pub fn from_actions(actions: Vec<Action>, cfg: &PipelineConfig) -> Result<Self> {
        let mut slot_by_game: HashMap<u64, usize> = HashMap::new();
        let mut matches: Vec<MatchActions> = Vec::new();
        for action in actions {
            let slot = *slot_by_game.entry(action.game_id).or_insert_with(|| {
                matches.push(MatchActions {
                    game_id: action.game_id,
                    actions: Vec::new(),
                });
                matches.len() - 1
            });
            matches[slot].actions.push(action);
        }

        for m in &mut matches {
            prepare_match(m, cfg)?;
        }
        debug!(matches = matches.len(), "grouped action table");
        Ok(Self { matches })
    }

    pub fn from_matches(matches: Vec<MatchActions>, cfg: &PipelineConfig) -> Result<Self> {
        let flat = matches
            .into_iter()
            .flat_map(|m| {
                let game_id = m.game_id;
                m.actions.into_iter().map(move |mut a| {
                    a.game_id = game_id;
                    a
                })
            })
            .collect();
        Self::from_actions(flat, cfg)
    }

    pub fn matches(&self) -> &[MatchActions] {
        &self.matches
    }

    pub fn num_matches(&self) -> usize {
        self.matches.len()
    }

    /// Total number of actions over all matches.
    pub fn len(&self) -> usize {
        self.matches.iter().map(MatchActions::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.iter().all(MatchActions::is_empty)
    }

    pub fn iter_actions(&self) -> impl Iterator<Item = &Action> {
        self.matches.iter().flat_map(|m| m.actions.iter())
    }
}

fn prepare_match(m: &mut MatchActions, cfg: &PipelineConfig) -> Result<()> {
    for (index, action) in m.actions.iter().enumerate() {
        validate_action(m.game_id, index, action, &cfg.pitch)?;
    }

    if let Some(index) = first_out_of_order(&m.actions) {
        match cfg.ordering {
            OrderingPolicy::Reject => {
                return Err(PipelineError::OutOfOrder {
                    game_id: m.game_id,
                    index,
                });
            }
            OrderingPolicy::StableSort => {
                warn!(game_id = m.game_id, index, "re-sorting out-of-order match");
                // `sort_by` is stable: exact ties keep their input order.
                m.actions.sort_by(|a, b| {
                    a.period_id
                        .cmp(&b.period_id)
                        .then(a.time_seconds.total_cmp(&b.time_seconds))
                });
            }
        }
    }
    Ok(())
}

pub fn validate_action(game_id: u64, index: usize, action: &Action, pitch: &Pitch) -> Result<()> {
    if action.period_id == 0 || action.period_id > MAX_PERIOD {
        return Err(PipelineError::InvalidPeriod {
            game_id,
            index,
            period: action.period_id,
        });
    }
    if !action.time_seconds.is_finite() || action.time_seconds < 0.0 {
        return Err(PipelineError::InvalidTime {
            game_id,
            index,
            seconds: action.time_seconds,
        });
    }

    let coords = [
        ("start_x", action.start_x, pitch.length),
        ("start_y", action.start_y, pitch.width),
        ("end_x", action.end_x, pitch.length),
        ("end_y", action.end_y, pitch.width),
    ];
    for (field, value, limit) in coords {
        if !value.is_finite() || value < 0.0 || value > limit {
            return Err(PipelineError::OutOfBounds {
                game_id,
                index,
                field,
                value,
                limit,
            });
        }
    }
    Ok(())
}

/// Index of the first action that sorts before its predecessor.
pub fn first_out_of_order(actions: &[Action]) -> Option<usize> {
    actions
        .windows(2)
        .position(|w| {
            (w[1].period_id, w[1].time_seconds) < (w[0].period_id, w[0].time_seconds)
        })
        .map(|pos| pos + 1)
}
