use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionType};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::{RowKey, row_keys};
use crate::table::ActionTable;

/// Model estimates for the game state after an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRow {
    pub key: RowKey,
    pub scores: f64,
    pub concedes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StateProbabilities {
    pub scores: f64,
    pub concedes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueDelta {
    pub offensive: f64,
    pub defensive: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    pub key: RowKey,
    pub team_id: u64,
    pub player_id: u64,
    pub action_type: ActionType,
    pub offensive: f64,
    pub defensive: f64,
    pub total: f64,
}

/// offensive = scores after - scores before; defensive = concedes before - concedes after.
pub fn combine(before: StateProbabilities, after: StateProbabilities) -> ValueDelta {
    let offensive = after.scores - before.scores;
    let defensive = before.concedes - after.concedes;
    ValueDelta {
        offensive,
        defensive,
        total: offensive + defensive,
    }
}

/// Values every action of `table` from post-action probabilities.
pub fn value_actions(
    table: &ActionTable,
    probabilities: &[ProbabilityRow],
    cfg: &PipelineConfig,
) -> Result<Vec<ActionValue>> {
    check_alignment(&row_keys(table), probabilities)?;

    let mut out = Vec::with_capacity(probabilities.len());
    let mut offset = 0usize;
    for m in table.matches() {
        let probs = &probabilities[offset..offset + m.actions.len()];
        offset += m.actions.len();
        for (i, (action, p)) in m.actions.iter().zip(probs).enumerate() {
            let after = StateProbabilities {
                scores: p.scores,
                concedes: p.concedes,
            };
            let before = prior_state(&m.actions, probs, i, cfg);
            let delta = combine(before, after);
            out.push(ActionValue {
                key: p.key,
                team_id: action.team_id,
                player_id: action.player_id,
                action_type: action.action_type,
                offensive: delta.offensive,
                defensive: delta.defensive,
                total: delta.total,
            });
        }
    }
    Ok(out)
}

/// Probabilities of the state before action `i`, seen from action `i`'s team.
///
/// The first action of a match is its own prior. After a long gap or a goal
/// the previous state no longer carries any threat.
pub fn prior_state(
    actions: &[Action],
    probs: &[ProbabilityRow],
    i: usize,
    cfg: &PipelineConfig,
) -> StateProbabilities {
    let Some(prev_idx) = i.checked_sub(1) else {
        return StateProbabilities {
            scores: probs[i].scores,
            concedes: probs[i].concedes,
        };
    };
    let prev = &actions[prev_idx];
    let cur = &actions[i];

    let gap = cur.time_seconds_overall() - prev.time_seconds_overall();
    if gap.abs() > cfg.same_phase_seconds || prev.is_goal() || prev.is_any_owngoal() {
        return StateProbabilities::default();
    }

    let p = &probs[prev_idx];
    if prev.team_id == cur.team_id {
        StateProbabilities {
            scores: p.scores,
            concedes: p.concedes,
        }
    } else {
        StateProbabilities {
            scores: p.concedes,
            concedes: p.scores,
        }
    }
}

fn check_alignment(expected: &[RowKey], probabilities: &[ProbabilityRow]) -> Result<()> {
    if expected.len() != probabilities.len() {
        return Err(PipelineError::Misaligned(format!(
            "{} actions but {} probability rows",
            expected.len(),
            probabilities.len()
        )));
    }
    for (row, (want, got)) in expected.iter().zip(probabilities).enumerate() {
        if *want != got.key {
            return Err(PipelineError::Misaligned(format!(
                "row {row}: expected game {} action {}, got game {} action {}",
                want.game_id, want.action_index, got.key.game_id, got.key.action_index
            )));
        }
        for (name, v) in [("scores", got.scores), ("concedes", got.concedes)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(PipelineError::Misaligned(format!(
                    "row {row}: {name} probability {v} outside [0, 1]"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_follows_offense_defense_split() {
        let d = combine(
            StateProbabilities {
                scores: 0.02,
                concedes: 0.01,
            },
            StateProbabilities {
                scores: 0.10,
                concedes: 0.005,
            },
        );
        assert!((d.offensive - 0.08).abs() < 1e-12);
        assert!((d.defensive - 0.005).abs() < 1e-12);
        assert!((d.total - 0.085).abs() < 1e-12);
    }

    #[test]
    fn alignment_rejects_swapped_keys() {
        let keys = [
            RowKey {
                game_id: 1,
                action_index: 0,
            },
            RowKey {
                game_id: 1,
                action_index: 1,
            },
        ];
        let rows = [
            ProbabilityRow {
                key: keys[1],
                scores: 0.1,
                concedes: 0.1,
            },
            ProbabilityRow {
                key: keys[0],
                scores: 0.1,
                concedes: 0.1,
            },
        ];
        assert!(matches!(
            check_alignment(&keys, &rows),
            Err(PipelineError::Misaligned(_))
        ));
    }

    #[test]
    fn alignment_rejects_probabilities_outside_unit_interval() {
        let key = RowKey {
            game_id: 1,
            action_index: 0,
        };
        let rows = [ProbabilityRow {
            key,
            scores: f64::NAN,
            concedes: 0.0,
        }];
        assert!(check_alignment(&[key], &rows).is_err());
    }
}
