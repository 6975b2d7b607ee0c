use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionResult, ActionType, BodyPart};
use crate::config::{Pitch, PipelineConfig};
use crate::normalize::normalize_state;
use crate::window::{GameState, game_states};

pub const SLOT_FEATURE_NAMES: [&str; 11] = [
    "start_x_norm",
    "start_y_norm",
    "start_dist_to_goal",
    "start_angle_to_goal",
    "end_x_norm",
    "end_y_norm",
    "end_dist_to_goal",
    "end_angle_to_goal",
    "dx",
    "dy",
    "movement",
];

/// Only emitted for slots `1..K`.
pub const CONTEXT_FEATURE_NAMES: [&str; 2] = ["same_team", "missing"];

pub const WINDOW_FEATURE_NAMES: [&str; 6] = [
    "time_seconds_overall",
    "seq_dx_start",
    "seq_dy_start",
    "seq_dx_end",
    "seq_dy_end",
    "seq_dt",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.column_index(name)?;
        self.rows.iter().map(|r| r.get(col).copied()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct FeatureSchema {
    pitch: Pitch,
    window_size: usize,
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(cfg: &PipelineConfig) -> Self {
        let window_size = cfg.window_size.max(1);
        Self {
            pitch: cfg.pitch,
            window_size,
            columns: feature_names(window_size),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Feature row for a raw game state; opposing-team slots are mirrored first.
    pub fn extract(&self, state: &GameState) -> Vec<f64> {
        let state = normalize_state(state, &self.pitch);
        let mut row = Vec::with_capacity(self.width());
        let anchor = *state.anchor();

        for offset in 0..self.window_size {
            let slot = state.slot(offset);
            match slot {
                Some(a) => row.extend(slot_features(a, &self.pitch)),
                None => row.extend([0.0; SLOT_FEATURE_NAMES.len()]),
            }
            if offset > 0 {
                let same_team = slot.is_some_and(|a| a.team_id == anchor.team_id);
                row.push(flag(same_team));
                row.push(flag(slot.is_none()));
            }
        }

        row.extend(ActionType::ALL.iter().map(|t| flag(anchor.action_type == *t)));
        row.extend(ActionResult::ALL.iter().map(|r| flag(anchor.result == *r)));
        row.extend(BodyPart::ALL.iter().map(|b| flag(anchor.bodypart == *b)));

        row.push(anchor.time_seconds_overall());
        row.extend(sequence_deltas(&anchor, state.oldest()));

        debug_assert_eq!(row.len(), self.width());
        row
    }

    /// Feature rows for one match, in action order.
    pub fn extract_match(&self, actions: &[Action]) -> Vec<Vec<f64>> {
        game_states(actions, self.window_size)
            .iter()
            .map(|s| self.extract(s))
            .collect()
    }
}

pub fn feature_names(window_size: usize) -> Vec<String> {
    let mut names = Vec::new();
    for offset in 0..window_size.max(1) {
        names.extend(SLOT_FEATURE_NAMES.iter().map(|f| format!("{f}-{offset}")));
        if offset > 0 {
            names.extend(CONTEXT_FEATURE_NAMES.iter().map(|f| format!("{f}-{offset}")));
        }
    }
    names.extend(ActionType::ALL.iter().map(|t| format!("type_{}-0", t.name())));
    names.extend(ActionResult::ALL.iter().map(|r| format!("result_{}-0", r.name())));
    names.extend(BodyPart::ALL.iter().map(|b| format!("bodypart_{}-0", b.name())));
    names.extend(WINDOW_FEATURE_NAMES.iter().map(|f| f.to_string()));
    names
}

fn slot_features(a: &Action, pitch: &Pitch) -> [f64; SLOT_FEATURE_NAMES.len()] {
    let dx = a.end_x - a.start_x;
    let dy = a.end_y - a.start_y;
    [
        ratio(a.start_x, pitch.length),
        ratio(a.start_y, pitch.width),
        dist_to_goal(a.start_x, a.start_y, pitch),
        angle_to_goal(a.start_x, a.start_y, pitch),
        ratio(a.end_x, pitch.length),
        ratio(a.end_y, pitch.width),
        dist_to_goal(a.end_x, a.end_y, pitch),
        angle_to_goal(a.end_x, a.end_y, pitch),
        dx,
        dy,
        dx.hypot(dy),
    ]
}

/// Anchor minus the oldest slot; zero when the oldest slot precedes the match.
fn sequence_deltas(anchor: &Action, oldest: Option<&Action>) -> [f64; 5] {
    let Some(old) = oldest else {
        return [0.0; 5];
    };
    [
        anchor.start_x - old.start_x,
        anchor.start_y - old.start_y,
        anchor.end_x - old.start_x,
        anchor.end_y - old.start_y,
        anchor.time_seconds_overall() - old.time_seconds_overall(),
    ]
}

pub fn dist_to_goal(x: f64, y: f64, pitch: &Pitch) -> f64 {
    let (gx, gy) = pitch.goal();
    (gx - x).hypot(gy - y)
}

/// `atan(horizontal offset / vertical offset)` to the goal centre; 0 on the
/// goal's own height so nothing divides by zero.
pub fn angle_to_goal(x: f64, y: f64, pitch: &Pitch) -> f64 {
    let (gx, gy) = pitch.goal();
    let dx = gx - x;
    let dy = (gy - y).abs();
    if dy == 0.0 {
        return 0.0;
    }
    (dx / dy).atan()
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

fn flag(v: bool) -> f64 {
    if v { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(x: f64, y: f64) -> Action {
        Action {
            game_id: 1,
            team_id: 1,
            player_id: 1,
            period_id: 1,
            time_seconds: 30.0,
            action_type: ActionType::Shot,
            bodypart: BodyPart::Head,
            result: ActionResult::Fail,
            start_x: x,
            start_y: y,
            end_x: 105.0,
            end_y: 34.0,
        }
    }

    #[test]
    fn width_matches_names() {
        let cfg = PipelineConfig::default();
        let schema = FeatureSchema::new(&cfg);
        // 3 slots x 11, 2 slots x 2 context, 23 + 6 + 3 one-hots, 6 window.
        assert_eq!(schema.width(), 33 + 4 + 32 + 6);
        let row = schema.extract_match(&[shot(90.0, 30.0)]).remove(0);
        assert_eq!(row.len(), schema.width());
    }

    #[test]
    fn angle_is_zero_on_goal_height() {
        let pitch = Pitch::default();
        assert_eq!(angle_to_goal(50.0, 34.0, &pitch), 0.0);
        assert_eq!(angle_to_goal(105.0, 34.0, &pitch), 0.0);
        let a = angle_to_goal(101.0, 30.0, &pitch);
        assert!((a - 1.0_f64.atan()).abs() < 1e-12);
    }

    #[test]
    fn distance_is_euclidean_to_goal_centre() {
        let pitch = Pitch::default();
        assert!((dist_to_goal(102.0, 30.0, &pitch) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn one_hots_mark_anchor_only() {
        let schema = FeatureSchema::new(&PipelineConfig::default());
        let names = schema.columns();
        let row = schema.extract_match(&[shot(90.0, 30.0)]).remove(0);
        let hot: Vec<&str> = names
            .iter()
            .zip(&row)
            .filter(|(n, v)| {
                (n.starts_with("type_") || n.starts_with("result_") || n.starts_with("bodypart_"))
                    && **v == 1.0
            })
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(hot, vec!["type_shot-0", "result_fail-0", "bodypart_head-0"]);
    }

    #[test]
    fn missing_slots_are_zero_and_flagged() {
        let schema = FeatureSchema::new(&PipelineConfig::default());
        let table = FeatureTable {
            columns: schema.columns().to_vec(),
            rows: schema.extract_match(&[shot(90.0, 30.0)]),
        };
        assert_eq!(table.get(0, "missing-1"), Some(1.0));
        assert_eq!(table.get(0, "missing-2"), Some(1.0));
        assert_eq!(table.get(0, "same_team-1"), Some(0.0));
        assert_eq!(table.get(0, "start_dist_to_goal-2"), Some(0.0));
        assert_eq!(table.get(0, "seq_dt"), Some(0.0));
        assert!(table.rows[0].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn column_lookup_tolerates_short_rows() {
        let table = FeatureTable {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec![1.0, 2.0], vec![3.0]],
        };
        assert_eq!(table.column("a"), Some(vec![1.0, 3.0]));
        assert_eq!(table.column("b"), None);
        assert_eq!(table.get(1, "b"), None);
        assert_eq!(table.column("c"), None);
    }
}
