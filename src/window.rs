use serde::{Deserialize, Serialize};

use crate::actions::Action;

/// Anchor action at slot 0 followed by up to `K - 1` predecessors.
/// Slots before the start of the match are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    anchor: Action,
    previous: Vec<Option<Action>>,
}

impl GameState {
    /// `previous[0]` is slot 1, the action right before the anchor.
    pub fn new(anchor: Action, previous: Vec<Option<Action>>) -> Self {
        Self { anchor, previous }
    }

    pub fn anchor(&self) -> &Action {
        &self.anchor
    }

    pub fn slot(&self, offset: usize) -> Option<&Action> {
        match offset {
            0 => Some(&self.anchor),
            _ => self.previous.get(offset - 1).and_then(Option::as_ref),
        }
    }

    /// The slot furthest back in time (`K - 1`), if it exists in the match.
    pub fn oldest(&self) -> Option<&Action> {
        self.slot(self.previous.len())
    }

    pub fn slots(&self) -> impl Iterator<Item = Option<&Action>> {
        std::iter::once(Some(&self.anchor)).chain(self.previous.iter().map(Option::as_ref))
    }

    /// Slots `1..K`, mutable, for re-framing coordinates.
    pub fn previous_mut(&mut self) -> &mut [Option<Action>] {
        &mut self.previous
    }

    /// Number of slots, `K`.
    pub fn len(&self) -> usize {
        self.previous.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// One game state per action of a single match.
pub fn game_states(actions: &[Action], window_size: usize) -> Vec<GameState> {
    let k = window_size.max(1);
    actions
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            let previous = (1..k)
                .map(|offset| i.checked_sub(offset).map(|j| actions[j]))
                .collect();
            GameState::new(*anchor, previous)
        })
        .collect()
}

/// Flat attribute row of a game state: every action attribute of every slot,
/// named `<attribute>-<offset>`. Missing slots hold `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRow {
    pub columns: Vec<String>,
    pub values: Vec<Option<f64>>,
}

const SLOT_ATTRIBUTES: [&str; 12] = [
    "game_id",
    "team_id",
    "player_id",
    "period_id",
    "time_seconds",
    "type_id",
    "bodypart_id",
    "result_id",
    "start_x",
    "start_y",
    "end_x",
    "end_y",
];

pub fn window_columns(window_size: usize) -> Vec<String> {
    (0..window_size.max(1))
        .flat_map(|offset| {
            SLOT_ATTRIBUTES
                .iter()
                .map(move |attr| format!("{attr}-{offset}"))
        })
        .collect()
}

pub fn window_row(state: &GameState) -> WindowRow {
    let values = state
        .slots()
        .flat_map(|slot| match slot {
            Some(a) => attribute_values(a).map(Some),
            None => [None; SLOT_ATTRIBUTES.len()],
        })
        .collect();
    WindowRow {
        columns: window_columns(state.len()),
        values,
    }
}

fn attribute_values(a: &Action) -> [f64; SLOT_ATTRIBUTES.len()] {
    [
        a.game_id as f64,
        a.team_id as f64,
        a.player_id as f64,
        f64::from(a.period_id),
        a.time_seconds,
        f64::from(a.action_type.id()),
        f64::from(a.bodypart.id()),
        f64::from(a.result.id()),
        a.start_x,
        a.start_y,
        a.end_x,
        a.end_y,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionResult, ActionType, BodyPart};

    fn pass(player_id: u64, t: f64) -> Action {
        Action {
            game_id: 1,
            team_id: 1,
            player_id,
            period_id: 1,
            time_seconds: t,
            action_type: ActionType::Pass,
            bodypart: BodyPart::Foot,
            result: ActionResult::Success,
            start_x: 10.0,
            start_y: 10.0,
            end_x: 20.0,
            end_y: 20.0,
        }
    }

    #[test]
    fn slots_point_backwards() {
        let actions: Vec<Action> = (0..4).map(|i| pass(i, i as f64)).collect();
        let states = game_states(&actions, 3);
        assert_eq!(states.len(), 4);
        assert_eq!(states[3].anchor().player_id, 3);
        assert_eq!(states[3].slot(1).map(|a| a.player_id), Some(2));
        assert_eq!(states[3].oldest().map(|a| a.player_id), Some(1));
        assert!(states[1].slot(2).is_none());
        assert_eq!(states[1].slot(1).map(|a| a.player_id), Some(0));
    }

    #[test]
    fn window_of_one_is_just_the_anchor() {
        let actions = vec![pass(5, 0.0)];
        let states = game_states(&actions, 1);
        assert_eq!(states[0].len(), 1);
        assert_eq!(states[0].oldest().map(|a| a.player_id), Some(5));
    }

    #[test]
    fn window_row_marks_missing_slots() {
        let actions = vec![pass(1, 0.0), pass(2, 1.0)];
        let states = game_states(&actions, 3);
        let row = window_row(&states[0]);
        assert_eq!(row.columns.len(), 36);
        assert_eq!(row.values.len(), 36);
        assert_eq!(row.columns[2], "player_id-0");
        assert_eq!(row.values[2], Some(1.0));
        assert!(row.values[12..].iter().all(Option::is_none));
    }
}
