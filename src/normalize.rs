use crate::actions::Action;
use crate::config::Pitch;
use crate::window::GameState;

/// Re-frames a game state so every slot reads as if the anchor's team attacks
/// towards `x = LENGTH`. Slots of the other team are mirrored; the anchor and
/// missing slots are left alone.
pub fn normalize_state(state: &GameState, pitch: &Pitch) -> GameState {
    let mut out = state.clone();
    let anchor_team = state.anchor().team_id;
    for action in out.previous_mut().iter_mut().flatten() {
        if action.team_id != anchor_team {
            mirror(action, pitch);
        }
    }
    out
}

pub fn normalize_states(states: &[GameState], pitch: &Pitch) -> Vec<GameState> {
    states.iter().map(|s| normalize_state(s, pitch)).collect()
}

pub fn mirror(action: &mut Action, pitch: &Pitch) {
    action.start_x = pitch.mirror_x(action.start_x);
    action.start_y = pitch.mirror_y(action.start_y);
    action.end_x = pitch.mirror_x(action.end_x);
    action.end_y = pitch.mirror_y(action.end_y);
}

/// Canonicalises a match whose teams attack in opposite directions: actions of
/// the away team (any team other than `home_team_id`) are mirrored so both
/// teams play left to right.
pub fn play_left_to_right(actions: &[Action], home_team_id: u64, pitch: &Pitch) -> Vec<Action> {
    actions
        .iter()
        .map(|a| {
            let mut out = *a;
            if out.team_id != home_team_id {
                mirror(&mut out, pitch);
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionResult, ActionType, BodyPart};
    use crate::window::game_states;

    fn at(team_id: u64, x: f64, y: f64) -> Action {
        Action {
            game_id: 1,
            team_id,
            player_id: 1,
            period_id: 1,
            time_seconds: 0.0,
            action_type: ActionType::Pass,
            bodypart: BodyPart::Foot,
            result: ActionResult::Success,
            start_x: x,
            start_y: y,
            end_x: x + 1.0,
            end_y: y + 2.0,
        }
    }

    #[test]
    fn home_actions_stay_away_actions_flip() {
        let pitch = Pitch::default();
        let out = play_left_to_right(&[at(1, 10.0, 20.0), at(2, 10.0, 20.0)], 1, &pitch);
        assert_eq!(out[0].start_x, 10.0);
        assert_eq!(out[1].start_x, 95.0);
        assert_eq!(out[1].start_y, 48.0);
        assert_eq!(out[1].end_x, 94.0);
        assert_eq!(out[1].end_y, 46.0);
    }

    #[test]
    fn anchor_is_never_flipped() {
        let pitch = Pitch::default();
        let actions = [at(2, 30.0, 5.0), at(1, 40.0, 6.0)];
        let states = game_states(&actions, 2);
        let norm = normalize_state(&states[1], &pitch);
        assert_eq!(norm.anchor(), &actions[1]);
        let prev = norm.slot(1).unwrap();
        assert_eq!(prev.start_x, 75.0);
        assert_eq!(prev.start_y, 63.0);
    }
}
