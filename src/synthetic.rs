use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::actions::{Action, ActionResult, ActionType, BodyPart};
use crate::config::{Pitch, PipelineConfig};
use crate::error::Result;
use crate::table::{ActionTable, MatchActions};

const OPEN_PLAY: [ActionType; 6] = [
    ActionType::Pass,
    ActionType::Pass,
    ActionType::Pass,
    ActionType::Dribble,
    ActionType::Cross,
    ActionType::Tackle,
];

/// A valid, time-ordered match split over two periods. Possession changes at
/// random and shots occasionally go in, rarely into the shooter's own net.
pub fn synthetic_match<R: Rng>(
    game_id: u64,
    n_actions: usize,
    pitch: &Pitch,
    rng: &mut R,
) -> Vec<Action> {
    let teams = [game_id * 10 + 1, game_id * 10 + 2];
    let mut side = 0usize;
    let mut time = 0.0_f64;
    let mut x = pitch.length / 2.0;
    let mut y = pitch.width / 2.0;
    let half = n_actions / 2;

    let mut actions = Vec::with_capacity(n_actions);
    for i in 0..n_actions {
        let period_id = if i < half.max(1) { 1 } else { 2 };
        if i == half && i > 0 {
            time = 0.0;
        }
        time += rng.gen_range(0.5..8.0);

        if rng.gen_bool(0.2) {
            side = 1 - side;
            x = pitch.mirror_x(x);
            y = pitch.mirror_y(y);
        }

        let attacking = x > pitch.length * 0.7;
        let (action_type, result, end_x, end_y) = if attacking && rng.gen_bool(0.3) {
            let result = match rng.gen_range(0..100) {
                0..=11 => ActionResult::Success,
                12 => ActionResult::Owngoal,
                _ => ActionResult::Fail,
            };
            let (gx, gy) = pitch.goal();
            (ActionType::Shot, result, gx, gy + rng.gen_range(-3.0..3.0))
        } else {
            let action_type = OPEN_PLAY[rng.gen_range(0..OPEN_PLAY.len())];
            let result = if rng.gen_bool(0.8) {
                ActionResult::Success
            } else {
                ActionResult::Fail
            };
            let end_x = (x + rng.gen_range(-10.0..20.0)).clamp(0.0, pitch.length);
            let end_y = (y + rng.gen_range(-12.0..12.0)).clamp(0.0, pitch.width);
            (action_type, result, end_x, end_y)
        };

        let bodypart = if rng.gen_bool(0.1) {
            BodyPart::Head
        } else {
            BodyPart::Foot
        };
        let team_id = teams[side];
        actions.push(Action {
            game_id,
            team_id,
            player_id: team_id * 100 + rng.gen_range(1..=11),
            period_id,
            time_seconds: time,
            action_type,
            bodypart,
            result,
            start_x: x,
            start_y: y,
            end_x,
            end_y,
        });

        if action_type.is_shot() {
            // Restart from the centre spot, other team in possession.
            side = 1 - side;
            x = pitch.length / 2.0;
            y = pitch.width / 2.0;
        } else {
            x = end_x;
            y = end_y;
        }
    }
    actions
}

/// `n_matches` synthetic matches with game ids `1..=n_matches`.
pub fn synthetic_table(
    n_matches: usize,
    n_actions: usize,
    seed: u64,
    cfg: &PipelineConfig,
) -> Result<ActionTable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let matches = (1..=n_matches as u64)
        .map(|game_id| MatchActions {
            game_id,
            actions: synthetic_match(game_id, n_actions, &cfg.pitch, &mut rng),
        })
        .collect();
    ActionTable::from_matches(matches, cfg)
}
