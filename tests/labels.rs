use action_value::actions::{Action, ActionResult, ActionType, BodyPart};
use action_value::config::PipelineConfig;
use action_value::labels::{Label, labels_for_match};
use action_value::pipeline::compute_labels;
use action_value::table::{ActionTable, MatchActions};

fn action(game_id: u64, team_id: u64, action_type: ActionType, result: ActionResult) -> Action {
    Action {
        game_id,
        team_id,
        player_id: team_id * 10,
        period_id: 1,
        time_seconds: 0.0,
        action_type,
        bodypart: BodyPart::Foot,
        result,
        start_x: 60.0,
        start_y: 34.0,
        end_x: 70.0,
        end_y: 34.0,
    }
}

#[test]
fn own_goal_scores_for_the_other_side() {
    // Team A passes, team B passes, team A puts the ball in its own net.
    let actions = vec![
        action(1, 1, ActionType::Pass, ActionResult::Success),
        action(1, 2, ActionType::Pass, ActionResult::Success),
        action(1, 1, ActionType::Shot, ActionResult::Owngoal),
    ];
    let labels = labels_for_match(&actions, 3);
    assert_eq!(
        labels[0],
        Label {
            scores: false,
            concedes: true
        }
    );
    assert_eq!(
        labels[1],
        Label {
            scores: true,
            concedes: false
        }
    );
    assert_eq!(
        labels[2],
        Label {
            scores: false,
            concedes: true
        }
    );
}

#[test]
fn last_action_uses_a_horizon_of_one() {
    let mut actions = vec![action(1, 1, ActionType::Pass, ActionResult::Success); 4];
    actions.push(action(1, 2, ActionType::Shot, ActionResult::Success));
    for horizon in [1, 2, 10, 50] {
        let labels = labels_for_match(&actions, horizon);
        assert_eq!(labels.len(), 5);
        assert_eq!(
            labels[4],
            Label {
                scores: true,
                concedes: false
            }
        );
    }
    let labels = labels_for_match(&actions, 1);
    assert!(labels[..4].iter().all(|l| *l == Label::default()));
}

#[test]
fn goals_do_not_leak_into_the_previous_match() {
    let cfg = PipelineConfig::default();
    let first = (0..5)
        .map(|_| action(1, 1, ActionType::Pass, ActionResult::Success))
        .collect();
    let second = vec![
        action(2, 3, ActionType::Shot, ActionResult::Success),
        action(2, 4, ActionType::Pass, ActionResult::Success),
    ];
    let table = ActionTable::from_matches(
        vec![
            MatchActions {
                game_id: 1,
                actions: first,
            },
            MatchActions {
                game_id: 2,
                actions: second,
            },
        ],
        &cfg,
    )
    .unwrap();
    let labels = compute_labels(&table, &cfg).unwrap();
    assert_eq!(labels.len(), 7);
    assert!(labels.scores[..5].iter().all(|v| !v));
    assert!(labels.concedes[..5].iter().all(|v| !v));
    assert!(labels.scores[5]);
    assert!(!labels.scores[6] && !labels.concedes[6]);
}
