use serde::{Deserialize, Serialize};

use crate::actions::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Label {
    pub scores: bool,
    pub concedes: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTable {
    pub scores: Vec<bool>,
    pub concedes: Vec<bool>,
}

impl LabelTable {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn push(&mut self, label: Label) {
        self.scores.push(label.scores);
        self.concedes.push(label.concedes);
    }

    pub fn get(&self, row: usize) -> Option<Label> {
        Some(Label {
            scores: *self.scores.get(row)?,
            concedes: *self.concedes.get(row)?,
        })
    }

    pub fn positive_rates(&self) -> (f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.len() as f64;
        let s = self.scores.iter().filter(|v| **v).count() as f64;
        let c = self.concedes.iter().filter(|v| **v).count() as f64;
        (s / n, c / n)
    }
}

impl FromIterator<Label> for LabelTable {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut out = LabelTable::default();
        for label in iter {
            out.push(label);
        }
        out
    }
}

/// Labels for one match. The horizon of action `i` is `i..i + horizon`,
/// cut at the last action of the match.
pub fn labels_for_match(actions: &[Action], horizon: usize) -> Vec<Label> {
    let horizon = horizon.max(1);
    let n = actions.len();
    (0..n)
        .map(|i| {
            let team = actions[i].team_id;
            let end = (i + horizon).min(n);
            let mut label = Label::default();
            for later in &actions[i..end] {
                let own_side = later.team_id == team;
                if later.is_goal() {
                    if own_side {
                        label.scores = true;
                    } else {
                        label.concedes = true;
                    }
                } else if later.is_owngoal() {
                    if own_side {
                        label.concedes = true;
                    } else {
                        label.scores = true;
                    }
                }
                if label.scores && label.concedes {
                    break;
                }
            }
            label
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionResult, ActionType, BodyPart};

    fn act(team_id: u64, action_type: ActionType, result: ActionResult) -> Action {
        Action {
            game_id: 1,
            team_id,
            player_id: team_id * 10,
            period_id: 1,
            time_seconds: 0.0,
            action_type,
            bodypart: BodyPart::Foot,
            result,
            start_x: 50.0,
            start_y: 34.0,
            end_x: 60.0,
            end_y: 34.0,
        }
    }

    #[test]
    fn goal_outside_horizon_is_ignored() {
        let actions = vec![
            act(1, ActionType::Pass, ActionResult::Success),
            act(1, ActionType::Pass, ActionResult::Success),
            act(1, ActionType::Shot, ActionResult::Success),
        ];
        let labels = labels_for_match(&actions, 2);
        assert!(!labels[0].scores);
        assert!(labels[1].scores);
        assert!(labels[2].scores);
    }

    #[test]
    fn non_shot_owngoal_result_does_not_count() {
        let actions = vec![act(1, ActionType::Clearance, ActionResult::Owngoal)];
        assert_eq!(labels_for_match(&actions, 10)[0], Label::default());
    }

    #[test]
    fn penalty_and_freekick_goals_count() {
        let actions = vec![
            act(2, ActionType::Foul, ActionResult::Success),
            act(1, ActionType::ShotPenalty, ActionResult::Success),
            act(2, ActionType::ShotFreekick, ActionResult::Success),
        ];
        let labels = labels_for_match(&actions, 3);
        assert!(labels[0].scores && labels[0].concedes);
        assert!(labels[1].scores && labels[1].concedes);
        assert!(labels[2].scores && !labels[2].concedes);
    }

    #[test]
    fn table_collects_and_reports_rates() {
        let table: LabelTable = [
            Label { scores: true, concedes: false },
            Label::default(),
            Label { scores: false, concedes: true },
            Label::default(),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 4);
        assert_eq!(table.positive_rates(), (0.25, 0.25));
        assert_eq!(table.get(2), Some(Label { scores: false, concedes: true }));
    }
}
