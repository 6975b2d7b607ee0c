use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Minutes added to in-period seconds for periods 1..=5.
pub const PERIOD_OFFSET_MINUTES: [f64; 5] = [0.0, 45.0, 60.0, 75.0, 90.0];
pub const MAX_PERIOD: u8 = 5;

/// Enum codes arrive either as snake_case names or as numeric ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Id(u64),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "Code")]
pub enum ActionType {
    Pass,
    Cross,
    ThrowIn,
    FreekickCrossed,
    FreekickShort,
    CornerCrossed,
    CornerShort,
    TakeOn,
    Foul,
    Tackle,
    Interception,
    Shot,
    ShotPenalty,
    ShotFreekick,
    KeeperSave,
    KeeperClaim,
    KeeperPunch,
    KeeperPickUp,
    Clearance,
    BadTouch,
    NonAction,
    Dribble,
    Goalkick,
}

impl ActionType {
    pub const ALL: [ActionType; 23] = [
        ActionType::Pass,
        ActionType::Cross,
        ActionType::ThrowIn,
        ActionType::FreekickCrossed,
        ActionType::FreekickShort,
        ActionType::CornerCrossed,
        ActionType::CornerShort,
        ActionType::TakeOn,
        ActionType::Foul,
        ActionType::Tackle,
        ActionType::Interception,
        ActionType::Shot,
        ActionType::ShotPenalty,
        ActionType::ShotFreekick,
        ActionType::KeeperSave,
        ActionType::KeeperClaim,
        ActionType::KeeperPunch,
        ActionType::KeeperPickUp,
        ActionType::Clearance,
        ActionType::BadTouch,
        ActionType::NonAction,
        ActionType::Dribble,
        ActionType::Goalkick,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionType::Pass => "pass",
            ActionType::Cross => "cross",
            ActionType::ThrowIn => "throw_in",
            ActionType::FreekickCrossed => "freekick_crossed",
            ActionType::FreekickShort => "freekick_short",
            ActionType::CornerCrossed => "corner_crossed",
            ActionType::CornerShort => "corner_short",
            ActionType::TakeOn => "take_on",
            ActionType::Foul => "foul",
            ActionType::Tackle => "tackle",
            ActionType::Interception => "interception",
            ActionType::Shot => "shot",
            ActionType::ShotPenalty => "shot_penalty",
            ActionType::ShotFreekick => "shot_freekick",
            ActionType::KeeperSave => "keeper_save",
            ActionType::KeeperClaim => "keeper_claim",
            ActionType::KeeperPunch => "keeper_punch",
            ActionType::KeeperPickUp => "keeper_pick_up",
            ActionType::Clearance => "clearance",
            ActionType::BadTouch => "bad_touch",
            ActionType::NonAction => "non_action",
            ActionType::Dribble => "dribble",
            ActionType::Goalkick => "goalkick",
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL.iter().copied().find(|t| t.name() == needle)
    }

    pub fn is_shot(self) -> bool {
        matches!(
            self,
            ActionType::Shot | ActionType::ShotPenalty | ActionType::ShotFreekick
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "Code")]
pub enum ActionResult {
    Fail,
    Success,
    Offside,
    Owngoal,
    YellowCard,
    RedCard,
}

impl ActionResult {
    pub const ALL: [ActionResult; 6] = [
        ActionResult::Fail,
        ActionResult::Success,
        ActionResult::Offside,
        ActionResult::Owngoal,
        ActionResult::YellowCard,
        ActionResult::RedCard,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionResult::Fail => "fail",
            ActionResult::Success => "success",
            ActionResult::Offside => "offside",
            ActionResult::Owngoal => "owngoal",
            ActionResult::YellowCard => "yellow_card",
            ActionResult::RedCard => "red_card",
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let needle = if needle == "own_goal" { "owngoal".to_string() } else { needle };
        Self::ALL.iter().copied().find(|r| r.name() == needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "Code")]
pub enum BodyPart {
    Foot,
    Head,
    Other,
}

impl BodyPart {
    pub const ALL: [BodyPart; 3] = [BodyPart::Foot, BodyPart::Head, BodyPart::Other];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Foot => "foot",
            BodyPart::Head => "head",
            BodyPart::Other => "other",
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|b| b.name() == needle)
    }
}

impl TryFrom<Code> for ActionType {
    type Error = PipelineError;

    fn try_from(code: Code) -> Result<Self, Self::Error> {
        match code {
            Code::Id(id) => Self::from_id(id)
                .ok_or_else(|| PipelineError::UnknownActionType(id.to_string())),
            Code::Name(name) => Self::from_name(&name)
                .ok_or_else(|| PipelineError::UnknownActionType(name)),
        }
    }
}

impl TryFrom<Code> for ActionResult {
    type Error = PipelineError;

    fn try_from(code: Code) -> Result<Self, Self::Error> {
        match code {
            Code::Id(id) => Self::from_id(id)
                .ok_or_else(|| PipelineError::UnknownResult(id.to_string())),
            Code::Name(name) => Self::from_name(&name)
                .ok_or_else(|| PipelineError::UnknownResult(name)),
        }
    }
}

impl TryFrom<Code> for BodyPart {
    type Error = PipelineError;

    fn try_from(code: Code) -> Result<Self, Self::Error> {
        match code {
            Code::Id(id) => Self::from_id(id)
                .ok_or_else(|| PipelineError::UnknownBodyPart(id.to_string())),
            Code::Name(name) => Self::from_name(&name)
                .ok_or_else(|| PipelineError::UnknownBodyPart(name)),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One on-ball action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActionRecord")]
pub struct Action {
    pub game_id: u64,
    pub team_id: u64,
    pub player_id: u64,
    pub period_id: u8,
    /// Seconds since the start of the period.
    pub time_seconds: f64,
    pub action_type: ActionType,
    pub bodypart: BodyPart,
    pub result: ActionResult,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

/// Wire shape of an action: enum columns may carry an id, a name, or both.
#[derive(Debug, Deserialize)]
struct ActionRecord {
    game_id: u64,
    team_id: u64,
    player_id: u64,
    period_id: u8,
    time_seconds: f64,
    action_type: Option<Code>,
    type_id: Option<Code>,
    type_name: Option<Code>,
    bodypart: Option<Code>,
    bodypart_id: Option<Code>,
    bodypart_name: Option<Code>,
    result: Option<Code>,
    result_id: Option<Code>,
    result_name: Option<Code>,
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
}

impl TryFrom<ActionRecord> for Action {
    type Error = PipelineError;

    fn try_from(raw: ActionRecord) -> Result<Self, Self::Error> {
        Ok(Action {
            game_id: raw.game_id,
            team_id: raw.team_id,
            player_id: raw.player_id,
            period_id: raw.period_id,
            time_seconds: raw.time_seconds,
            action_type: pick_code([raw.type_id, raw.action_type, raw.type_name], "type")?,
            bodypart: pick_code(
                [raw.bodypart_id, raw.bodypart, raw.bodypart_name],
                "bodypart",
            )?,
            result: pick_code([raw.result_id, raw.result, raw.result_name], "result")?,
            start_x: raw.start_x,
            start_y: raw.start_y,
            end_x: raw.end_x,
            end_y: raw.end_y,
        })
    }
}

/// The id wins over the names, matching the parquet reader.
fn pick_code<T>(candidates: [Option<Code>; 3], column: &str) -> Result<T, PipelineError>
where
    T: TryFrom<Code, Error = PipelineError>,
{
    let code = candidates
        .into_iter()
        .flatten()
        .next()
        .ok_or_else(|| PipelineError::MissingColumn {
            column: format!("{column}_id|{column}_name"),
        })?;
    T::try_from(code)
}

impl Action {
    pub fn is_goal(&self) -> bool {
        self.action_type.is_shot() && self.result == ActionResult::Success
    }

    pub fn is_owngoal(&self) -> bool {
        self.action_type.is_shot() && self.result == ActionResult::Owngoal
    }

    /// Own goal from any action type, e.g. a deflected clearance.
    pub fn is_any_owngoal(&self) -> bool {
        self.result == ActionResult::Owngoal
    }

    /// Seconds since kick-off, with fixed offsets per period.
    pub fn time_seconds_overall(&self) -> f64 {
        period_offset_seconds(self.period_id) + self.time_seconds
    }
}

/// Offset of a period's start in seconds; unknown periods contribute nothing.
pub fn period_offset_seconds(period_id: u8) -> f64 {
    match period_id {
        1..=MAX_PERIOD => PERIOD_OFFSET_MINUTES[usize::from(period_id - 1)] * 60.0,
        _ => 0.0,
    }
}
