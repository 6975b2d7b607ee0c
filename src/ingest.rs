use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use tracing::info;

use crate::actions::{Action, ActionResult, ActionType, BodyPart};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::table::ActionTable;

const NUMERIC_COLUMNS: [&str; 9] = [
    "game_id",
    "team_id",
    "player_id",
    "period_id",
    "time_seconds",
    "start_x",
    "start_y",
    "end_x",
    "end_y",
];

/// Enum columns may come as ids or names; either spelling satisfies the schema.
const CODED_COLUMNS: [(&str, &str); 3] = [
    ("type_id", "type_name"),
    ("result_id", "result_name"),
    ("bodypart_id", "bodypart_name"),
];

/// Loads and validates an action table, picking the reader by file extension.
pub fn load_action_table(path: &Path, cfg: &PipelineConfig) -> Result<ActionTable> {
    let actions = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => read_parquet_actions(path)?,
        _ => read_json_actions(path)?,
    };
    info!(path = %path.display(), actions = actions.len(), "loaded actions");
    ActionTable::from_actions(actions, cfg)
}

pub fn read_json_actions(path: &Path) -> Result<Vec<Action>> {
    let raw = fs::read_to_string(path)?;
    parse_json_actions(&raw)
}

pub fn parse_json_actions(raw: &str) -> Result<Vec<Action>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str::<Vec<Action>>(trimmed)?)
}

pub fn read_parquet_actions(path: &Path) -> Result<Vec<Action>> {
    let file = fs::File::open(path)?;
    let reader = SerializedFileReader::new(file)?;

    let columns: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    check_columns(&columns)?;

    let iter = reader.get_row_iter(None)?;
    let mut out = Vec::new();
    for (row_idx, row) in iter.enumerate() {
        let row = row?;
        let fields: HashMap<&str, &Field> = row
            .get_column_iter()
            .map(|(name, field)| (name.as_str(), field))
            .collect();
        out.push(action_from_fields(row_idx, &fields)?);
    }
    Ok(out)
}

pub fn check_columns(columns: &[String]) -> Result<()> {
    let has = |name: &str| columns.iter().any(|c| c == name);
    for column in NUMERIC_COLUMNS {
        if !has(column) {
            return Err(PipelineError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    for (id_col, name_col) in CODED_COLUMNS {
        if !has(id_col) && !has(name_col) {
            return Err(PipelineError::MissingColumn {
                column: format!("{id_col}|{name_col}"),
            });
        }
    }
    Ok(())
}

fn action_from_fields(row: usize, fields: &HashMap<&str, &Field>) -> Result<Action> {
    let period = read_u64(row, fields, "period_id")?;
    let period_id = u8::try_from(period).map_err(|_| PipelineError::InvalidValue {
        row,
        column: "period_id".into(),
        reason: format!("{period} does not fit a period"),
    })?;

    Ok(Action {
        game_id: read_u64(row, fields, "game_id")?,
        team_id: read_u64(row, fields, "team_id")?,
        player_id: read_u64(row, fields, "player_id")?,
        period_id,
        time_seconds: read_f64(row, fields, "time_seconds")?,
        action_type: read_code(
            row,
            fields,
            ("type_id", "type_name"),
            ActionType::from_id,
            ActionType::from_name,
        )
        .map_err(PipelineError::UnknownActionType)?,
        bodypart: read_code(
            row,
            fields,
            ("bodypart_id", "bodypart_name"),
            BodyPart::from_id,
            BodyPart::from_name,
        )
        .map_err(PipelineError::UnknownBodyPart)?,
        result: read_code(
            row,
            fields,
            ("result_id", "result_name"),
            ActionResult::from_id,
            ActionResult::from_name,
        )
        .map_err(PipelineError::UnknownResult)?,
        start_x: read_f64(row, fields, "start_x")?,
        start_y: read_f64(row, fields, "start_y")?,
        end_x: read_f64(row, fields, "end_x")?,
        end_y: read_f64(row, fields, "end_y")?,
    })
}

fn field<'a>(row: usize, fields: &HashMap<&str, &'a Field>, name: &str) -> Result<&'a Field> {
    fields
        .get(name)
        .copied()
        .ok_or_else(|| PipelineError::InvalidValue {
            row,
            column: name.to_string(),
            reason: "missing value".into(),
        })
}

fn read_u64(row: usize, fields: &HashMap<&str, &Field>, name: &str) -> Result<u64> {
    let value = field(row, fields, name)?;
    field_as_i64(value)
        .and_then(|v| u64::try_from(v).ok())
        .or_else(|| match value {
            Field::ULong(v) => Some(*v),
            Field::Str(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
        .ok_or_else(|| PipelineError::InvalidValue {
            row,
            column: name.to_string(),
            reason: format!("expected a non-negative integer, got {value}"),
        })
}

fn read_f64(row: usize, fields: &HashMap<&str, &Field>, name: &str) -> Result<f64> {
    let value = field(row, fields, name)?;
    let parsed = match value {
        Field::Double(v) => Some(*v),
        Field::Float(v) => Some(f64::from(*v)),
        other => field_as_i64(other).map(|v| v as f64),
    };
    parsed.ok_or_else(|| PipelineError::InvalidValue {
        row,
        column: name.to_string(),
        reason: format!("expected a number, got {value}"),
    })
}

/// Reads an enum column from its id or name spelling; the error carries the raw value.
fn read_code<T>(
    row: usize,
    fields: &HashMap<&str, &Field>,
    (id_col, name_col): (&str, &str),
    from_id: fn(u64) -> Option<T>,
    from_name: fn(&str) -> Option<T>,
) -> std::result::Result<T, String> {
    if let Some(value) = fields.get(id_col).copied()
        && !matches!(value, Field::Null)
    {
        return field_as_i64(value)
            .and_then(|v| u64::try_from(v).ok())
            .and_then(from_id)
            .ok_or_else(|| format!("row {row}: {value}"));
    }
    if let Some(Field::Str(name)) = fields.get(name_col).copied() {
        return from_name(name).ok_or_else(|| name.clone());
    }
    Err(format!("row {row}: no {id_col} or {name_col}"))
}

fn field_as_i64(value: &Field) -> Option<i64> {
    match value {
        Field::Byte(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Long(v) => Some(*v),
        Field::UByte(v) => Some(i64::from(*v)),
        Field::UShort(v) => Some(i64::from(*v)),
        Field::UInt(v) => Some(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v).ok(),
        _ => None,
    }
}
