use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use math_core::model::{Grade, Operator, SkillModule, UserId};

use crate::repository::{SessionLogRecord, StorageError};

pub(super) fn to_u32(value: i64, column: &str) -> Result<u32, StorageError> {
    u32::try_from(value)
        .map_err(|_| StorageError::Serialization(format!("{column} out of range: {value}")))
}

pub(super) fn to_u8(value: i64, column: &str) -> Result<u8, StorageError> {
    u8::try_from(value)
        .map_err(|_| StorageError::Serialization(format!("{column} out of range: {value}")))
}

pub(super) fn parse_operator(raw: &str) -> Result<Operator, StorageError> {
    raw.parse()
        .map_err(|_| StorageError::Serialization(format!("bad operator: {raw}")))
}

fn parse_grade(raw: &str) -> Result<Grade, StorageError> {
    raw.parse()
        .map_err(|_| StorageError::Serialization(format!("bad grade: {raw}")))
}

fn parse_module(raw: &str) -> Result<SkillModule, StorageError> {
    raw.parse()
        .map_err(|_| StorageError::Serialization(format!("bad module: {raw}")))
}

fn connection(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(super) fn map_user_row(row: &SqliteRow) -> Result<(UserId, Grade, u32), StorageError> {
    let id: i64 = row.try_get("id").map_err(connection)?;
    let grade: String = row.try_get("grade").map_err(connection)?;
    let tokens: i64 = row.try_get("tokens").map_err(connection)?;

    let user_id = u64::try_from(id)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization(format!("user id out of range: {id}")))?;

    Ok((user_id, parse_grade(&grade)?, to_u32(tokens, "tokens")?))
}

pub(super) fn map_operator_row(
    row: &SqliteRow,
) -> Result<(Operator, u8, u32, u32), StorageError> {
    let operator: String = row.try_get("operator").map_err(connection)?;
    let level: i64 = row.try_get("level").map_err(connection)?;
    let attempt_good: i64 = row.try_get("attempt_good").map_err(connection)?;
    let attempt_bad: i64 = row.try_get("attempt_bad").map_err(connection)?;

    Ok((
        parse_operator(&operator)?,
        to_u8(level, "level")?,
        to_u32(attempt_good, "attempt_good")?,
        to_u32(attempt_bad, "attempt_bad")?,
    ))
}

pub(super) fn map_step_row(row: &SqliteRow) -> Result<(Operator, String), StorageError> {
    let operator: String = row.try_get("operator").map_err(connection)?;
    let step: String = row.try_get("step").map_err(connection)?;
    Ok((parse_operator(&operator)?, step))
}

pub(super) fn map_session_row(row: &SqliteRow) -> Result<SessionLogRecord, StorageError> {
    let id: i64 = row.try_get("id").map_err(connection)?;
    let user_id: i64 = row.try_get("user_id").map_err(connection)?;
    let module: String = row.try_get("module").map_err(connection)?;
    let skill: String = row.try_get("skill").map_err(connection)?;
    let correct: i64 = row.try_get("correct").map_err(connection)?;
    let total: i64 = row.try_get("total").map_err(connection)?;
    let duration_secs: i64 = row.try_get("duration_secs").map_err(connection)?;
    let tokens_earned: i64 = row.try_get("tokens_earned").map_err(connection)?;
    let passed: i64 = row.try_get("passed").map_err(connection)?;
    let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(connection)?;

    let user_id = u64::try_from(user_id)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization(format!("user id out of range: {user_id}")))?;

    Ok(SessionLogRecord {
        id: Some(id),
        user_id,
        module: parse_module(&module)?,
        skill,
        correct: to_u32(correct, "correct")?,
        total: to_u32(total, "total")?,
        duration_secs: to_u32(duration_secs, "duration_secs")?,
        tokens_earned: to_u32(tokens_earned, "tokens_earned")?,
        passed: passed != 0,
        completed_at,
    })
}
