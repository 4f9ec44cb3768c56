use std::collections::{HashMap, HashSet};

use chrono::Utc;

use math_core::model::{Operator, OperatorProgress, UserId, UserProgress};

use super::{SqliteRepository, mapping};
use crate::repository::{ProgressRepository, StorageError};

fn user_id_i64(user: UserId) -> Result<i64, StorageError> {
    i64::try_from(user.value())
        .map_err(|_| StorageError::Serialization("user_id overflow".into()))
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, user: UserId) -> Result<UserProgress, StorageError> {
        let id = user_id_i64(user)?;

        let user_row = sqlx::query("SELECT id, grade, tokens FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;
        let (user_id, grade, tokens) = mapping::map_user_row(&user_row)?;

        let step_rows = sqlx::query(
            "SELECT operator, step FROM completed_steps WHERE user_id = ?1 ORDER BY operator, step",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut steps_by_operator: HashMap<Operator, HashSet<String>> = HashMap::new();
        for row in &step_rows {
            let (operator, step) = mapping::map_step_row(row)?;
            steps_by_operator.entry(operator).or_default().insert(step);
        }

        let operator_rows = sqlx::query(
            "SELECT operator, level, attempt_good, attempt_bad
             FROM operator_progress WHERE user_id = ?1",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut operators = Vec::with_capacity(operator_rows.len());
        for row in &operator_rows {
            let (operator, level, attempt_good, attempt_bad) = mapping::map_operator_row(row)?;
            let completed = steps_by_operator.remove(&operator).unwrap_or_default();
            let progress =
                OperatorProgress::from_persisted(level, attempt_good, attempt_bad, completed)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
            operators.push((operator, progress));
        }

        // Completed steps without a progress row should not happen, but a
        // learner must never lose credit for them if they do.
        for (operator, completed) in steps_by_operator {
            let progress = OperatorProgress::from_persisted(1, 0, 0, completed)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            operators.push((operator, progress));
        }

        UserProgress::from_persisted(user_id, grade, tokens, operators)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn upsert_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let id = user_id_i64(progress.user_id())?;
        let now = Utc::now();

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            "INSERT INTO users (id, grade, tokens) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 grade = excluded.grade,
                 tokens = excluded.tokens",
        )
        .bind(id)
        .bind(progress.grade().as_str())
        .bind(i64::from(progress.tokens()))
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Replace-all: the domain object is the source of truth for its rows.
        sqlx::query("DELETE FROM operator_progress WHERE user_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        sqlx::query("DELETE FROM completed_steps WHERE user_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (operator, op_progress) in progress.operators() {
            sqlx::query(
                "INSERT INTO operator_progress
                     (user_id, operator, level, attempt_good, attempt_bad)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(id)
            .bind(operator.as_str())
            .bind(i64::from(op_progress.level()))
            .bind(i64::from(op_progress.attempt_good()))
            .bind(i64::from(op_progress.attempt_bad()))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

            for step in op_progress.completed_types() {
                sqlx::query(
                    "INSERT INTO completed_steps (user_id, operator, step, completed_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(id)
                .bind(operator.as_str())
                .bind(step)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn add_tokens(&self, user: UserId, delta: u32) -> Result<u32, StorageError> {
        let id = user_id_i64(user)?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let updated = sqlx::query("UPDATE users SET tokens = tokens + ?2 WHERE id = ?1")
            .bind(id)
            .bind(i64::from(delta))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let row = sqlx::query("SELECT id, grade, tokens FROM users WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let (_, _, tokens) = mapping::map_user_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(tokens)
    }
}
