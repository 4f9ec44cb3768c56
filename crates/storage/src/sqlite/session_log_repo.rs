use math_core::model::UserId;

use super::{SqliteRepository, mapping::map_session_row};
use crate::repository::{SessionLogRecord, SessionLogRepository, StorageError};

#[async_trait::async_trait]
impl SessionLogRepository for SqliteRepository {
    async fn record_session(&self, record: SessionLogRecord) -> Result<i64, StorageError> {
        let user_id = i64::try_from(record.user_id.value())
            .map_err(|_| StorageError::Serialization("user_id overflow".into()))?;

        let result = sqlx::query(
            "INSERT INTO session_logs
                 (user_id, module, skill, correct, total, duration_secs,
                  tokens_earned, passed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(user_id)
        .bind(record.module.as_str())
        .bind(&record.skill)
        .bind(i64::from(record.correct))
        .bind(i64::from(record.total))
        .bind(i64::from(record.duration_secs))
        .bind(i64::from(record.tokens_earned))
        .bind(i64::from(record.passed))
        .bind(record.completed_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn sessions_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<SessionLogRecord>, StorageError> {
        let user_id = i64::try_from(user.value())
            .map_err(|_| StorageError::Serialization("user_id overflow".into()))?;

        let rows = sqlx::query(
            "SELECT id, user_id, module, skill, correct, total, duration_secs,
                    tokens_earned, passed, completed_at
             FROM session_logs
             WHERE user_id = ?1
             ORDER BY completed_at, id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_session_row).collect()
    }
}
