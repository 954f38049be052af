use opencourse_core::{now_rfc3339, ServiceError};
use opencourse_sql::{Executor, Row, Value};
use tracing::debug;

use crate::model::LikeRecord;
use crate::store::{col_i64, col_str, storage_err};

/// Per-(user, interaction) "has liked" records.
///
/// The (user_id, interaction_id) primary key makes a second like a no-op
/// even when two writers race past [`Self::status`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LikeToggleStore;

impl LikeToggleStore {
    pub fn status(&self, db: &dyn Executor, user_id: i64, target: i64) -> Result<bool, ServiceError> {
        Ok(self.find(db, user_id, target)?.is_some())
    }

    pub fn find(
        &self,
        db: &dyn Executor,
        user_id: i64,
        target: i64,
    ) -> Result<Option<LikeRecord>, ServiceError> {
        let rows = db
            .query(
                "SELECT user_id, interaction_id, created_at FROM like_records \
                 WHERE user_id = ?1 AND interaction_id = ?2",
                &[Value::Integer(user_id), Value::Integer(target)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_like).transpose()
    }

    /// Record a like. Returns the new record, or `None` if one was already
    /// there.
    pub fn like(
        &self,
        db: &dyn Executor,
        user_id: i64,
        target: i64,
    ) -> Result<Option<LikeRecord>, ServiceError> {
        if self.status(db, user_id, target)? {
            return Ok(None);
        }

        match db.query(
            "INSERT INTO like_records (user_id, interaction_id, created_at) VALUES (?1, ?2, ?3) \
             RETURNING user_id, interaction_id, created_at",
            &[Value::Integer(user_id), Value::Integer(target), Value::Text(now_rfc3339())],
        ) {
            Ok(rows) => match rows.first() {
                Some(row) => row_to_like(row).map(Some),
                None => Err(ServiceError::Storage("like insert returned no row".into())),
            },
            Err(e) if e.is_constraint() => {
                debug!("like by user {user_id} on interaction {target} already recorded");
                Ok(None)
            }
            Err(e) => Err(storage_err(e)),
        }
    }

    /// Remove a like. Returns false if there was none.
    pub fn unlike(&self, db: &dyn Executor, user_id: i64, target: i64) -> Result<bool, ServiceError> {
        let n = db
            .exec(
                "DELETE FROM like_records WHERE user_id = ?1 AND interaction_id = ?2",
                &[Value::Integer(user_id), Value::Integer(target)],
            )
            .map_err(storage_err)?;
        Ok(n > 0)
    }

    pub fn count(&self, db: &dyn Executor, target: i64) -> Result<i64, ServiceError> {
        let rows = db
            .query(
                "SELECT COUNT(*) AS n FROM like_records WHERE interaction_id = ?1",
                &[Value::Integer(target)],
            )
            .map_err(storage_err)?;
        match rows.first() {
            Some(row) => col_i64(row, "n"),
            None => Ok(0),
        }
    }

    /// Drop every like on a target. Returns how many were removed.
    pub fn remove_all(&self, db: &dyn Executor, target: i64) -> Result<u64, ServiceError> {
        db.exec(
            "DELETE FROM like_records WHERE interaction_id = ?1",
            &[Value::Integer(target)],
        )
        .map_err(storage_err)
    }
}

fn row_to_like(row: &Row) -> Result<LikeRecord, ServiceError> {
    Ok(LikeRecord {
        user_id: col_i64(row, "user_id")?,
        interaction_id: col_i64(row, "interaction_id")?,
        created_at: col_str(row, "created_at")?,
    })
}
