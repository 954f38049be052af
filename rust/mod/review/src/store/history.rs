use opencourse_core::ServiceError;
use opencourse_sql::{Executor, Row, Value};

use crate::model::HistoryEntry;
use crate::registry::{ActionKind, TargetKind};
use crate::store::{col_i64, col_str, storage_err};

const COLUMNS: &str = "id, user_id, action, target_kind, target_id, timestamp";
const ORDER: &str = "ORDER BY timestamp DESC, id DESC";

/// Append-only table of audit entries. Nothing here updates or deletes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryStore;

impl HistoryStore {
    pub fn insert(
        &self,
        db: &dyn Executor,
        user_id: i64,
        action: ActionKind,
        target_id: i64,
        timestamp: &str,
    ) -> Result<HistoryEntry, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "INSERT INTO history (user_id, action, target_kind, target_id, timestamp) \
                     VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {COLUMNS}"
                ),
                &[
                    Value::Integer(user_id),
                    Value::Text(action.as_str().to_string()),
                    Value::Text(action.target_kind().as_str().to_string()),
                    Value::Integer(target_id),
                    Value::Text(timestamp.to_string()),
                ],
            )
            .map_err(storage_err)?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::Storage("insert returned no row".into()))?;
        row_to_entry(row)
    }

    pub fn list_by_user(&self, db: &dyn Executor, user_id: i64) -> Result<Vec<HistoryEntry>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {COLUMNS} FROM history WHERE user_id = ?1 {ORDER}"),
                &[Value::Integer(user_id)],
            )
            .map_err(storage_err)?;
        rows.iter().map(row_to_entry).collect()
    }

    pub fn list_by_user_page(
        &self,
        db: &dyn Executor,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {COLUMNS} FROM history WHERE user_id = ?1 {ORDER} LIMIT ?2 OFFSET ?3"),
                &[
                    Value::Integer(user_id),
                    Value::Integer(limit as i64),
                    Value::Integer(offset as i64),
                ],
            )
            .map_err(storage_err)?;
        rows.iter().map(row_to_entry).collect()
    }

    pub fn count_by_user(&self, db: &dyn Executor, user_id: i64) -> Result<usize, ServiceError> {
        let rows = db
            .query(
                "SELECT COUNT(*) AS n FROM history WHERE user_id = ?1",
                &[Value::Integer(user_id)],
            )
            .map_err(storage_err)?;
        match rows.first() {
            Some(row) => Ok(col_i64(row, "n")? as usize),
            None => Ok(0),
        }
    }

    pub fn list_by_user_and_target(
        &self,
        db: &dyn Executor,
        user_id: i64,
        kind: TargetKind,
        target_id: i64,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM history \
                     WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3 {ORDER}"
                ),
                &[
                    Value::Integer(user_id),
                    Value::Text(kind.as_str().to_string()),
                    Value::Integer(target_id),
                ],
            )
            .map_err(storage_err)?;
        rows.iter().map(row_to_entry).collect()
    }

    pub fn exists(
        &self,
        db: &dyn Executor,
        user_id: i64,
        action: ActionKind,
        target_id: i64,
    ) -> Result<bool, ServiceError> {
        let rows = db
            .query(
                "SELECT 1 AS hit FROM history \
                 WHERE user_id = ?1 AND action = ?2 AND target_id = ?3 LIMIT 1",
                &[
                    Value::Integer(user_id),
                    Value::Text(action.as_str().to_string()),
                    Value::Integer(target_id),
                ],
            )
            .map_err(storage_err)?;
        Ok(!rows.is_empty())
    }
}

fn row_to_entry(row: &Row) -> Result<HistoryEntry, ServiceError> {
    let action = col_str(row, "action")?;
    let target_kind = col_str(row, "target_kind")?;

    Ok(HistoryEntry {
        id: col_i64(row, "id")?,
        user_id: col_i64(row, "user_id")?,
        action: ActionKind::from_name(&action)
            .ok_or_else(|| ServiceError::Storage(format!("unknown action kind: {action}")))?,
        target_kind: TargetKind::from_str(&target_kind)
            .ok_or_else(|| ServiceError::Storage(format!("unknown target kind: {target_kind}")))?,
        target_id: col_i64(row, "target_id")?,
        timestamp: col_str(row, "timestamp")?,
    })
}
