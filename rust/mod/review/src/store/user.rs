use opencourse_core::{now_rfc3339, ServiceError};
use opencourse_sql::{Executor, Row, Value};

use crate::model::{NewUser, User, UserRole};
use crate::store::{col_i64, col_str, storage_err, write_err};

const COLUMNS: &str = "id, name, email, role, activity, created_at, updated_at";

/// User persistence as seen by the review core.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserStore;

impl UserStore {
    /// Insert a new user. Activity starts at 1.
    pub fn create(&self, db: &dyn Executor, input: &NewUser) -> Result<User, ServiceError> {
        let now = now_rfc3339();
        let rows = db
            .query(
                &format!(
                    "INSERT INTO users (name, email, role, activity, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, 1, ?4, ?4) RETURNING {COLUMNS}"
                ),
                &[
                    Value::Text(input.name.clone()),
                    Value::Text(input.email.clone()),
                    Value::Text(input.role.as_str().to_string()),
                    Value::Text(now),
                ],
            )
            .map_err(write_err("user email already registered"))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::Storage("insert returned no row".into()))?;
        row_to_user(row)
    }

    /// Get a user by id.
    pub fn get(&self, db: &dyn Executor, id: i64) -> Result<Option<User>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
                &[Value::Integer(id)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_user).transpose()
    }

    /// `activity += delta` as one read-modify-write statement.
    pub fn add_activity(&self, db: &dyn Executor, id: i64, delta: i64) -> Result<(), ServiceError> {
        let affected = db
            .exec(
                "UPDATE users SET activity = activity + ?1, updated_at = ?2 WHERE id = ?3",
                &[Value::Integer(delta), Value::Text(now_rfc3339()), Value::Integer(id)],
            )
            .map_err(storage_err)?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("user {id}")));
        }
        Ok(())
    }
}

fn row_to_user(row: &Row) -> Result<User, ServiceError> {
    let role = col_str(row, "role")?;
    Ok(User {
        id: col_i64(row, "id")?,
        name: col_str(row, "name")?,
        email: col_str(row, "email")?,
        role: UserRole::from_str(&role)
            .ok_or_else(|| ServiceError::Storage(format!("bad user role: {role}")))?,
        activity: col_i64(row, "activity")?,
        created_at: col_str(row, "created_at")?,
        updated_at: col_str(row, "updated_at")?,
    })
}
