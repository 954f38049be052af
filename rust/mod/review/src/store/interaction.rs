use opencourse_core::ServiceError;
use opencourse_sql::{Executor, Row, Value};

use crate::model::Interaction;
use crate::store::{col_i64, col_opt_i64, col_opt_str, col_str, storage_err, write_err};

const COLUMNS: &str = "id, course_id, user_id, content, rating, likes, created_at, updated_at";

/// Persistence for reviews.
///
/// `likes` is never written from a caller-supplied value: [`Self::refresh_likes`]
/// recounts it from the like records.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionStore;

impl InteractionStore {
    pub fn find(&self, db: &dyn Executor, id: i64) -> Result<Option<Interaction>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {COLUMNS} FROM interactions WHERE id = ?1"),
                &[Value::Integer(id)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_interaction).transpose()
    }

    pub fn find_by_course_and_user(
        &self,
        db: &dyn Executor,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<Interaction>, ServiceError> {
        let rows = db
            .query(
                &format!("SELECT {COLUMNS} FROM interactions WHERE course_id = ?1 AND user_id = ?2"),
                &[Value::Integer(course_id), Value::Integer(user_id)],
            )
            .map_err(storage_err)?;
        rows.first().map(row_to_interaction).transpose()
    }

    /// Insert a new review with zero likes. A second review for the same
    /// (course, user) is a `Conflict`.
    pub fn insert(
        &self,
        db: &dyn Executor,
        course_id: i64,
        user_id: i64,
        content: Option<&str>,
        rating: Option<u8>,
        now: &str,
    ) -> Result<Interaction, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "INSERT INTO interactions (course_id, user_id, content, rating, likes, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5) RETURNING {COLUMNS}"
                ),
                &[
                    Value::Integer(course_id),
                    Value::Integer(user_id),
                    Value::from(content.map(str::to_string)),
                    Value::from(rating.map(i64::from)),
                    Value::Text(now.to_string()),
                ],
            )
            .map_err(write_err("user already reviewed this course"))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::Storage("insert returned no row".into()))?;
        row_to_interaction(row)
    }

    /// Persist the editable fields of an already-merged interaction.
    pub fn save(&self, db: &dyn Executor, interaction: &Interaction) -> Result<(), ServiceError> {
        let affected = db
            .exec(
                "UPDATE interactions SET content = ?1, rating = ?2, updated_at = ?3 WHERE id = ?4",
                &[
                    Value::from(interaction.content.clone()),
                    Value::from(interaction.rating.map(i64::from)),
                    Value::Text(interaction.updated_at.clone()),
                    Value::Integer(interaction.id),
                ],
            )
            .map_err(storage_err)?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("interaction {}", interaction.id)));
        }
        Ok(())
    }

    /// Rewrite the like counter from the like records and return the new value.
    pub fn refresh_likes(&self, db: &dyn Executor, id: i64) -> Result<i64, ServiceError> {
        let rows = db
            .query(
                "UPDATE interactions \
                 SET likes = (SELECT COUNT(*) FROM like_records WHERE interaction_id = ?1) \
                 WHERE id = ?1 RETURNING likes",
                &[Value::Integer(id)],
            )
            .map_err(storage_err)?;

        match rows.first() {
            Some(row) => col_i64(row, "likes"),
            None => Err(ServiceError::NotFound(format!("interaction {id}"))),
        }
    }

    pub fn delete(&self, db: &dyn Executor, id: i64) -> Result<bool, ServiceError> {
        let n = db
            .exec("DELETE FROM interactions WHERE id = ?1", &[Value::Integer(id)])
            .map_err(storage_err)?;
        Ok(n > 0)
    }

    /// Reviews of a course, most liked first, then newest.
    pub fn list_by_course(
        &self,
        db: &dyn Executor,
        course_id: i64,
    ) -> Result<Vec<Interaction>, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM interactions WHERE course_id = ?1 \
                     ORDER BY likes DESC, created_at DESC, id DESC"
                ),
                &[Value::Integer(course_id)],
            )
            .map_err(storage_err)?;
        rows.iter().map(row_to_interaction).collect()
    }

    /// Reviews written by a user, newest first.
    pub fn list_by_user(
        &self,
        db: &dyn Executor,
        user_id: i64,
    ) -> Result<Vec<Interaction>, ServiceError> {
        let rows = db
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM interactions WHERE user_id = ?1 \
                     ORDER BY created_at DESC, id DESC"
                ),
                &[Value::Integer(user_id)],
            )
            .map_err(storage_err)?;
        rows.iter().map(row_to_interaction).collect()
    }
}

fn row_to_interaction(row: &Row) -> Result<Interaction, ServiceError> {
    let rating = match col_opt_i64(row, "rating") {
        Some(r) => Some(
            u8::try_from(r).map_err(|_| ServiceError::Storage(format!("bad rating: {r}")))?,
        ),
        None => None,
    };

    Ok(Interaction {
        id: col_i64(row, "id")?,
        course_id: col_i64(row, "course_id")?,
        user_id: col_i64(row, "user_id")?,
        content: col_opt_str(row, "content"),
        rating,
        likes: col_i64(row, "likes")?,
        created_at: col_str(row, "created_at")?,
        updated_at: col_str(row, "updated_at")?,
    })
}
