use opencourse_core::ServiceError;
use opencourse_sql::Executor;

use crate::store::storage_err;

/// Initialize the SQLite schema for the review core and its collaborators.
pub fn init_schema(sql: &dyn Executor) -> Result<(), ServiceError> {
    let statements = [
        // Users: identity + activity score
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'USER',
            activity INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",

        "CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )",

        "CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            department_id INTEGER,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_courses_department ON courses(department_id)",

        "CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_resources_course ON resources(course_id)",

        // Interactions: one review per (course, user)
        "CREATE TABLE IF NOT EXISTS interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            content TEXT,
            rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 10),
            likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (course_id, user_id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_interactions_user ON interactions(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_interactions_ranking
            ON interactions(course_id, likes DESC, created_at DESC)",

        // Like toggle records: the primary key is the idempotency guard
        "CREATE TABLE IF NOT EXISTS like_records (
            user_id INTEGER NOT NULL,
            interaction_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, interaction_id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_like_records_interaction ON like_records(interaction_id)",

        // History: append-only, no foreign keys into target tables
        "CREATE TABLE IF NOT EXISTS history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            target_kind TEXT NOT NULL,
            target_id INTEGER NOT NULL,
            timestamp TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_history_user ON history(user_id, timestamp DESC)",
        "CREATE INDEX IF NOT EXISTS idx_history_target ON history(target_kind, target_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[]).map_err(storage_err)?;
    }

    Ok(())
}
