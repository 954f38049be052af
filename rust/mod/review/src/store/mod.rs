//! Row-level repositories.
//!
//! Every method takes the executor to run on, so the same repository call
//! works on the plain store or inside a caller's open transaction.

pub mod catalog;
pub mod history;
pub mod interaction;
pub mod like;
pub mod schema;
pub mod user;

pub use catalog::{CourseStore, DepartmentStore, ResourceStore};
pub use history::HistoryStore;
pub use interaction::InteractionStore;
pub use like::LikeToggleStore;
pub use user::UserStore;

use opencourse_core::ServiceError;
use opencourse_sql::{Row, SQLError};

pub(crate) fn storage_err(e: SQLError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// Map a write error, turning a uniqueness violation into `Conflict`.
pub(crate) fn write_err(what: &str) -> impl Fn(SQLError) -> ServiceError + '_ {
    move |e| {
        if e.is_constraint() {
            ServiceError::Conflict(format!("{what}: {e}"))
        } else {
            ServiceError::Storage(e.to_string())
        }
    }
}

pub(crate) fn col_i64(row: &Row, name: &str) -> Result<i64, ServiceError> {
    row.get_i64(name)
        .ok_or_else(|| ServiceError::Storage(format!("missing integer column {name}")))
}

pub(crate) fn col_str(row: &Row, name: &str) -> Result<String, ServiceError> {
    row.get_str(name)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Storage(format!("missing text column {name}")))
}

pub(crate) fn col_opt_i64(row: &Row, name: &str) -> Option<i64> {
    row.get_i64(name)
}

pub(crate) fn col_opt_str(row: &Row, name: &str) -> Option<String> {
    row.get_str(name).map(str::to_string)
}
