//! Activity scoring.
//!
//! Each action kind is worth a signed number of points to the user it is
//! credited to. The table comes from configuration; anything not listed
//! scores zero.

use serde::Deserialize;
use tracing::debug;

use opencourse_core::ServiceError;
use opencourse_sql::Executor;

use crate::registry::ActionKind;
use crate::store::UserStore;

/// Points for actions on reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InteractionActivity {
    pub add: i64,
    pub delete: i64,
    pub like: i64,
    pub unlike: i64,
}

/// Points for actions on course resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceActivity {
    pub add: i64,
    pub delete: i64,
    pub like: i64,
    pub unlike: i64,
    pub view: i64,
}

/// The `[activity]` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub interaction: InteractionActivity,
    pub resource: ResourceActivity,
}

impl ActivityConfig {
    /// Parse a document whose top level is the activity table itself
    /// (`[interaction]`, `[resource]`).
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Validation(format!("activity config: {e}")))
    }

    /// Configured delta for `kind`, zero when unscored.
    pub fn delta(&self, kind: ActionKind) -> i64 {
        let i = &self.interaction;
        let r = &self.resource;
        match kind {
            ActionKind::CreateInteraction => i.add,
            ActionKind::DeleteInteraction => i.delete,
            ActionKind::LikeInteraction => i.like,
            ActionKind::UnlikeInteraction => i.unlike,
            ActionKind::CreateResource => r.add,
            ActionKind::DeleteResource => r.delete,
            ActionKind::LikeResource => r.like,
            ActionKind::UnlikeResource => r.unlike,
            ActionKind::ViewResource => r.view,
            _ => 0,
        }
    }
}

/// Applies configured deltas to users' activity scores.
#[derive(Debug, Clone)]
pub struct ActivityLedger {
    config: ActivityConfig,
    users: UserStore,
}

impl ActivityLedger {
    pub fn new(config: ActivityConfig) -> Self {
        Self {
            config,
            users: UserStore,
        }
    }

    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    pub fn delta(&self, kind: ActionKind) -> i64 {
        self.config.delta(kind)
    }

    /// Credit `kind`'s delta to `user_id` on `db` and return the delta.
    ///
    /// Run this on the same transaction that records the action.
    pub fn apply(&self, db: &dyn Executor, user_id: i64, kind: ActionKind) -> Result<i64, ServiceError> {
        let delta = self.delta(kind);
        if delta == 0 {
            return Ok(0);
        }
        self.users.add_activity(db, user_id, delta)?;
        debug!("activity {delta:+} for user {user_id} ({kind})");
        Ok(delta)
    }
}
