pub mod coordinator;
pub mod history;
pub mod ledger;
pub mod model;
pub mod registry;
pub mod store;

use std::sync::Arc;

use opencourse_core::ServiceError;
use opencourse_sql::SQLStore;

pub use coordinator::InteractionCoordinator;
pub use history::{AuditHistoryLog, TargetLookup, TargetResolvers};
pub use ledger::{ActivityConfig, ActivityLedger};
pub use model::{Actor, HistoryEntry, HistoryTarget, Interaction, InteractionInput, UserRole};
pub use registry::{ActionKind, TargetKind};

/// The review module: course reviews, likes, activity scoring and the
/// audit history behind them.
///
/// Construct one per store and share it; every handle inside is `Send + Sync`.
pub struct ReviewModule {
    db: Arc<dyn SQLStore>,
    coordinator: Arc<InteractionCoordinator>,
    history: Arc<AuditHistoryLog>,
}

impl ReviewModule {
    /// Create the module and make sure the schema exists.
    pub fn new(db: Arc<dyn SQLStore>, activity: ActivityConfig) -> Result<Self, ServiceError> {
        store::schema::init_schema(db.as_executor())?;

        let history = Arc::new(AuditHistoryLog::new(Arc::clone(&db)));
        let coordinator = Arc::new(InteractionCoordinator::new(
            Arc::clone(&db),
            ActivityLedger::new(activity),
            Arc::clone(&history),
        ));

        Ok(Self {
            db,
            coordinator,
            history,
        })
    }

    pub fn coordinator(&self) -> &Arc<InteractionCoordinator> {
        &self.coordinator
    }

    pub fn history(&self) -> &Arc<AuditHistoryLog> {
        &self.history
    }

    pub fn store(&self) -> &Arc<dyn SQLStore> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewUser;
    use crate::store::{CourseStore, UserStore};
    use opencourse_sql::SqliteStore;

    #[test]
    fn module_end_to_end_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");

        let review_id = {
            let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open(&path).unwrap());
            let module = ReviewModule::new(db, ActivityConfig::default()).unwrap();
            let ex = module.store().as_executor();
            let user = UserStore
                .create(
                    ex,
                    &NewUser {
                        name: "dana".into(),
                        email: "dana@example.edu".into(),
                        role: UserRole::User,
                    },
                )
                .unwrap();
            let course = CourseStore.create(ex, "PH100", "Physics", None).unwrap();
            let review = module
                .coordinator()
                .add_or_update_interaction(
                    &Actor::from(&user),
                    course.id,
                    &InteractionInput::new(Some("hard but fair"), Some(9)),
                )
                .unwrap();
            // Unconfigured deltas leave the score alone.
            assert_eq!(UserStore.get(ex, user.id).unwrap().unwrap().activity, 1);
            review.id
        };

        // Reopen: everything was committed to disk.
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open(&path).unwrap());
        let module = ReviewModule::new(db, ActivityConfig::default()).unwrap();
        let review = module.coordinator().get_interaction(review_id).unwrap();
        assert_eq!(review.rating, Some(9));

        let entries = module.history().list_by_user(review.user_id).unwrap();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert!(module.history().resolve(entry).unwrap().is_some());
        }
    }
}
