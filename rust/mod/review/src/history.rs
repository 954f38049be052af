//! Audit history: append entries, list them, and turn them back into the
//! live objects they describe.

use std::sync::Arc;

use tracing::debug;

use opencourse_core::{now_rfc3339, ListParams, ListResult, ServiceError};
use opencourse_sql::{Executor, SQLStore};

use crate::model::{Actor, HistoryEntry, HistoryTarget};
use crate::registry::{ActionKind, TargetKind};
use crate::store::{
    CourseStore, DepartmentStore, HistoryStore, InteractionStore, ResourceStore, UserStore,
};

/// Find-by-id for one target kind.
pub trait TargetLookup: Send + Sync {
    fn find_target(&self, db: &dyn Executor, id: i64) -> Result<Option<HistoryTarget>, ServiceError>;
}

impl TargetLookup for CourseStore {
    fn find_target(&self, db: &dyn Executor, id: i64) -> Result<Option<HistoryTarget>, ServiceError> {
        Ok(self.get(db, id)?.map(HistoryTarget::Course))
    }
}

impl TargetLookup for DepartmentStore {
    fn find_target(&self, db: &dyn Executor, id: i64) -> Result<Option<HistoryTarget>, ServiceError> {
        Ok(self.get(db, id)?.map(HistoryTarget::Department))
    }
}

impl TargetLookup for ResourceStore {
    fn find_target(&self, db: &dyn Executor, id: i64) -> Result<Option<HistoryTarget>, ServiceError> {
        Ok(self.get(db, id)?.map(HistoryTarget::Resource))
    }
}

impl TargetLookup for InteractionStore {
    fn find_target(&self, db: &dyn Executor, id: i64) -> Result<Option<HistoryTarget>, ServiceError> {
        Ok(self.find(db, id)?.map(HistoryTarget::Interaction))
    }
}

impl TargetLookup for UserStore {
    fn find_target(&self, db: &dyn Executor, id: i64) -> Result<Option<HistoryTarget>, ServiceError> {
        Ok(self.get(db, id)?.map(HistoryTarget::User))
    }
}

/// One lookup per target kind. The match in [`Self::for_kind`] is
/// exhaustive, so a new kind without a resolver does not compile.
pub struct TargetResolvers {
    pub course: Box<dyn TargetLookup>,
    pub department: Box<dyn TargetLookup>,
    pub resource: Box<dyn TargetLookup>,
    pub interaction: Box<dyn TargetLookup>,
    pub user: Box<dyn TargetLookup>,
}

impl TargetResolvers {
    pub fn for_kind(&self, kind: TargetKind) -> &dyn TargetLookup {
        match kind {
            TargetKind::Course => self.course.as_ref(),
            TargetKind::Department => self.department.as_ref(),
            TargetKind::Resource => self.resource.as_ref(),
            TargetKind::Interaction => self.interaction.as_ref(),
            TargetKind::User => self.user.as_ref(),
        }
    }
}

impl Default for TargetResolvers {
    fn default() -> Self {
        Self {
            course: Box::new(CourseStore),
            department: Box::new(DepartmentStore),
            resource: Box::new(ResourceStore),
            interaction: Box::new(InteractionStore),
            user: Box::new(UserStore),
        }
    }
}

/// Append-only audit log.
pub struct AuditHistoryLog {
    db: Arc<dyn SQLStore>,
    store: HistoryStore,
    resolvers: TargetResolvers,
}

impl AuditHistoryLog {
    pub fn new(db: Arc<dyn SQLStore>) -> Self {
        Self::with_resolvers(db, TargetResolvers::default())
    }

    pub fn with_resolvers(db: Arc<dyn SQLStore>, resolvers: TargetResolvers) -> Self {
        Self {
            db,
            store: HistoryStore,
            resolvers,
        }
    }

    /// Record that `actor` performed `action` on `target_id`.
    ///
    /// `db` is the caller's open transaction so the entry commits or rolls
    /// back with the action itself.
    pub fn append(
        &self,
        db: &dyn Executor,
        actor: &Actor,
        action: ActionKind,
        target_id: i64,
    ) -> Result<HistoryEntry, ServiceError> {
        let entry = self.store.insert(db, actor.id, action, target_id, &now_rfc3339())?;
        debug!("history #{}: user {} {} {} {}", entry.id, actor.id, action, entry.target_kind, target_id);
        Ok(entry)
    }

    /// Fetch the live object `entry` points at, or `None` if it is gone.
    pub fn resolve(&self, entry: &HistoryEntry) -> Result<Option<HistoryTarget>, ServiceError> {
        let kind = entry.action.target_kind();
        self.resolvers
            .for_kind(kind)
            .find_target(self.db.as_executor(), entry.target_id)
    }

    /// A user's entries, newest first.
    pub fn list_by_user(&self, user_id: i64) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.store.list_by_user(self.db.as_executor(), user_id)
    }

    pub fn list_by_user_paged(
        &self,
        user_id: i64,
        params: &ListParams,
    ) -> Result<ListResult<HistoryEntry>, ServiceError> {
        let db = self.db.as_executor();
        let total = self.store.count_by_user(db, user_id)?;
        let items = self.store.list_by_user_page(db, user_id, params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }

    /// A user's entries against one object, newest first.
    pub fn list_by_user_and_target(
        &self,
        user_id: i64,
        kind: TargetKind,
        target_id: i64,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.store
            .list_by_user_and_target(self.db.as_executor(), user_id, kind, target_id)
    }

    pub fn has_performed(
        &self,
        user_id: i64,
        action: ActionKind,
        target_id: i64,
    ) -> Result<bool, ServiceError> {
        self.store.exists(self.db.as_executor(), user_id, action, target_id)
    }
}
