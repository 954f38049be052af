//! Review operations.
//!
//! Every write runs in one store transaction: the review row, the like
//! records, the activity score and the history entries commit together or
//! not at all.

use std::sync::Arc;

use tracing::{debug, info, warn};

use opencourse_core::{now_rfc3339, ServiceError};
use opencourse_sql::SQLStore;

use crate::history::AuditHistoryLog;
use crate::ledger::ActivityLedger;
use crate::model::{Actor, Interaction, InteractionInput};
use crate::registry::ActionKind;
use crate::store::{storage_err, CourseStore, InteractionStore, LikeToggleStore, UserStore};

pub struct InteractionCoordinator {
    db: Arc<dyn SQLStore>,
    users: UserStore,
    courses: CourseStore,
    interactions: InteractionStore,
    likes: LikeToggleStore,
    ledger: ActivityLedger,
    history: Arc<AuditHistoryLog>,
}

impl InteractionCoordinator {
    pub fn new(db: Arc<dyn SQLStore>, ledger: ActivityLedger, history: Arc<AuditHistoryLog>) -> Self {
        Self {
            db,
            users: UserStore,
            courses: CourseStore,
            interactions: InteractionStore,
            likes: LikeToggleStore,
            ledger,
            history,
        }
    }

    pub fn ledger(&self) -> &ActivityLedger {
        &self.ledger
    }

    /// Create the actor's review of a course, or merge `input` into the
    /// existing one. Only creation is scored.
    pub fn add_or_update_interaction(
        &self,
        actor: &Actor,
        course_id: i64,
        input: &InteractionInput,
    ) -> Result<Interaction, ServiceError> {
        input.validate()?;

        let tx = self.db.begin().map_err(storage_err)?;
        let db = tx.as_executor();

        if self.courses.get(db, course_id)?.is_none() {
            return Err(ServiceError::NotFound(format!("course {course_id}")));
        }

        let now = now_rfc3339();
        let (interaction, created) =
            match self.interactions.find_by_course_and_user(db, course_id, actor.id)? {
                Some(mut existing) => {
                    existing.merge(input, &now);
                    self.interactions.save(db, &existing)?;
                    self.history
                        .append(db, actor, ActionKind::UpdateInteraction, existing.id)?;
                    (existing, false)
                }
                None => {
                    let created = self.interactions.insert(
                        db,
                        course_id,
                        actor.id,
                        input.content.as_deref(),
                        input.rating,
                        &now,
                    )?;
                    self.ledger.apply(db, actor.id, ActionKind::CreateInteraction)?;
                    self.history
                        .append(db, actor, ActionKind::CreateInteraction, created.id)?;
                    (created, true)
                }
            };

        if input.rating.is_some() {
            self.history.append(db, actor, ActionKind::RateCourse, course_id)?;
        }

        tx.commit().map_err(storage_err)?;

        if created {
            info!("user {} reviewed course {course_id} (interaction {})", actor.id, interaction.id);
        } else {
            info!("user {} updated interaction {}", actor.id, interaction.id);
        }
        Ok(interaction)
    }

    /// Edit a review by id. Only its author may do this.
    pub fn update_interaction(
        &self,
        actor: &Actor,
        interaction_id: i64,
        input: &InteractionInput,
    ) -> Result<Interaction, ServiceError> {
        input.validate()?;

        let tx = self.db.begin().map_err(storage_err)?;
        let db = tx.as_executor();

        let mut interaction = self
            .interactions
            .find(db, interaction_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("interaction {interaction_id}")))?;

        if interaction.user_id != actor.id {
            warn!("user {} may not edit interaction {interaction_id}", actor.id);
            return Err(ServiceError::PermissionDenied(format!(
                "interaction {interaction_id} belongs to another user"
            )));
        }

        interaction.merge(input, &now_rfc3339());
        self.interactions.save(db, &interaction)?;

        if input.rating.is_some() {
            self.history
                .append(db, actor, ActionKind::RateCourse, interaction.course_id)?;
        }
        self.history
            .append(db, actor, ActionKind::UpdateInteraction, interaction.id)?;

        tx.commit().map_err(storage_err)?;
        info!("user {} updated interaction {interaction_id}", actor.id);
        Ok(interaction)
    }

    /// Delete a review. Allowed for its author or an admin; the author
    /// loses the delete delta either way. Returns false when nothing was
    /// deleted.
    pub fn delete_interaction(&self, actor: &Actor, interaction_id: i64) -> Result<bool, ServiceError> {
        let tx = self.db.begin().map_err(storage_err)?;
        let db = tx.as_executor();

        let Some(interaction) = self.interactions.find(db, interaction_id)? else {
            debug!("delete of missing interaction {interaction_id}");
            return Ok(false);
        };

        if interaction.user_id != actor.id && !actor.is_admin() {
            warn!("user {} denied delete of interaction {interaction_id}", actor.id);
            return Ok(false);
        }

        let dropped = self.likes.remove_all(db, interaction_id)?;
        self.interactions.delete(db, interaction_id)?;
        self.ledger
            .apply(db, interaction.user_id, ActionKind::DeleteInteraction)?;
        self.history
            .append(db, actor, ActionKind::DeleteInteraction, interaction_id)?;

        tx.commit().map_err(storage_err)?;
        info!(
            "user {} deleted interaction {interaction_id} ({dropped} likes dropped)",
            actor.id
        );
        Ok(true)
    }

    /// Like a review. Returns false if it is missing, already liked, or the
    /// liker has no account.
    pub fn like_interaction(&self, actor: &Actor, interaction_id: i64) -> Result<bool, ServiceError> {
        self.toggle_like(actor, interaction_id, true)
    }

    /// Withdraw a like. Returns false if it is missing or not liked.
    pub fn unlike_interaction(&self, actor: &Actor, interaction_id: i64) -> Result<bool, ServiceError> {
        self.toggle_like(actor, interaction_id, false)
    }

    fn toggle_like(&self, actor: &Actor, interaction_id: i64, like: bool) -> Result<bool, ServiceError> {
        let tx = self.db.begin().map_err(storage_err)?;
        let db = tx.as_executor();

        let Some(interaction) = self.interactions.find(db, interaction_id)? else {
            debug!("like toggle on missing interaction {interaction_id}");
            return Ok(false);
        };
        if self.users.get(db, actor.id)?.is_none() {
            debug!("like toggle by unknown user {}", actor.id);
            return Ok(false);
        }

        let (flipped, action) = if like {
            (
                self.likes.like(db, actor.id, interaction_id)?.is_some(),
                ActionKind::LikeInteraction,
            )
        } else {
            (self.likes.unlike(db, actor.id, interaction_id)?, ActionKind::UnlikeInteraction)
        };
        if !flipped {
            debug!("{action} by user {} on {interaction_id} is a no-op", actor.id);
            return Ok(false);
        }

        let likes = self.interactions.refresh_likes(db, interaction_id)?;
        self.ledger.apply(db, interaction.user_id, action)?;
        self.history.append(db, actor, action, interaction_id)?;

        tx.commit().map_err(storage_err)?;
        info!("{action} by user {} on {interaction_id}, now {likes} likes", actor.id);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Whether `user_id` currently likes the review. False if it is gone.
    pub fn like_status(&self, user_id: i64, interaction_id: i64) -> Result<bool, ServiceError> {
        let db = self.db.as_executor();
        if self.interactions.find(db, interaction_id)?.is_none() {
            return Ok(false);
        }
        self.likes.status(db, user_id, interaction_id)
    }

    pub fn get_interaction(&self, interaction_id: i64) -> Result<Interaction, ServiceError> {
        self.interactions
            .find(self.db.as_executor(), interaction_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("interaction {interaction_id}")))
    }

    /// Reviews of a course, most liked first.
    pub fn interactions_for_course(&self, course_id: i64) -> Result<Vec<Interaction>, ServiceError> {
        self.interactions.list_by_course(self.db.as_executor(), course_id)
    }

    /// Reviews by a user, newest first.
    pub fn interactions_by_user(&self, user_id: i64) -> Result<Vec<Interaction>, ServiceError> {
        self.interactions.list_by_user(self.db.as_executor(), user_id)
    }
}
