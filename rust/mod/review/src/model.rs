use serde::{Deserialize, Serialize};

use opencourse_core::ServiceError;

use crate::registry::{ActionKind, TargetKind};

/// Lowest and highest rating a review may carry.
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 10;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Visitor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Visitor => "VISITOR",
            Self::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Self::User),
            "VISITOR" => Some(Self::Visitor),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A platform user. Owned by the identity subsystem; the review core only
/// reads it and moves its `activity` score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Aggregate activity score. Starts at 1 and may dip below zero.
    pub activity: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// The authenticated caller of a coordinator operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    pub created_at: String,
}

/// A study resource (exam paper, notes, slides...) attached to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    /// Free-form category such as `exam` or `notes`.
    pub kind: String,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Interaction: a user's review of a course
// ---------------------------------------------------------------------------

/// A review of one course by one user. At most one exists per
/// (course_id, user_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Always equal to the number of like records pointing here.
    pub likes: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Interaction {
    /// Copy every field present in `input` over this interaction.
    /// Absent fields keep their current value.
    pub fn merge(&mut self, input: &InteractionInput, now: &str) {
        if let Some(ref content) = input.content {
            self.content = Some(content.clone());
        }
        if let Some(rating) = input.rating {
            self.rating = Some(rating);
        }
        self.updated_at = now.to_string();
    }
}

/// The editable part of a review. Either field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionInput {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl InteractionInput {
    pub fn new(content: Option<&str>, rating: Option<u8>) -> Self {
        Self {
            content: content.map(str::to_string),
            rating,
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        match self.rating {
            Some(r) if !(RATING_MIN..=RATING_MAX).contains(&r) => Err(ServiceError::Validation(
                format!("rating must be between {RATING_MIN} and {RATING_MAX}, got {r}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Existence means "this user likes this interaction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRecord {
    pub user_id: i64,
    pub interaction_id: i64,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One immutable audit fact.
///
/// `target_id` is type-erased: which table it points into is decided by
/// `target_kind`, itself derived from `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: ActionKind,
    pub target_kind: TargetKind,
    pub target_id: i64,
    pub timestamp: String,
}

/// The live object a history entry points at.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "object", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryTarget {
    Course(Course),
    Department(Department),
    Resource(Resource),
    Interaction(Interaction),
    User(User),
}

impl HistoryTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Course(_) => TargetKind::Course,
            Self::Department(_) => TargetKind::Department,
            Self::Resource(_) => TargetKind::Resource,
            Self::Interaction(_) => TargetKind::Interaction,
            Self::User(_) => TargetKind::User,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Course(c) => c.id,
            Self::Department(d) => d.id,
            Self::Resource(r) => r.id,
            Self::Interaction(i) => i.id,
            Self::User(u) => u.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Interaction {
        Interaction {
            id: 1,
            course_id: 10,
            user_id: 7,
            content: Some("solid lectures".into()),
            rating: Some(6),
            likes: 0,
            created_at: "2026-01-01T00:00:00.000000Z".into(),
            updated_at: "2026-01-01T00:00:00.000000Z".into(),
        }
    }

    #[test]
    fn merge_keeps_omitted_fields() {
        let mut i = sample();
        i.merge(&InteractionInput::new(None, Some(9)), "2026-01-02T00:00:00.000000Z");
        assert_eq!(i.content.as_deref(), Some("solid lectures"));
        assert_eq!(i.rating, Some(9));
        assert_eq!(i.updated_at, "2026-01-02T00:00:00.000000Z");

        i.merge(&InteractionInput::new(Some("changed my mind"), None), "t");
        assert_eq!(i.content.as_deref(), Some("changed my mind"));
        assert_eq!(i.rating, Some(9));
    }

    #[test]
    fn rating_bounds() {
        assert!(InteractionInput::new(None, Some(1)).validate().is_ok());
        assert!(InteractionInput::new(None, Some(10)).validate().is_ok());
        assert!(InteractionInput::new(Some("text only"), None).validate().is_ok());

        let err = InteractionInput::new(None, Some(0)).validate().unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(InteractionInput::new(None, Some(11)).validate().is_err());
    }

    #[test]
    fn actor_from_user() {
        let user = User {
            id: 3,
            name: "root".into(),
            email: "root@example.edu".into(),
            role: UserRole::Admin,
            activity: 1,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let actor = Actor::from(&user);
        assert_eq!(actor.id, 3);
        assert!(actor.is_admin());
        assert!(!Actor::new(4, UserRole::User).is_admin());
    }

    #[test]
    fn interaction_json_omits_absent_fields() {
        let mut i = sample();
        i.content = None;
        let json = serde_json::to_string(&i).unwrap();
        assert!(!json.contains("\"content\""));
        assert!(json.contains("\"courseId\":10"));
        let back: Interaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, i);
    }

    #[test]
    fn history_target_is_tagged() {
        let target = HistoryTarget::Interaction(sample());
        assert_eq!(target.kind(), TargetKind::Interaction);
        assert_eq!(target.id(), 1);
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["kind"], "INTERACTION");
        assert_eq!(json["object"]["userId"], 7);
    }
}
