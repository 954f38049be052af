use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TargetKind
// ---------------------------------------------------------------------------

/// The entity category a history entry's target id points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    Course,
    Department,
    Resource,
    Interaction,
    User,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "COURSE",
            Self::Department => "DEPARTMENT",
            Self::Resource => "RESOURCE",
            Self::Interaction => "INTERACTION",
            Self::User => "USER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "COURSE" => Some(Self::Course),
            "DEPARTMENT" => Some(Self::Department),
            "RESOURCE" => Some(Self::Resource),
            "INTERACTION" => Some(Self::Interaction),
            "USER" => Some(Self::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionKind: the closed set of audited actions
// ---------------------------------------------------------------------------

/// Declares `ActionKind` from one table so that the id, stored name,
/// description and target kind of every action are fixed in a single place.
/// Adding a variant without a target kind does not compile.
macro_rules! action_kinds {
    ($($variant:ident = $id:literal, $name:literal, $target:ident, $desc:literal;)*) => {
        /// A user action recorded in the history log.
        ///
        /// Stored and serialized by its name (e.g. `Create-Interaction`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum ActionKind {
            $($variant,)*
        }

        impl ActionKind {
            /// Every action kind, in id order.
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$variant,)*];

            /// Stable numeric id.
            pub fn id(self) -> u8 {
                match self {
                    $(ActionKind::$variant => $id,)*
                }
            }

            /// Stable stored name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ActionKind::$variant => $name,)*
                }
            }

            pub fn description(self) -> &'static str {
                match self {
                    $(ActionKind::$variant => $desc,)*
                }
            }

            /// The entity kind this action targets.
            pub fn target_kind(self) -> TargetKind {
                match self {
                    $(ActionKind::$variant => TargetKind::$target,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ActionKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

action_kinds! {
    CreateUser = 21, "Create-User", User, "create user";
    UpdateUser = 22, "Update-User", User, "update user";
    CreateDepartment = 23, "Create-Department", Department, "create department";
    UpdateDepartment = 24, "Update-Department", Department, "update department";
    CreateCourse = 25, "Create-Course", Course, "create course";
    UpdateCourse = 26, "Update-Course", Course, "update course";
    CreateResource = 27, "Create-Resource", Resource, "upload resource";
    UpdateResource = 28, "Update-Resource", Resource, "update resource";
    CreateInteraction = 29, "Create-Interaction", Interaction, "post review";
    DeleteInteraction = 30, "Delete-Interaction", Interaction, "delete review";
    LikeInteraction = 31, "Like-Interaction", Interaction, "like review";
    UnlikeInteraction = 32, "Unlike-Interaction", Interaction, "withdraw like";
    DislikeInteraction = 33, "Dislike-Interaction", Interaction, "dislike review";
    UndislikeInteraction = 34, "Undislike-Interaction", Interaction, "withdraw dislike";
    RateCourse = 35, "Rate-Course", Course, "rate course";
    ViewResource = 36, "View-Resource", Resource, "view resource";
    UpdateInteraction = 37, "Update-Interaction", Interaction, "edit review";
    DeleteUser = 38, "Delete-User", User, "delete user";
    DeleteDepartment = 39, "Delete-Department", Department, "delete department";
    DeleteCourse = 40, "Delete-Course", Course, "delete course";
    DeleteResource = 41, "Delete-Resource", Resource, "delete resource";
    LikeResource = 42, "Like-Resource", Resource, "like resource";
    UnlikeResource = 43, "Unlike-Resource", Resource, "withdraw resource like";
}

impl From<ActionKind> for &'static str {
    fn from(kind: ActionKind) -> Self {
        kind.as_str()
    }
}

impl TryFrom<String> for ActionKind {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        ActionKind::from_name(&name).ok_or_else(|| format!("unknown action kind: {name}"))
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::from_name(s).ok_or_else(|| format!("unknown action kind: {s}"))
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
