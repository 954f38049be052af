//! `review` subcommands.

use anyhow::Result;
use serde_json::json;

use review::{InteractionInput, ReviewModule};

use super::{actor, print_json};

pub fn submit(
    module: &ReviewModule,
    user_id: i64,
    course_id: i64,
    content: Option<&str>,
    rating: Option<u8>,
) -> Result<()> {
    let actor = actor(module, user_id)?;
    let review = module
        .coordinator()
        .add_or_update_interaction(&actor, course_id, &InteractionInput::new(content, rating))?;
    print_json(&review)
}

pub fn update(
    module: &ReviewModule,
    user_id: i64,
    id: i64,
    content: Option<&str>,
    rating: Option<u8>,
) -> Result<()> {
    let actor = actor(module, user_id)?;
    let review = module
        .coordinator()
        .update_interaction(&actor, id, &InteractionInput::new(content, rating))?;
    print_json(&review)
}

pub fn delete(module: &ReviewModule, user_id: i64, id: i64) -> Result<()> {
    let actor = actor(module, user_id)?;
    let deleted = module.coordinator().delete_interaction(&actor, id)?;
    print_json(&json!({ "id": id, "deleted": deleted }))
}

pub fn like(module: &ReviewModule, user_id: i64, id: i64, on: bool) -> Result<()> {
    let actor = actor(module, user_id)?;
    let svc = module.coordinator();
    let changed = if on {
        svc.like_interaction(&actor, id)?
    } else {
        svc.unlike_interaction(&actor, id)?
    };
    print_json(&json!({
        "id": id,
        "changed": changed,
        "liked": svc.like_status(actor.id, id)?,
    }))
}

pub fn list(module: &ReviewModule, course: Option<i64>, user: Option<i64>) -> Result<()> {
    let svc = module.coordinator();
    let reviews = match (course, user) {
        (Some(course_id), None) => svc.interactions_for_course(course_id)?,
        (None, Some(user_id)) => svc.interactions_by_user(user_id)?,
        _ => anyhow::bail!("Provide exactly one of --course or --user."),
    };
    print_json(&reviews)
}

pub fn show(module: &ReviewModule, id: i64) -> Result<()> {
    print_json(&module.coordinator().get_interaction(id)?)
}
