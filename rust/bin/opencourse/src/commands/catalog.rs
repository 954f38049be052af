//! Seeding users and courses.

use anyhow::Result;

use review::model::{NewUser, UserRole};
use review::store::{CourseStore, UserStore};
use review::ReviewModule;

use super::print_json;

pub fn add_user(module: &ReviewModule, name: &str, email: &str, admin: bool) -> Result<()> {
    let role = if admin { UserRole::Admin } else { UserRole::User };
    let user = UserStore.create(
        module.store().as_executor(),
        &NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role,
        },
    )?;
    print_json(&user)
}

pub fn add_course(module: &ReviewModule, code: &str, name: &str) -> Result<()> {
    let course = CourseStore.create(module.store().as_executor(), code, name, None)?;
    print_json(&course)
}
