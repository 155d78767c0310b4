//! Create user command handler

use anyhow::Context;
use validator::Validate;

use crate::api::users::UserRequest;
use crate::config::Config;
use crate::db::Store;
use crate::entities::users;
use crate::services::password;

pub async fn cmd_create_user(
    config: &Config,
    username: &str,
    email: &str,
    plaintext: &str,
    role: &str,
) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let user = create_user(
        &store,
        config.security.bcrypt_cost,
        username,
        email,
        plaintext,
        role,
    )
    .await?;

    println!(
        "Created user '{}' (id {}) with role {role}",
        user.username, user.id
    );

    Ok(())
}

/// Applies the same field rules as `POST /users`, resolving the role by name.
async fn create_user(
    store: &Store,
    bcrypt_cost: u32,
    username: &str,
    email: &str,
    plaintext: &str,
    role: &str,
) -> anyhow::Result<users::Model> {
    let role_row = store
        .find_role_by_name(role)
        .await?
        .with_context(|| format!("No active role named '{role}'"))?;

    let request = UserRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: plaintext.to_string(),
        role_id: role_row.id,
    };
    request.validate().context("Invalid user details")?;

    let password_hash = password::hash_blocking(request.password.clone(), bcrypt_cost).await?;

    store.create_user(request.into_fields(password_hash)).await
}
