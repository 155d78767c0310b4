//! Hash password command handler

use crate::config::Config;
use crate::services::password;

pub async fn cmd_hash_password(config: &Config, plaintext: &str) -> anyhow::Result<()> {
    let hashed =
        password::hash_blocking(plaintext.to_string(), config.security.bcrypt_cost).await?;
    println!("{hashed}");
    Ok(())
}
