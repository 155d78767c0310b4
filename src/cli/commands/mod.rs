mod create_user;
mod hash_password;

pub use create_user::cmd_create_user;
pub use hash_password::cmd_hash_password;
