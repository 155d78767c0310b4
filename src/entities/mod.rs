pub mod prelude;

pub mod active_flag;
pub mod motorcycles;
pub mod roles;
pub mod users;

pub use active_flag::ActiveFlag;
