pub mod motorcycle;
pub mod resource;
pub mod role;
pub mod user;
