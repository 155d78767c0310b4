pub mod password;
pub mod token;
pub use token::{Claims, IssuedToken, TokenError, TokenService};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Credential, CredentialStore, LoginResult};
pub use auth_service_impl::DefaultAuthService;
