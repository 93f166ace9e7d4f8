pub mod claims;
pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{resolve_identity, AuthenticatedUser, Identity, IdentityGate};
pub use password::PasswordService;
pub use roles::{authorize, RequireRole};
