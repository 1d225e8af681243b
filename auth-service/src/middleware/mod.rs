//! Request guards. Each protected route group runs the chain in order:
//! api key permission check, bearer access check, then an optional role
//! check when the route policy names roles.

mod api_key;
mod auth;
mod policy;
mod roles;

pub use api_key::{api_key_guard, has_permission, API_KEY_HEADER};
pub use auth::{access_guard, extract_bearer};
pub use policy::{AuthUser, AuthenticatedUser, RoutePolicy};
pub use roles::{has_role, role_guard};
