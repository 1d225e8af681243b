pub mod api_key;
pub mod keystore;
pub mod role;
pub mod user;

pub use api_key::{ApiKey, GENERAL_PERMISSION};
pub use keystore::Keystore;
pub use role::{Role, RoleCode};
pub use user::User;
