//! Business logic for the auth service: persistence, token signing,
//! and the credential/session flows.

mod auth;
mod database;
pub mod error;
mod jwt;

pub use auth::{generate_token_key, payload_is_valid, AuthService};
pub use database::MongoDb;
pub use error::ServiceError;
pub use jwt::{TokenCodec, TokenError, TokenPayload};
