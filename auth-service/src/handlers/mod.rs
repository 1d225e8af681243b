pub mod auth;
pub mod credential;
pub mod user;
