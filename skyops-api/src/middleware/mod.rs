pub mod auth;

pub use auth::{require_edit_secret, EDIT_SECRET_HEADER};
