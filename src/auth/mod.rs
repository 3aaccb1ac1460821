//! Password hashing, bearer tokens and the middleware that checks them.

mod log_in;
mod middleware;
mod password;
mod token;

pub use log_in::post_log_in;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use token::{Claims, decode_token, encode_token};
