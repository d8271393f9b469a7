mod password;
mod session;

#[cfg(test)]
pub(crate) use password::hash_blocking;
pub use password::{hash_password, verify_password};
pub use session::SessionStore;
