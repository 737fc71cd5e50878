//! Device-API credential models: redacted secrets, bearer credentials, and the process-wide cache.

pub mod cache;
pub mod credential;
pub mod secret;

pub use cache::*;
pub use credential::*;
pub use secret::*;
