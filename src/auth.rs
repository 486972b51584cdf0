//! Identity-domain identifiers, redacted secrets, and delegated credential sets.

pub mod credentials;
pub mod id;
pub mod secret;
pub mod session;

pub use credentials::*;
pub use id::*;
pub use secret::*;
