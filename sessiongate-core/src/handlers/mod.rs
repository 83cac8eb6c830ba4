//! Edge handlers.
//!
//! - [`login`] - credential exchange, issues the session cookie
//! - [`logout`] - session invalidation, clears the session cookie
//! - [`proxy`] - generic streaming GET proxy

pub mod login;
pub mod logout;
pub mod proxy;

pub use login::login;
pub use logout::logout;
pub use proxy::proxy_get;
