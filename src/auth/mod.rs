//! Authentication: password hashing, signed tokens, the auth service and
//! the middleware that guards protected routes.

pub mod handlers;
pub mod hasher;
pub mod middleware;
mod service;
pub mod token;

pub use hasher::PasswordHasher;
pub use middleware::{AuthGate, CallerId};
pub use service::AuthService;
pub use token::{Claims, TokenCodec};
