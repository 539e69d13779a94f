//! Rate limiting module for protecting against abuse.
//!
//! In-memory fixed-window limiter for authentication, submission, read and
//! write traffic, plus failed-login tracking that temporarily blocks IPs.
//! Each application state owns its own limiter instance.

pub mod config;
pub mod error;
pub mod ip;
pub mod limiter;
pub mod middleware;
pub mod types;

pub use config::*;
pub use error::*;
pub use ip::*;
pub use limiter::*;
pub use middleware::{check_ip_not_blocked, rate_limit_by_admin, rate_limit_by_ip, with_category};
pub use types::*;
