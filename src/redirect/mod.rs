//! Visitor redirection from the legacy site to the replacement site

pub mod consent;
pub mod destination;
pub mod handlers;
pub mod middleware;
pub mod resolver;
pub mod routes;

pub use consent::{ConsentState, CookieUpdate};
pub use destination::{compute_destination, Destination, PathRule};
pub use resolver::{resolve, should_redirect, RedirectDecision};
