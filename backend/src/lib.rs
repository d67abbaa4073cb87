//! Server-rendered wine catalogue and review service.
//!
//! Hexagonal layout: `domain` holds entities, services, and ports; `inbound`
//! adapts HTTP onto the domain; `outbound` implements the ports against
//! PostgreSQL (or an in-memory store for development and tests).

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
