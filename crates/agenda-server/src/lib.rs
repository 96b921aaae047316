//! Agenda backend HTTP server.
//!
//! Wires the auth engine (`agenda-auth`) to its in-memory storage backends
//! (`agenda-auth-memory`) and exposes the `/auth` API.

pub mod config;
pub mod observability;
pub mod routes;
pub mod server;
pub mod sweep;

pub use server::{AgendaServer, ServerBuilder, build_app};
