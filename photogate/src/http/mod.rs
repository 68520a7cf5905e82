//! HTTP layer: Axum router, handlers, and responses.
//!
//! Exposes the liveness route (`/`), `/login`, and the session-gated `/photos` proxy.

mod error;
mod handlers;
mod responses;
mod state;


pub use handlers::router;
pub use state::{AppState, Ttls};
