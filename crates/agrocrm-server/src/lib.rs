//! AgroCRM Server — axum HTTP binding over the auth and customer
//! services.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::AppState;
