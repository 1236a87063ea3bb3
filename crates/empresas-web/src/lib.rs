mod assets;
mod auth;
mod error;
mod handlers;
mod server;

pub use auth::AdminSecret;
pub use error::ApiError;
pub use server::{router, run_server, serve, AppState, ServerConfig};
