pub mod error;
pub mod gate;
mod handlers;
pub mod models;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use error::ApiError;
pub use server::{router, serve};
pub use state::{AppState, Sources};
