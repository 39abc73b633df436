//! Core application primitives (status server, process identity)

pub mod http;
pub mod pidfile;

pub use http::{create_router, start_server, AppState};
pub use pidfile::PidFile;
