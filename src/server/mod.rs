pub mod builder;
pub mod handler;
pub mod listener;

pub use builder::{HttpServer, ServerBuilder};
pub use handler::StatusHandler;
