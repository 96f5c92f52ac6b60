#![doc = "The `tasky` library crate."]
#![doc = ""]
#![doc = "Per-user todo lists behind bearer-token sessions. The crate holds the"]
#![doc = "authentication layer (password hashing, session tokens, the authenticate"]
#![doc = "middleware and the ownership extractor), the owner-scoped todo service,"]
#![doc = "the storage adapters, routing and error handling. `main.rs` wires them"]
#![doc = "into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod todos;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::routes::AppState;
