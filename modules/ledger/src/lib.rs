pub mod config;
pub mod contracts;
pub mod db;
pub mod domain;
pub mod error;
pub mod health;
pub mod metrics;
pub mod repos;
pub mod routes;
pub mod services;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
pub use routes::{router, AppState};
