//! Contract types for the ledger module
//!
//! Request payloads accepted at the service boundary and event payloads
//! written to the outbox.

pub mod ledger_events_v1;
pub mod ledger_v1;

pub use ledger_events_v1::*;
pub use ledger_v1::*;
