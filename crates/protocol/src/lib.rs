//! Wire types for the Wing test session API.
//!
//! This crate contains the serde-decodable types exchanged with the remote
//! session service. These types represent the "protocol layer": the shapes of
//! data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond decoding and display helpers
//! * Presence-explicit: optional wire fields decode to `Option`, never to a
//!   silently coalesced default, so callers can tell "omitted" from "cleared"
//! * Stable: Changes only when the wire format changes
//!
//! The session aggregate and all orchestration logic live in `wing-rs`.

mod lenient;
pub mod patient;
pub mod session;
pub mod test_record;
pub mod types;
pub mod upload;

pub use patient::*;
pub use session::*;
pub use test_record::*;
pub use types::*;
pub use upload::*;
