//! Wire vocabulary shared by the Ricochet server and its clients.
//!
//! Everything a client can observe about a session is expressed with the types in this crate:
//! identifiers, board/robot/goal values, the full-state snapshot, and the event enums.

mod ids;
mod message;
mod snapshot;
mod types;
pub mod wire;

pub use crate::ids::*;
pub use crate::message::*;
pub use crate::snapshot::*;
pub use crate::types::*;
