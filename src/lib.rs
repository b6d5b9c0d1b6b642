//! OSPF interface state machine: link-level adjacency bring-up and DR/BDR
//! election on broadcast and NBMA networks, plus the point-to-point and
//! passive variants. Packet encoding, flooding, and route computation are
//! other subsystems; they meet this one at [`hello::HelloView`], the
//! neighbor event traits, and the delayed-ack queue.

pub mod command;
pub mod config;
pub mod constant;
pub mod election;
pub mod error;
pub mod hello;
pub mod interface;
mod logging;
mod macros;
pub mod neighbor;
pub mod net;
pub mod router;
pub mod timer;
