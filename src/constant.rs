#![allow(non_upper_case_globals, dead_code)]

use std::time::Duration;

pub const DefaultHelloInterval: u16 = 10;
pub const DefaultRouterDeadInterval: u32 = 40;
pub const DefaultAckDelay: u16 = 1;
pub const DefaultRouterPriority: u8 = 1;

/// First hello goes out shortly after `InterfaceUp`, with a small random
/// deviation so many interfaces coming up together do not burst in sync.
pub const HelloStartupDelayMin: Duration = Duration::from_millis(90);
pub const HelloStartupDelayMax: Duration = Duration::from_millis(110);
