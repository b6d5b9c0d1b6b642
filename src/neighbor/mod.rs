mod state;
pub use state::*;

use std::fmt;
use std::net::Ipv4Addr;

use crate::timer::TimerHandle;

/// Per-neighbor record owned by the interface. The interface FSM reads the
/// advertised priority and DR/BDR view during elections and drives the
/// neighbor FSM through the events in [`NeighborEvent`].
#[derive(Debug)]
pub struct Neighbor {
    pub state: NeighborState,
    pub router_id: Ipv4Addr,
    pub ip_addr: Ipv4Addr,
    pub priority: u8,
    /// What the neighbor last advertised as DR/BDR (interface addresses).
    pub dr: Option<Ipv4Addr>,
    pub bdr: Option<Ipv4Addr>,
    pub inactive_timer: Option<TimerHandle>,
}

impl Neighbor {
    pub fn new(router_id: Ipv4Addr, ip_addr: Ipv4Addr) -> Self {
        Self {
            state: NeighborState::Down,
            router_id,
            ip_addr,
            priority: 0,
            dr: None,
            bdr: None,
            inactive_timer: None,
        }
    }

    /// Bidirectional communication confirmed; prerequisite for election.
    pub fn is_2way(&self) -> bool {
        self.state >= NeighborState::TwoWay
    }

    pub fn claims_dr(&self) -> bool {
        self.dr == Some(self.ip_addr)
    }

    pub fn claims_bdr(&self) -> bool {
        self.bdr == Some(self.ip_addr)
    }

    pub(crate) fn reset(&mut self) {
        if let Some(timer) = self.inactive_timer.take() {
            timer.cancel();
        }
        self.dr = None;
        self.bdr = None;
    }
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) state {:?} priority {} dr {} bdr {}",
            self.router_id,
            self.ip_addr,
            self.state,
            self.priority,
            self.dr.map_or("none".to_string(), |ip| ip.to_string()),
            self.bdr.map_or("none".to_string(), |ip| ip.to_string()),
        )
    }
}
