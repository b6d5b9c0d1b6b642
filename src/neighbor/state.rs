use std::net::Ipv4Addr;

use super::Neighbor;
use crate::interface::{Interface, NetType};
use crate::timer::{self, TimerKind};
use crate::{log_success, must};

#[cfg(debug_assertions)]
use crate::log;

/// Neighbor FSM states. Database exchange is handled by a different
/// subsystem, so an adjacency that forms goes straight to `Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NeighborState {
    Down,
    Attempt,
    Init,
    TwoWay,
    Full,
}

// helper trait for event handling
pub trait NeighborEvent {
    /// NBMA-specific: begin actively probing a configured neighbor.
    fn start(&mut self);
    fn hello_receive(&mut self);
    fn two_way_received(&mut self);
    fn one_way_received(&mut self);
    fn adj_ok(&mut self);
    fn kill_nbr(&mut self);
    fn inactivity_timer(&mut self);
    fn ll_down(&mut self);
}

/// Joint mutable view of an interface and one of its neighbors. Split
/// borrows go through the owning interface's neighbor map, so there is no
/// back-pointer from the neighbor record.
pub struct RefNeighbor<'a> {
    interface: &'a mut Interface,
    ip: Ipv4Addr,
}

impl<'a> RefNeighbor<'a> {
    pub fn from(interface: &'a mut Interface, ip: Ipv4Addr) -> Option<Self> {
        interface
            .neighbors
            .contains_key(&ip)
            .then_some(Self { interface, ip })
    }

    pub fn get_interface(&mut self) -> &mut Interface {
        self.interface
    }

    pub fn get_neighbor(&mut self) -> &mut Neighbor {
        // present by construction, and the map cannot change under us
        self.interface.neighbors.get_mut(&self.ip).unwrap()
    }
}

#[cfg(debug_assertions)]
fn log_event(event: &str, neighbor: &Neighbor) {
    log!(
        "neighbor {}({:?}) recv event: {}",
        neighbor.router_id,
        neighbor.state,
        event
    );
}

fn log_state(old: NeighborState, neighbor: &Neighbor) {
    if old == neighbor.state {
        return;
    }
    log_success!(
        "neighbor {}'s state changed: {:?} -> {:?}",
        neighbor.router_id,
        old,
        neighbor.state
    );
}

impl NeighborEvent for RefNeighbor<'_> {
    fn start(&mut self) {
        #[cfg(debug_assertions)]
        log_event("start", self.get_neighbor());
        let old = self.get_neighbor().state;
        must!(old == NeighborState::Down);
        self.get_neighbor().state = NeighborState::Attempt;
        restart_inactivity(self);
        log_state(old, self.get_neighbor());
    }

    fn hello_receive(&mut self) {
        #[cfg(debug_assertions)]
        log_event("hello_receive", self.get_neighbor());
        let old = self.get_neighbor().state;
        if old <= NeighborState::Attempt {
            self.get_neighbor().state = NeighborState::Init;
        }
        restart_inactivity(self);
        log_state(old, self.get_neighbor());
    }

    fn two_way_received(&mut self) {
        #[cfg(debug_assertions)]
        log_event("two_way_received", self.get_neighbor());
        let old = self.get_neighbor().state;
        must!(old == NeighborState::Init);
        let connect = judge_connect(self.interface, self.ip);
        self.get_neighbor().state = if connect {
            NeighborState::Full
        } else {
            NeighborState::TwoWay
        };
        log_state(old, self.get_neighbor());
    }

    fn one_way_received(&mut self) {
        #[cfg(debug_assertions)]
        log_event("one_way_received", self.get_neighbor());
        let old = self.get_neighbor().state;
        must!(old >= NeighborState::TwoWay);
        self.get_neighbor().state = NeighborState::Init;
        log_state(old, self.get_neighbor());
    }

    fn adj_ok(&mut self) {
        #[cfg(debug_assertions)]
        log_event("adj_ok", self.get_neighbor());
        let old = self.get_neighbor().state;
        let connect = judge_connect(self.interface, self.ip);
        if old == NeighborState::TwoWay && connect {
            self.get_neighbor().state = NeighborState::Full;
        } else if old == NeighborState::Full && !connect {
            self.get_neighbor().state = NeighborState::TwoWay;
        }
        log_state(old, self.get_neighbor());
    }

    fn kill_nbr(&mut self) {
        #[cfg(debug_assertions)]
        log_event("kill_nbr", self.get_neighbor());
        let old = self.get_neighbor().state;
        self.get_neighbor().reset();
        self.get_neighbor().state = NeighborState::Down;
        log_state(old, self.get_neighbor());
    }

    fn inactivity_timer(&mut self) {
        #[cfg(debug_assertions)]
        log_event("inactivity_timer", self.get_neighbor());
        let old = self.get_neighbor().state;
        self.get_neighbor().reset();
        self.get_neighbor().state = NeighborState::Down;
        log_state(old, self.get_neighbor());
    }

    fn ll_down(&mut self) {
        #[cfg(debug_assertions)]
        log_event("ll_down", self.get_neighbor());
        let old = self.get_neighbor().state;
        self.get_neighbor().reset();
        self.get_neighbor().state = NeighborState::Down;
        log_state(old, self.get_neighbor());
    }
}

/// Whether a 2-Way neighbor should become fully adjacent: always on
/// point-to-point style links and passive interfaces, otherwise only when
/// this router or the neighbor is DR or BDR.
fn judge_connect(interface: &Interface, ip: Ipv4Addr) -> bool {
    matches!(
        interface.net_type,
        NetType::P2P | NetType::P2MP | NetType::Virtual
    ) || interface.passive
        || interface.is_dr()
        || interface.is_bdr()
        || interface.dr_is(ip)
        || interface.bdr_is(ip)
}

fn restart_inactivity(this: &mut RefNeighbor<'_>) {
    let dead = this.interface.dead_duration();
    let ip = this.ip;
    if let Some(timer) = this.get_neighbor().inactive_timer.take() {
        timer.cancel();
    }
    let timer = timer::schedule(this.interface, dead, TimerKind::Inactivity(ip));
    this.get_neighbor().inactive_timer = Some(timer);
}
