use std::net::Ipv4Addr;

use super::{AInterface, Interface, NetType};
use crate::election::{self, Candidate, Role};
use crate::hello;
use crate::neighbor::{NeighborEvent, RefNeighbor};
use crate::timer::{self, TimerKind};
use crate::{log_success, must};

#[cfg(debug_assertions)]
use crate::log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceState {
    Down,
    Loopback,
    Waiting,
    PointToPoint,
    DROther,
    Backup,
    DR,
}

// helper trait for event handling
pub trait InterfaceEvent: Send {
    async fn interface_up(self);
    async fn wait_timer(self);
    async fn backup_seen(self);
    async fn neighbor_change(self);
    async fn loop_ind(self);
    async fn unloop_ind(self);
    async fn interface_down(self);
}

#[cfg(debug_assertions)]
fn log_event(event: &str, interface: &Interface) {
    log!(
        "interface {}({:?}) recv event: {}",
        interface.name,
        interface.state,
        event
    );
}

/// Transitions not in this table are FSM bugs, caught in debug builds.
fn transition_allowed(old: InterfaceState, new: InterfaceState) -> bool {
    use InterfaceState::*;
    match new {
        // teardown is reachable from everywhere
        Down | Loopback => true,
        _ => match old {
            Down => matches!(new, PointToPoint | DROther | Waiting),
            Waiting | DROther | Backup | DR => matches!(new, DROther | Backup | DR),
            Loopback | PointToPoint => false,
        },
    }
}

/// The state switch itself. Side effects (timers, neighbor notification)
/// stay in the event handlers; a same-state outcome is a no-op, not a
/// re-entry.
fn change_state(interface: &mut Interface, new: InterfaceState) {
    let old = interface.state;
    if old == new {
        return;
    }
    debug_assert!(
        transition_allowed(old, new),
        "illegal interface transition {old:?} -> {new:?}"
    );
    interface.state = new;
    log_success!(
        "interface {}'s state changed: {:?} -> {:?}",
        interface.name,
        old,
        new
    );
}

impl InterfaceEvent for AInterface {
    async fn interface_up(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("interface_up", &interface);
        must!(interface.state == InterfaceState::Down);

        hello::start_hello_timer(&mut interface, true);
        let ack = timer::schedule(&interface, interface.ack_duration(), TimerKind::Ack);
        interface.ack_timer = Some(ack);

        match interface.net_type {
            NetType::P2P | NetType::P2MP | NetType::Virtual => {
                change_state(&mut interface, InterfaceState::PointToPoint);
            }
            NetType::Broadcast | NetType::NBMA => {
                if interface.router_priority == 0 {
                    change_state(&mut interface, InterfaceState::DROther);
                } else {
                    change_state(&mut interface, InterfaceState::Waiting);
                    let wait =
                        timer::schedule(&interface, interface.wait_duration(), TimerKind::Wait);
                    interface.wait_timer = Some(wait);
                    if interface.net_type == NetType::NBMA {
                        // actively probe every configured neighbor that could
                        // become DR
                        let probes: Vec<Ipv4Addr> = interface
                            .neighbors
                            .iter()
                            .filter(|(_, n)| n.priority > 0)
                            .map(|(ip, _)| *ip)
                            .collect();
                        for ip in probes {
                            if let Some(mut nbr) = RefNeighbor::from(&mut interface, ip) {
                                nbr.start();
                            }
                        }
                    }
                }
            }
        }
    }

    async fn wait_timer(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("wait_timer", &interface);
        must!(interface.state == InterfaceState::Waiting);
        interface.wait_timer = None;
        settle(&mut interface);
    }

    async fn backup_seen(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("backup_seen", &interface);
        must!(interface.state == InterfaceState::Waiting);
        if let Some(timer) = interface.wait_timer.take() {
            timer.cancel();
        }
        settle(&mut interface);
    }

    async fn neighbor_change(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("neighbor_change", &interface);
        must!(matches!(
            interface.state,
            InterfaceState::DROther | InterfaceState::Backup | InterfaceState::DR
        ));
        // settled passive interfaces never re-elect
        must!(!interface.passive);
        select_dr(&mut interface);
    }

    async fn loop_ind(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("loop_ind", &interface);
        must!(interface.state != InterfaceState::Loopback);
        interface.reset();
        change_state(&mut interface, InterfaceState::Loopback);
    }

    async fn unloop_ind(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("unloop_ind", &interface);
        must!(interface.state == InterfaceState::Loopback);
        change_state(&mut interface, InterfaceState::Down);
    }

    async fn interface_down(self) {
        let mut interface = self.write().await;
        #[cfg(debug_assertions)]
        log_event("interface_down", &interface);
        must!(interface.state != InterfaceState::Down);
        interface.reset();
        change_state(&mut interface, InterfaceState::Down);
    }
}

/// Leaves Waiting for a settled state. Passive interfaces skip the election
/// entirely and report a fixed role; everyone else elects.
fn settle(interface: &mut Interface) {
    if interface.passive {
        change_state(interface, InterfaceState::DROther);
        let adj: Vec<Ipv4Addr> = two_way_neighbors(interface);
        for ip in adj {
            if let Some(mut nbr) = RefNeighbor::from(interface, ip) {
                nbr.adj_ok();
            }
        }
    } else {
        select_dr(interface);
    }
}

fn two_way_neighbors(interface: &Interface) -> Vec<Ipv4Addr> {
    interface
        .neighbors
        .iter()
        .filter(|(_, n)| n.is_2way())
        .map(|(ip, _)| *ip)
        .collect()
}

/// Runs the election engine against the current neighbor snapshot and
/// applies the outcome: DR/BDR view, interface state, NBMA probing of
/// ineligible neighbors, and `AdjOk` re-evaluation when the DR or BDR
/// changed.
pub(crate) fn select_dr(interface: &mut Interface) {
    let local = Candidate {
        router_id: interface.router_id,
        addr: interface.ip_addr,
        priority: interface.router_priority,
        declared_dr: interface.dr.map(|id| id.addr),
        declared_bdr: interface.bdr.map(|id| id.addr),
    };
    let snapshot: Vec<Candidate> = interface
        .neighbors
        .values()
        .filter(|n| n.is_2way())
        .map(|n| Candidate {
            router_id: n.router_id,
            addr: n.ip_addr,
            priority: n.priority,
            declared_dr: n.dr,
            declared_bdr: n.bdr,
        })
        .collect();
    let outcome = election::elect(&local, &snapshot);

    let old_dr = interface.dr;
    let old_bdr = interface.bdr;
    let old_state = interface.state;
    interface.dr = outcome.dr;
    interface.bdr = outcome.bdr;
    change_state(
        interface,
        match outcome.role {
            Role::Dr => InterfaceState::DR,
            Role::Backup => InterfaceState::Backup,
            Role::DrOther => InterfaceState::DROther,
        },
    );

    // NBMA: a router that just became DR or BDR starts sending hellos to the
    // neighbors that cannot be elected themselves.
    if interface.net_type == NetType::NBMA
        && matches!(interface.state, InterfaceState::DR | InterfaceState::Backup)
        && !matches!(old_state, InterfaceState::DR | InterfaceState::Backup)
    {
        let probes: Vec<Ipv4Addr> = interface
            .neighbors
            .iter()
            .filter(|(_, n)| n.priority == 0)
            .map(|(ip, _)| *ip)
            .collect();
        for ip in probes {
            if let Some(mut nbr) = RefNeighbor::from(interface, ip) {
                nbr.start();
            }
        }
    }

    if interface.dr != old_dr || interface.bdr != old_bdr {
        for ip in two_way_neighbors(interface) {
            if let Some(mut nbr) = RefNeighbor::from(interface, ip) {
                nbr.adj_ok();
            }
        }
    }
}
