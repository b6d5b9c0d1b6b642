//! Hello processing, on both sides of the wire-format boundary: packet
//! encoding and decoding belong to another subsystem, so hellos enter and
//! leave this one as already-decoded [`HelloView`]s.

use std::net::Ipv4Addr;

use rand::Rng;

use crate::constant::{HelloStartupDelayMax, HelloStartupDelayMin};
use crate::interface::{AInterface, Interface, InterfaceEvent, InterfaceState, NetType};
use crate::neighbor::{Neighbor, NeighborEvent, NeighborState, RefNeighbor};
use crate::timer::{self, TimerKind};
use crate::{log_warning, must};

/// One hello as this subsystem sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloView {
    pub router_id: Ipv4Addr,
    pub src_addr: Ipv4Addr,
    pub network_mask: Ipv4Addr,
    pub area_id: Ipv4Addr,
    pub hello_interval: u16,
    pub dead_interval: u32,
    pub priority: u8,
    pub dr: Option<Ipv4Addr>,
    pub bdr: Option<Ipv4Addr>,
    /// Router-ids this sender has recently heard from.
    pub neighbors: Vec<Ipv4Addr>,
}

/// What this interface currently advertises.
pub fn build_hello(interface: &Interface) -> HelloView {
    HelloView {
        router_id: interface.router_id,
        src_addr: interface.ip_addr,
        network_mask: interface.ip_mask,
        area_id: interface.area_id,
        hello_interval: interface.hello_interval,
        dead_interval: interface.dead_interval,
        priority: interface.router_priority,
        dr: interface.dr.map(|id| id.addr),
        bdr: interface.bdr.map(|id| id.addr),
        neighbors: interface
            .neighbors
            .values()
            .filter(|n| n.state >= NeighborState::Init)
            .map(|n| n.router_id)
            .collect(),
    }
}

pub(crate) fn start_hello_timer(interface: &mut Interface, first: bool) {
    let delay = if first {
        // deviation avoids synchronized bursts when many interfaces come up
        // together
        rand::thread_rng().gen_range(HelloStartupDelayMin..=HelloStartupDelayMax)
    } else {
        interface.hello_duration()
    };
    let timer = timer::schedule(interface, delay, TimerKind::Hello);
    interface.hello_timer = Some(timer);
}

/// Hello timer fired: advertise and re-arm.
pub(crate) async fn hello_tick(interface: AInterface) {
    let mut iface = interface.write().await;
    must!(!matches!(
        iface.state,
        InterfaceState::Down | InterfaceState::Loopback
    ));
    start_hello_timer(&mut iface, false);
    let packet = build_hello(&iface);
    let link = iface.link.clone();
    drop(iface);
    if let Some(link) = link {
        link.send(packet);
    }
}

/// A hello arrived. Updates the neighbor record, drives the neighbor FSM,
/// and raises `BackupSeen`/`NeighborChange` on the interface FSM where the
/// protocol calls for them. Parameter mismatches are logged drops, not
/// errors.
pub async fn receive_hello(interface: AInterface, pkt: HelloView) {
    let backup_seen;
    let nbr_change;
    {
        let mut iface = interface.write().await;
        must!(!matches!(
            iface.state,
            InterfaceState::Down | InterfaceState::Loopback
        ));
        must!(pkt.src_addr != iface.ip_addr);
        if pkt.area_id != iface.area_id {
            log_warning!(
                "interface {}: hello from {} for foreign area {}",
                iface.name,
                pkt.src_addr,
                pkt.area_id
            );
            return;
        }
        if matches!(iface.net_type, NetType::Broadcast | NetType::NBMA)
            && pkt.network_mask != iface.ip_mask
        {
            log_warning!(
                "interface {}: hello from {} with mask {} (expected {})",
                iface.name,
                pkt.src_addr,
                pkt.network_mask,
                iface.ip_mask
            );
            return;
        }
        if pkt.hello_interval != iface.hello_interval || pkt.dead_interval != iface.dead_interval {
            log_warning!(
                "interface {}: hello from {} with mismatched intervals ({}/{})",
                iface.name,
                pkt.src_addr,
                pkt.hello_interval,
                pkt.dead_interval
            );
            return;
        }

        let ip = pkt.src_addr;
        // snapshot before the update so declaration changes are visible;
        // an unseen neighbor gets the advertised priority so its creation
        // alone does not read as a priority change
        let was = iface
            .neighbors
            .get(&ip)
            .map(|n| (n.is_2way(), n.priority, n.claims_dr(), n.claims_bdr()))
            .unwrap_or((false, pkt.priority, false, false));
        iface
            .neighbors
            .entry(ip)
            .or_insert_with(|| Neighbor::new(pkt.router_id, ip))
            .router_id = pkt.router_id;

        RefNeighbor::from(&mut iface, ip).unwrap().hello_receive();
        let me = iface.router_id;
        if pkt.neighbors.contains(&me) {
            RefNeighbor::from(&mut iface, ip).unwrap().two_way_received();
        } else {
            RefNeighbor::from(&mut iface, ip).unwrap().one_way_received();
        }

        let nbr = iface.neighbors.get_mut(&ip).unwrap();
        nbr.priority = pkt.priority;
        nbr.dr = pkt.dr;
        nbr.bdr = pkt.bdr;

        let nbr = &iface.neighbors[&ip];
        let now_2way = nbr.is_2way();
        let claims_dr = nbr.claims_dr();
        let claims_bdr = nbr.claims_bdr();
        backup_seen = iface.state == InterfaceState::Waiting
            && now_2way
            && (claims_bdr || (claims_dr && pkt.bdr.is_none()));
        nbr_change = (was.0 != now_2way)
            || (now_2way && was.1 != pkt.priority)
            || (now_2way && (was.2 != claims_dr || was.3 != claims_bdr));
    }
    if backup_seen {
        interface.backup_seen().await;
    } else if nbr_change {
        interface.neighbor_change().await;
    }
}
