mod state;
pub use state::*;

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::InterfaceConfig;
use crate::election::DrId;
use crate::error::ConfigError;
use crate::neighbor::{Neighbor, NeighborState};
use crate::net::LanHandle;
use crate::timer::TimerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetType {
    P2P,
    Broadcast,
    NBMA,
    P2MP,
    Virtual,
}

/// What this interface currently is on its attached network, as reported to
/// operators. Passive interfaces collapse the elected roles into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRole {
    Down,
    Loopback,
    Waiting,
    PointToPoint,
    Passive,
    DrOther,
    Backup,
    Dr,
}

pub struct Interface {
    pub me: WInterface,
    pub name: String,
    pub router_id: Ipv4Addr,
    pub net_type: NetType,
    pub passive: bool,
    pub state: InterfaceState,
    pub ip_addr: Ipv4Addr,
    pub ip_mask: Ipv4Addr,
    pub area_id: Ipv4Addr,
    pub router_priority: u8,
    pub hello_interval: u16,
    pub dead_interval: u32,
    pub wait_timeout: u32,
    pub ack_delay: u16,
    pub hello_timer: Option<TimerHandle>,
    pub wait_timer: Option<TimerHandle>,
    pub ack_timer: Option<TimerHandle>,
    /// Bumped on every reset; timers capture the value at scheduling time so
    /// a callback that outlives its cancellation is filtered out.
    pub timer_gen: u64,
    #[doc = "interface address -> neighbor"]
    pub neighbors: BTreeMap<Ipv4Addr, Neighbor>,
    /// NBMA only: neighbors that must be probed explicitly.
    pub static_neighbors: Vec<StaticNeighbor>,
    pub dr: Option<DrId>,
    pub bdr: Option<DrId>,
    /// Acknowledgements queued by the flooding engine, flushed on the ack
    /// timer. Flooding itself lives outside this subsystem.
    pub delayed_acks: Vec<Ipv4Addr>,
    pub link: Option<LanHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticNeighbor {
    pub ip_addr: Ipv4Addr,
    pub priority: u8,
}

pub type AInterface = Arc<RwLock<Interface>>;
pub type WInterface = Weak<RwLock<Interface>>;

impl Interface {
    pub fn new(router_id: Ipv4Addr, config: InterfaceConfig) -> Result<AInterface, ConfigError> {
        config.validate()?;
        let mut neighbors = BTreeMap::new();
        for snbr in &config.static_neighbors {
            let mut nbr = Neighbor::new(Ipv4Addr::UNSPECIFIED, snbr.ip_addr);
            nbr.priority = snbr.priority;
            neighbors.insert(snbr.ip_addr, nbr);
        }
        Ok(Arc::new_cyclic(|me| {
            RwLock::new(Self {
                me: me.clone(),
                name: config.name,
                router_id,
                net_type: config.link_type,
                passive: config.passive,
                state: InterfaceState::Down,
                ip_addr: config.ip_addr,
                ip_mask: config.ip_mask,
                area_id: config.area_id,
                router_priority: config.router_priority,
                hello_interval: config.hello_interval,
                dead_interval: config.dead_interval,
                wait_timeout: config.wait_timeout.unwrap_or(config.dead_interval),
                ack_delay: config.ack_delay,
                hello_timer: None,
                wait_timer: None,
                ack_timer: None,
                timer_gen: 0,
                neighbors,
                static_neighbors: config.static_neighbors,
                dr: None,
                bdr: None,
                delayed_acks: Vec::new(),
                link: None,
            })
        }))
    }

    pub fn hello_duration(&self) -> Duration {
        Duration::from_secs(self.hello_interval as u64)
    }

    pub fn dead_duration(&self) -> Duration {
        Duration::from_secs(self.dead_interval as u64)
    }

    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait_timeout as u64)
    }

    pub fn ack_duration(&self) -> Duration {
        Duration::from_secs(self.ack_delay as u64)
    }

    pub fn is_dr(&self) -> bool {
        self.dr.map(|id| id.addr) == Some(self.ip_addr)
    }

    pub fn is_bdr(&self) -> bool {
        self.bdr.map(|id| id.addr) == Some(self.ip_addr)
    }

    pub fn is_drother(&self) -> bool {
        !self.is_dr() && !self.is_bdr()
    }

    pub fn dr_is(&self, ip: Ipv4Addr) -> bool {
        self.dr.map(|id| id.addr) == Some(ip)
    }

    pub fn bdr_is(&self, ip: Ipv4Addr) -> bool {
        self.bdr.map(|id| id.addr) == Some(ip)
    }

    pub fn role(&self) -> InterfaceRole {
        match self.state {
            InterfaceState::Down => InterfaceRole::Down,
            InterfaceState::Loopback => InterfaceRole::Loopback,
            InterfaceState::Waiting => InterfaceRole::Waiting,
            InterfaceState::PointToPoint => InterfaceRole::PointToPoint,
            _ if self.passive => InterfaceRole::Passive,
            InterfaceState::DROther => InterfaceRole::DrOther,
            InterfaceState::Backup => InterfaceRole::Backup,
            InterfaceState::DR => InterfaceRole::Dr,
        }
    }

    /// Entry point for the flooding engine: queue an acknowledgement for the
    /// next ack-timer flush.
    pub fn queue_delayed_ack(&mut self, dst: Ipv4Addr) {
        self.delayed_acks.push(dst);
    }

    pub fn shrink_neighbors(&mut self) {
        self.neighbors
            .retain(|_, n| n.state != NeighborState::Down);
    }

    /// Full teardown on entry to Down or Loopback: no timer may fire into
    /// the cleared state, every neighbor FSM gets its teardown event, the
    /// DR/BDR view is dropped.
    pub fn reset(&mut self) {
        self.timer_gen += 1;
        if let Some(timer) = self.hello_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.wait_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.ack_timer.take() {
            timer.cancel();
        }
        let ips: Vec<Ipv4Addr> = self.neighbors.keys().copied().collect();
        for ip in ips {
            use crate::neighbor::{NeighborEvent, RefNeighbor};
            if let Some(mut nbr) = RefNeighbor::from(self, ip) {
                nbr.kill_nbr();
            }
        }
        self.neighbors.clear();
        self.dr = None;
        self.bdr = None;
        self.delayed_acks.clear();
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}) area {} type {:?} state {:?} role {:?} dr {} bdr {}",
            self.name,
            self.ip_addr,
            self.ip_mask,
            self.area_id,
            self.net_type,
            self.state,
            self.role(),
            self.dr.map_or("none".to_string(), |id| id.addr.to_string()),
            self.bdr.map_or("none".to_string(), |id| id.addr.to_string()),
        )
    }
}
