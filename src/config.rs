use std::net::Ipv4Addr;

use crate::constant::{
    DefaultAckDelay, DefaultHelloInterval, DefaultRouterDeadInterval, DefaultRouterPriority,
};
use crate::error::ConfigError;
use crate::interface::{NetType, StaticNeighbor};

/// Static per-interface parameters, fixed once the interface is created.
/// The link type never changes at runtime.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub name: String,
    pub link_type: NetType,
    pub router_priority: u8,
    /// Seconds between hellos.
    pub hello_interval: u16,
    /// Seconds of silence before a neighbor is declared dead.
    pub dead_interval: u32,
    /// Seconds spent in Waiting; defaults to the dead interval.
    pub wait_timeout: Option<u32>,
    /// Seconds between delayed-acknowledgement flushes.
    pub ack_delay: u16,
    pub ip_addr: Ipv4Addr,
    pub ip_mask: Ipv4Addr,
    pub area_id: Ipv4Addr,
    /// Adjacencies form with every neighbor; no DR/BDR election.
    pub passive: bool,
    /// Required on NBMA links, where neighbors cannot be discovered.
    pub static_neighbors: Vec<StaticNeighbor>,
}

impl InterfaceConfig {
    pub fn new(name: &str, ip_addr: Ipv4Addr, ip_mask: Ipv4Addr) -> Self {
        Self {
            name: name.to_string(),
            link_type: NetType::Broadcast,
            router_priority: DefaultRouterPriority,
            hello_interval: DefaultHelloInterval,
            dead_interval: DefaultRouterDeadInterval,
            wait_timeout: None,
            ack_delay: DefaultAckDelay,
            ip_addr,
            ip_mask,
            area_id: Ipv4Addr::UNSPECIFIED,
            passive: false,
            static_neighbors: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hello_interval == 0 {
            return Err(ConfigError::ZeroHelloInterval(self.name.clone()));
        }
        if self.dead_interval <= self.hello_interval as u32 {
            return Err(ConfigError::BadDeadInterval(self.name.clone()));
        }
        if self.wait_timeout == Some(0) {
            return Err(ConfigError::ZeroWaitTimeout(self.name.clone()));
        }
        if self.ack_delay == 0 {
            return Err(ConfigError::ZeroAckDelay(self.name.clone()));
        }
        if self.link_type == NetType::NBMA && self.static_neighbors.is_empty() {
            return Err(ConfigError::MissingNbmaNeighbors(self.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn base() -> InterfaceConfig {
        InterfaceConfig::new(
            "eth0",
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(255, 255, 255, 0),
        )
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(base().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_hello_interval() {
        let mut config = base();
        config.hello_interval = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroHelloInterval("eth0".into()))
        );
    }

    #[test]
    fn rejects_dead_interval_not_exceeding_hello() {
        let mut config = base();
        config.dead_interval = config.hello_interval as u32;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BadDeadInterval("eth0".into()))
        );
    }

    #[test]
    fn rejects_zero_wait_timeout_and_ack_delay() {
        let mut config = base();
        config.wait_timeout = Some(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroWaitTimeout("eth0".into()))
        );

        let mut config = base();
        config.ack_delay = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroAckDelay("eth0".into()))
        );
    }

    #[test]
    fn rejects_nbma_without_neighbors() {
        let mut config = base();
        config.link_type = NetType::NBMA;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingNbmaNeighbors("eth0".into()))
        );
    }
}
