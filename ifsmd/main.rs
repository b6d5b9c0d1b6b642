use std::net::Ipv4Addr;

use tokio::io::{AsyncBufReadExt, BufReader};

use ospf_ifsm::command::{self, RUNTIME};
use ospf_ifsm::config::InterfaceConfig;
use ospf_ifsm::error::Error;
use ospf_ifsm::interface::{AInterface, Interface, InterfaceEvent, NetType, StaticNeighbor};
use ospf_ifsm::log;
use ospf_ifsm::net::LanSegment;
use ospf_ifsm::router;

const MASK_24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

#[tokio::main]
async fn main() -> Result<(), Error> {
    let router_id = Ipv4Addr::new(10, 10, 1, 50);
    RUNTIME.get_or_init(tokio::runtime::Handle::current);

    let lan = LanSegment::new();
    let mut interfaces: Vec<AInterface> = Vec::new();

    let eth0 = InterfaceConfig::new("eth0", Ipv4Addr::new(10, 0, 0, 1), MASK_24);
    let eth0 = Interface::new(router_id, eth0)?;
    lan.attach(&eth0).await;
    interfaces.push(eth0);

    let mut eth1 = InterfaceConfig::new("eth1", Ipv4Addr::new(10, 0, 1, 1), MASK_24);
    eth1.link_type = NetType::P2MP;
    eth1.passive = true;
    interfaces.push(Interface::new(router_id, eth1)?);

    let mut eth2 = InterfaceConfig::new("eth2", Ipv4Addr::new(10, 0, 2, 1), MASK_24);
    eth2.link_type = NetType::NBMA;
    eth2.static_neighbors = vec![
        StaticNeighbor {
            ip_addr: Ipv4Addr::new(10, 0, 2, 2),
            priority: 1,
        },
        StaticNeighbor {
            ip_addr: Ipv4Addr::new(10, 0, 2, 3),
            priority: 0,
        },
    ];
    interfaces.push(Interface::new(router_id, eth2)?);

    for interface in &interfaces {
        interface.clone().interface_up().await;
    }
    router::init(router_id, interfaces);

    log!("ifsmd ready; type ? for help");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        // the console blocks on interface locks, so keep it off the
        // async workers
        let _ = tokio::task::spawn_blocking(move || command::parse_cmd(line)).await;
    }
    Ok(())
}
