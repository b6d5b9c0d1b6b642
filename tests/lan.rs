//! End-to-end convergence on an in-memory broadcast segment, with virtual
//! time: hellos establish 2-Way, wait timers expire, and every router ends
//! up agreeing on the same DR and BDR.

use std::net::Ipv4Addr;
use std::time::Duration;

use ospf_ifsm::config::InterfaceConfig;
use ospf_ifsm::interface::{AInterface, Interface, InterfaceEvent, InterfaceState};
use ospf_ifsm::net::LanSegment;

const MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

async fn router(lan: &LanSegment, octet: u8, priority: u8) -> AInterface {
    let mut config = InterfaceConfig::new("eth0", Ipv4Addr::new(10, 0, 0, octet), MASK);
    config.router_priority = priority;
    let interface = Interface::new(Ipv4Addr::new(1, 1, 1, octet), config).unwrap();
    lan.attach(&interface).await;
    interface
}

#[tokio::test(start_paused = true)]
async fn three_routers_converge_on_highest_priority_dr() {
    let lan = LanSegment::new();
    let r1 = router(&lan, 1, 1).await;
    let r2 = router(&lan, 2, 2).await;
    let r3 = router(&lan, 3, 0).await;

    for interface in [&r1, &r2, &r3] {
        interface.clone().interface_up().await;
    }

    // enough virtual time for hellos, wait timers, and the follow-up
    // elections
    tokio::time::sleep(Duration::from_secs(120)).await;

    let dr_addr = Ipv4Addr::new(10, 0, 0, 2);
    let bdr_addr = Ipv4Addr::new(10, 0, 0, 1);
    for interface in [&r1, &r2, &r3] {
        let iface = interface.read().await;
        assert_eq!(iface.dr.map(|id| id.addr), Some(dr_addr), "{}", iface);
        assert_eq!(iface.bdr.map(|id| id.addr), Some(bdr_addr), "{}", iface);
    }
    assert_eq!(r1.read().await.state, InterfaceState::Backup);
    assert_eq!(r2.read().await.state, InterfaceState::DR);
    assert_eq!(r3.read().await.state, InterfaceState::DROther);
}

#[tokio::test(start_paused = true)]
async fn silent_neighbor_is_torn_down_and_replaced() {
    let lan = LanSegment::new();
    let r1 = router(&lan, 1, 1).await;
    let r2 = router(&lan, 2, 2).await;

    r1.clone().interface_up().await;
    r2.clone().interface_up().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(r1.read().await.state, InterfaceState::Backup);
    assert_eq!(r2.read().await.state, InterfaceState::DR);

    // the DR goes away; its hellos stop and the dead interval runs out
    r2.clone().interface_down().await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    let iface = r1.read().await;
    assert_eq!(iface.state, InterfaceState::DR);
    assert_eq!(iface.dr.map(|id| id.addr), Some(Ipv4Addr::new(10, 0, 0, 1)));
    assert!(iface.neighbors.is_empty());
}
