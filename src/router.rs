//! Process-wide registry of the local router: its id and its interfaces.
//! Read-only after initialization; the console resolves interfaces here.

use std::net::Ipv4Addr;
use std::sync::OnceLock;

use crate::interface::AInterface;

static ROUTER_ID: OnceLock<Ipv4Addr> = OnceLock::new();
static INTERFACES: OnceLock<Vec<AInterface>> = OnceLock::new();

pub fn init(router_id: Ipv4Addr, interfaces: Vec<AInterface>) {
    ROUTER_ID.get_or_init(|| router_id);
    INTERFACES.get_or_init(|| interfaces);
}

pub fn router_id() -> Ipv4Addr {
    ROUTER_ID.get().copied().unwrap_or(Ipv4Addr::UNSPECIFIED)
}

pub fn interfaces() -> &'static [AInterface] {
    INTERFACES.get().map(Vec::as_slice).unwrap_or(&[])
}

pub async fn interface_by_name(name: &str) -> Option<AInterface> {
    for interface in interfaces() {
        if interface.read().await.name == name {
            return Some(interface.clone());
        }
    }
    None
}
