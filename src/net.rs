//! In-memory multi-access link. Stands where the raw-socket transmit and
//! capture paths would in a deployed daemon: every interface attached to a
//! [`LanSegment`] sees every other interface's hellos.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::guard;
use crate::hello::{self, HelloView};
use crate::interface::AInterface;

const SEGMENT_DEPTH: usize = 64;

pub struct LanSegment {
    tx: broadcast::Sender<HelloView>,
}

/// An interface's transmit handle onto its segment.
#[derive(Clone)]
pub struct LanHandle {
    tx: broadcast::Sender<HelloView>,
}

impl LanHandle {
    pub fn send(&self, packet: HelloView) {
        // nobody else attached yet is fine
        let _ = self.tx.send(packet);
    }
}

impl LanSegment {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SEGMENT_DEPTH);
        Self { tx }
    }

    /// Attaches an interface: it gains a transmit handle and a receive task
    /// that feeds hellos into its FSM. The task exits when the interface is
    /// dropped.
    pub async fn attach(&self, interface: &AInterface) {
        let me = Arc::downgrade(interface);
        let mut iface = interface.write().await;
        let addr = iface.ip_addr;
        iface.link = Some(LanHandle {
            tx: self.tx.clone(),
        });
        drop(iface);

        let mut rx = self.tx.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(packet) => {
                        if packet.src_addr == addr {
                            continue;
                        }
                        guard!(Some(interface) = me.upgrade());
                        hello::receive_hello(interface, packet).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

impl Default for LanSegment {
    fn default() -> Self {
        Self::new()
    }
}
