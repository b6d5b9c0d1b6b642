//! Timer plumbing. Timers are spawned sleeps that re-enter the FSM as
//! ordinary events, so all event processing stays serialized behind the
//! interface lock. Each callback carries the timer generation current at
//! scheduling time; `Interface::reset` bumps the generation, which turns any
//! callback that already escaped cancellation into a no-op.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::guard;
use crate::hello;
use crate::interface::{AInterface, Interface, InterfaceEvent};
use crate::neighbor::{NeighborEvent, NeighborState, RefNeighbor};

#[cfg(debug_assertions)]
use crate::log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Hello,
    Wait,
    Ack,
    Inactivity(Ipv4Addr),
}

#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
    duration: Duration,
}

impl TimerHandle {
    /// The duration this timer was armed with.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(crate) fn schedule(interface: &Interface, duration: Duration, kind: TimerKind) -> TimerHandle {
    let me = interface.me.clone();
    let gen = interface.timer_gen;
    let task = tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        guard!(Some(interface) = me.upgrade());
        fire(interface, gen, kind).await;
    });
    TimerHandle { task, duration }
}

async fn fire(interface: AInterface, gen: u64, kind: TimerKind) {
    {
        let iface = interface.read().await;
        if iface.timer_gen != gen {
            return; // cancelled while the callback was in flight
        }
    }
    match kind {
        TimerKind::Wait => interface.wait_timer().await,
        TimerKind::Hello => hello::hello_tick(interface).await,
        TimerKind::Ack => ack_tick(interface, gen).await,
        TimerKind::Inactivity(ip) => inactivity_tick(interface, gen, ip).await,
    }
}

/// Flush acknowledgements queued since the last tick, then re-arm.
async fn ack_tick(interface: AInterface, gen: u64) {
    let mut iface = interface.write().await;
    if iface.timer_gen != gen {
        return;
    }
    let acks = std::mem::take(&mut iface.delayed_acks);
    #[cfg(debug_assertions)]
    if !acks.is_empty() {
        log!(
            "interface {}: flushing {} delayed acks",
            iface.name,
            acks.len()
        );
    }
    drop(acks);
    let timer = schedule(&iface, iface.ack_duration(), TimerKind::Ack);
    iface.ack_timer = Some(timer);
}

/// A neighbor went silent for a full dead interval. Tear it down, and if it
/// was bidirectional, let the interface FSM reconsider the election.
async fn inactivity_tick(interface: AInterface, gen: u64, ip: Ipv4Addr) {
    let was_2way;
    {
        let mut iface = interface.write().await;
        if iface.timer_gen != gen {
            return;
        }
        guard!(Some(nbr) = iface.neighbors.get(&ip));
        was_2way = nbr.state >= NeighborState::TwoWay;
        if let Some(mut nbr) = RefNeighbor::from(&mut iface, ip) {
            nbr.inactivity_timer();
        }
        iface.shrink_neighbors();
    }
    if was_2way {
        interface.neighbor_change().await;
    }
}
