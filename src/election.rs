//! DR/BDR election (RFC 2328 section 9.4) as a pure computation over a
//! snapshot of the attached network. The FSM applies the outcome; nothing
//! here touches interface state or re-enters the dispatcher.

use std::net::Ipv4Addr;

/// Identifies an elected router: its router-id plus the address of its
/// interface on the network the election ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DrId {
    pub router_id: Ipv4Addr,
    pub addr: Ipv4Addr,
}

/// One eligible router as seen in the latest hello exchange. Declared DR/BDR
/// are interface addresses, as hellos carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub router_id: Ipv4Addr,
    pub addr: Ipv4Addr,
    pub priority: u8,
    pub declared_dr: Option<Ipv4Addr>,
    pub declared_bdr: Option<Ipv4Addr>,
}

impl Candidate {
    fn id(&self) -> DrId {
        DrId {
            router_id: self.router_id,
            addr: self.addr,
        }
    }

    fn claims_dr(&self) -> bool {
        self.declared_dr == Some(self.addr)
    }

    fn claims_bdr(&self) -> bool {
        self.declared_bdr == Some(self.addr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Dr,
    Backup,
    DrOther,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub dr: Option<DrId>,
    pub bdr: Option<DrId>,
    pub role: Role,
}

/// Runs the election. `local` is this router's candidacy carrying its current
/// DR/BDR view as its declaration; `neighbors` must already be restricted to
/// bidirectional neighbors. Routers with priority 0 never win.
///
/// If the first pass changes the local router's own standing, the election is
/// repeated exactly once with the updated self-declaration, as the protocol
/// prescribes. The second pass is final either way.
pub fn elect(local: &Candidate, neighbors: &[Candidate]) -> Outcome {
    let (dr, bdr) = run_pass(local, neighbors);

    let me = local.addr;
    let old_dr = local.declared_dr;
    let old_bdr = local.declared_bdr;
    let new_dr = dr.map(|id| id.addr);
    let new_bdr = bdr.map(|id| id.addr);
    let self_changed = ((new_dr == Some(me) || old_dr == Some(me)) && new_dr != old_dr)
        || ((new_bdr == Some(me) || old_bdr == Some(me)) && new_bdr != old_bdr);

    let (dr, bdr) = if self_changed {
        let rerun = Candidate {
            declared_dr: new_dr,
            declared_bdr: new_bdr,
            ..*local
        };
        run_pass(&rerun, neighbors)
    } else {
        (dr, bdr)
    };

    let role = if dr.map(|id| id.addr) == Some(me) {
        Role::Dr
    } else if bdr.map(|id| id.addr) == Some(me) {
        Role::Backup
    } else {
        Role::DrOther
    };
    Outcome { dr, bdr, role }
}

fn run_pass(local: &Candidate, neighbors: &[Candidate]) -> (Option<DrId>, Option<DrId>) {
    let eligible = || {
        std::iter::once(local)
            .chain(neighbors.iter())
            .filter(|c| c.priority > 0)
    };

    // BDR first: routers declaring themselves DR are excluded; those
    // declaring themselves BDR take precedence over the rest. Ties break on
    // router-id, which is unique, so the order is total.
    let bdr = eligible()
        .filter(|c| !c.claims_dr())
        .filter(|c| c.claims_bdr())
        .max_by_key(|c| (c.priority, c.router_id))
        .or_else(|| {
            eligible()
                .filter(|c| !c.claims_dr())
                .max_by_key(|c| (c.priority, c.router_id))
        })
        .map(|c| c.id());

    // DR: the best self-declared DR, or the fresh BDR promoted.
    let dr = eligible()
        .filter(|c| c.claims_dr())
        .max_by_key(|c| (c.priority, c.router_id))
        .map(|c| c.id())
        .or(bdr);

    (dr, bdr)
}

#[cfg(test)]
mod test {
    use super::*;

    fn cand(
        id: u8,
        priority: u8,
        declared_dr: Option<u8>,
        declared_bdr: Option<u8>,
    ) -> Candidate {
        Candidate {
            router_id: Ipv4Addr::new(1, 1, 1, id),
            addr: Ipv4Addr::new(10, 0, 0, id),
            priority,
            declared_dr: declared_dr.map(|d| Ipv4Addr::new(10, 0, 0, d)),
            declared_bdr: declared_bdr.map(|d| Ipv4Addr::new(10, 0, 0, d)),
        }
    }

    fn addr(id: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, id)
    }

    #[test]
    fn lone_router_becomes_dr_without_backup() {
        let local = cand(1, 1, None, None);
        let out = elect(&local, &[]);
        assert_eq!(out.role, Role::Dr);
        assert_eq!(out.dr.unwrap().addr, addr(1));
        assert_eq!(out.bdr, None);
    }

    #[test]
    fn priority_zero_never_elected() {
        let local = cand(1, 0, None, None);
        let nbrs = [cand(2, 0, None, None), cand(3, 1, None, None)];
        let out = elect(&local, &nbrs);
        assert_eq!(out.role, Role::DrOther);
        assert_eq!(out.dr.unwrap().addr, addr(3));
        assert!(out.bdr.map_or(true, |b| b.addr != addr(1) && b.addr != addr(2)));

        // All candidates ineligible: nobody is elected.
        let out = elect(&cand(1, 0, None, None), &[cand(2, 0, None, None)]);
        assert_eq!(out.dr, None);
        assert_eq!(out.bdr, None);
        assert_eq!(out.role, Role::DrOther);
    }

    #[test]
    fn declared_dr_wins_over_higher_priority() {
        // A settled DR keeps the role even against a higher-priority router
        // that does not claim it.
        let local = cand(1, 10, None, None);
        let nbrs = [cand(2, 1, Some(2), None)];
        let out = elect(&local, &nbrs);
        assert_eq!(out.dr.unwrap().addr, addr(2));
        // The local router becomes BDR on the second pass.
        assert_eq!(out.bdr.unwrap().addr, addr(1));
        assert_eq!(out.role, Role::Backup);
    }

    #[test]
    fn tie_breaks_on_router_id() {
        let local = cand(1, 1, None, None);
        let nbrs = [cand(9, 1, None, None), cand(5, 1, None, None)];
        let out = elect(&local, &nbrs);
        assert_eq!(out.dr.unwrap().addr, addr(9));
    }

    #[test]
    fn deterministic_under_iteration_order() {
        let local = cand(1, 1, None, None);
        let mut nbrs = vec![
            cand(2, 3, Some(2), None),
            cand(3, 3, None, Some(3)),
            cand(4, 7, None, None),
            cand(5, 1, Some(5), Some(5)),
        ];
        let forward = elect(&local, &nbrs);
        nbrs.reverse();
        let backward = elect(&local, &nbrs);
        assert_eq!(forward, backward);
    }

    #[test]
    fn rerun_converges_in_one_extra_pass() {
        // Feeding the first outcome back as the local declaration must give
        // the same answer: the one-extra-pass rule is a fixed point here.
        let local = cand(1, 5, None, None);
        let nbrs = [cand(2, 3, None, Some(2)), cand(3, 1, None, None)];
        let first = elect(&local, &nbrs);
        let settled = Candidate {
            declared_dr: first.dr.map(|id| id.addr),
            declared_bdr: first.bdr.map(|id| id.addr),
            ..local
        };
        let second = elect(&settled, &nbrs);
        assert_eq!(first.dr, second.dr);
        assert_eq!(first.bdr, second.bdr);
        assert_eq!(first.role, second.role);
    }

    #[test]
    fn self_declared_bdr_promoted_when_nobody_claims_dr() {
        let local = cand(1, 1, None, Some(1));
        let nbrs = [cand(2, 9, None, None)];
        let out = elect(&local, &nbrs);
        // Neighbor 2 claims nothing: the declared BDR wins the backup role
        // despite the lower priority, gets promoted to DR, and the rerun
        // hands the vacated backup role to the neighbor.
        assert_eq!(out.dr.unwrap().addr, addr(1));
        assert_eq!(out.bdr.unwrap().addr, addr(2));
        assert_eq!(out.role, Role::Dr);
    }

    #[test]
    fn dr_takeover_by_claiming_neighbor() {
        // Scenario from the interface FSM: we are DR, a priority-2 neighbor
        // now claims DR for itself.
        let local = cand(1, 1, Some(1), None);
        let nbrs = [cand(2, 2, Some(2), None)];
        let out = elect(&local, &nbrs);
        assert_eq!(out.dr.unwrap().addr, addr(2));
        assert_eq!(out.role, Role::Backup);
    }
}
