//! Integration test: multi-router convergence over the in-memory network.
//!
//! Triangle topology used throughout:
//!
//! ```text
//!   A 10.0.0.0/24 --3-- B 10.0.1.0/24 --2-- C 10.0.2.0/23
//!    \_____________________10_____________________/
//! ```

use std::sync::Arc;

use dvr_integration_tests::{LoopbackNetwork, LoopbackRouter};
use dvr_routing::{Destination, NextHop, PeerAddr, RouteEntry};

const A: &str = "127.0.0.1:5000";
const B: &str = "127.0.0.1:5001";
const C: &str = "127.0.0.1:5002";

fn peer(s: &str) -> PeerAddr {
    PeerAddr::new(s).unwrap()
}

fn dest(s: &str) -> Destination {
    Destination::parse(s).unwrap()
}

fn triangle() -> (
    Arc<LoopbackNetwork>,
    Arc<LoopbackRouter>,
    Arc<LoopbackRouter>,
    Arc<LoopbackRouter>,
) {
    let net = LoopbackNetwork::new();
    let a = net.add_router(A, "10.0.0.0/24", &[(B, 3), (C, 10)]);
    let b = net.add_router(B, "10.0.1.0/24", &[(A, 3), (C, 2)]);
    let c = net.add_router(C, "10.0.2.0/23", &[(A, 10), (B, 2)]);
    (net, a, b, c)
}

// =========================================================================
// Shortest paths
// =========================================================================

#[tokio::test]
async fn test_triangle_prefers_cheaper_two_hop_path() {
    let (net, a, b, c) = triangle();
    net.rounds(4).await;

    let a_table = a.routing_table();
    assert_eq!(
        a_table.get(&dest("10.0.2.0/23")),
        Some(&RouteEntry::via(5, peer(B))),
        "A must reach C's network through B at 3 + 2, not directly at 10"
    );
    assert_eq!(
        a_table.get(&dest("10.0.1.0/24")),
        Some(&RouteEntry::via(3, peer(B)))
    );
    assert_eq!(
        a_table.get(&Destination::Peer(peer(C))),
        Some(&RouteEntry::via(5, peer(B)))
    );

    let c_table = c.routing_table();
    assert_eq!(
        c_table.get(&dest("10.0.0.0/24")),
        Some(&RouteEntry::via(5, peer(B)))
    );

    let b_table = b.routing_table();
    assert_eq!(
        b_table.get(&dest("10.0.0.0/24")),
        Some(&RouteEntry::via(3, peer(A)))
    );
    assert_eq!(
        b_table.get(&dest("10.0.2.0/23")),
        Some(&RouteEntry::via(2, peer(C)))
    );

    net.clear();
}

#[tokio::test]
async fn test_converged_tables_are_stable() {
    let (net, a, b, c) = triangle();
    net.rounds(6).await;

    let before: Vec<_> = [&a, &b, &c].iter().map(|r| r.routing_table()).collect();
    net.rounds(2).await;
    let after: Vec<_> = [&a, &b, &c].iter().map(|r| r.routing_table()).collect();

    assert_eq!(before, after);
    net.clear();
}

// =========================================================================
// Invariants across exchange rounds
// =========================================================================

#[tokio::test]
async fn test_self_routes_never_move() {
    let (net, a, b, c) = triangle();

    for _ in 0..5 {
        net.round().await;
        for (router, own) in [(&a, "10.0.0.0/24"), (&b, "10.0.1.0/24"), (&c, "10.0.2.0/23")] {
            assert_eq!(
                router.routing_table().get(&dest(own)),
                Some(&RouteEntry {
                    cost: 0,
                    next_hop: NextHop::Local
                })
            );
        }
    }
    net.clear();
}

#[tokio::test]
async fn test_views_respect_split_horizon() {
    let (net, a, b, c) = triangle();
    net.rounds(4).await;

    for router in [&a, &b, &c] {
        for neighbor in router.config().neighbors.keys() {
            let view = router.view_for(neighbor);
            assert!(
                view.iter().all(|(_, entry)| !entry.next_hop.is_via(neighbor)),
                "{} advertised a route back to {}",
                router.address(),
                neighbor
            );
        }
    }
    net.clear();
}

// =========================================================================
// Summarization on the wire
// =========================================================================

#[tokio::test]
async fn test_downstream_router_receives_aggregate() {
    // D --1-- A --1-- B --1-- C
    // B learns 10.1.0.0/24 and 10.1.1.0/24, both through A, and hands C
    // the /23 instead.
    let net = LoopbackNetwork::new();
    let d = "127.0.0.1:6003";
    let a = "127.0.0.1:6000";
    let b = "127.0.0.1:6001";
    let c = "127.0.0.1:6002";
    net.add_router(d, "10.1.1.0/24", &[(a, 1)]);
    net.add_router(a, "10.1.0.0/24", &[(d, 1), (b, 1)]);
    let router_b = net.add_router(b, "10.9.0.0/24", &[(a, 1), (c, 1)]);
    let router_c = net.add_router(c, "10.2.0.0/24", &[(b, 1)]);

    net.rounds(4).await;

    let b_table = router_b.routing_table();
    assert_eq!(
        b_table.get(&dest("10.1.1.0/24")),
        Some(&RouteEntry::via(2, peer(a)))
    );

    let view = router_b.view_for(&peer(c));
    assert!(view.get(&dest("10.1.0.0/24")).is_none());
    assert!(view.get(&dest("10.1.1.0/24")).is_none());
    assert_eq!(
        view.get(&dest("10.1.0.0/23")),
        Some(&RouteEntry::via(2, peer(a)))
    );

    assert_eq!(
        router_c.routing_table().get(&dest("10.1.0.0/23")),
        Some(&RouteEntry::via(3, peer(b)))
    );
    net.clear();
}
