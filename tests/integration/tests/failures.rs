//! Integration test: rejected updates and dead neighbors.

use std::collections::BTreeMap;

use dvr_integration_tests::LoopbackNetwork;
use dvr_routing::{Destination, PeerAddr, RoutingError, UpdateMessage, WireRoute};

const A: &str = "127.0.0.1:5000";
const B: &str = "127.0.0.1:5001";
const C: &str = "127.0.0.1:5002";

fn peer(s: &str) -> PeerAddr {
    PeerAddr::new(s).unwrap()
}

fn dest(s: &str) -> Destination {
    Destination::parse(s).unwrap()
}

#[tokio::test]
async fn test_unknown_sender_mutates_nothing() {
    let net = LoopbackNetwork::new();
    let a = net.add_router(A, "10.0.0.0/24", &[(B, 3)]);
    let _b = net.add_router(B, "10.0.1.0/24", &[(A, 3)]);
    net.rounds(2).await;

    let before = a.routing_table();
    let intruder = UpdateMessage {
        sender_address: "127.0.0.1:6666".into(),
        routing_table: BTreeMap::from([(
            "0.0.0.0/1".to_string(),
            WireRoute {
                cost: 0,
                next_hop: "127.0.0.1:6666".into(),
            },
        )]),
    };

    assert_eq!(
        a.handle_update(&intruder),
        Err(RoutingError::UnknownNeighbor("127.0.0.1:6666".into()))
    );
    assert_eq!(a.routing_table(), before);
    net.clear();
}

#[tokio::test]
async fn test_dead_neighbor_is_purged() {
    let net = LoopbackNetwork::new();
    let a = net.add_router(A, "10.0.0.0/24", &[(B, 3)]);
    let b = net.add_router(B, "10.0.1.0/24", &[(A, 3), (C, 2)]);
    let _c = net.add_router(C, "10.0.2.0/23", &[(B, 2)]);
    net.rounds(3).await;

    assert!(b.routing_table().get(&dest("10.0.2.0/23")).is_some());
    assert!(a.routing_table().get(&dest("10.0.2.0/23")).is_some());

    net.disconnect(C);
    let failures = net.round().await;
    assert_eq!(failures, 1, "only B has C as a neighbor");

    let b_table = b.routing_table();
    assert!(b_table.get(&dest("10.0.2.0/23")).is_none());
    assert!(b_table.get(&Destination::Peer(peer(C))).is_none());
    assert!(b_table.iter().all(|(_, entry)| !entry.next_hop.is_via(&peer(C))));
    assert!(b_table.get(&dest("10.0.1.0/24")).is_some());
    assert!(b_table.get(&dest("10.0.0.0/24")).is_some());

    net.clear();
}

#[tokio::test]
async fn test_isolated_router_keeps_only_self_route() {
    let net = LoopbackNetwork::new();
    let a = net.add_router(A, "10.0.0.0/24", &[(B, 3)]);
    let _b = net.add_router(B, "10.0.1.0/24", &[(A, 3)]);
    net.rounds(2).await;
    assert_eq!(a.routing_table().size(), 3);

    net.disconnect(B);
    net.round().await;

    let table = a.routing_table();
    assert_eq!(table.size(), 1);
    assert!(table.get(&dest("10.0.0.0/24")).is_some());
    net.clear();
}

#[tokio::test]
async fn test_purge_is_repeated_each_tick_while_neighbor_stays_down() {
    let net = LoopbackNetwork::new();
    let a = net.add_router(A, "10.0.0.0/24", &[(B, 3)]);
    net.add_router(B, "10.0.1.0/24", &[(A, 3)]);
    net.rounds(2).await;

    net.disconnect(B);
    assert_eq!(net.round().await, 1);
    assert_eq!(net.round().await, 1);
    assert_eq!(a.routing_table().size(), 1);
    net.clear();
}
