use std::collections::BTreeMap;

use crate::cidr::Cidr;
use crate::destination::{Destination, NextHop, PeerAddr};
use crate::Cost;

/// Cost and next hop for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Additive metric back to the originating router.
    pub cost: Cost,
    /// The neighbor traffic is forwarded to, or `Local`.
    pub next_hop: NextHop,
}

impl RouteEntry {
    /// The zero-cost entry for a locally administered network.
    pub fn local() -> Self {
        Self {
            cost: 0,
            next_hop: NextHop::Local,
        }
    }

    /// An entry reached through `neighbor`.
    pub fn via(cost: Cost, neighbor: PeerAddr) -> Self {
        Self {
            cost,
            next_hop: NextHop::Via(neighbor),
        }
    }
}

/// The authoritative destination → (cost, next hop) mapping of one router.
///
/// The router's own network is pinned at cost 0 with a `Local` next hop for
/// the table's whole lifetime: `insert`, `remove` and `retain` never touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    network: Cidr,
    routes: BTreeMap<Destination, RouteEntry>,
}

impl RoutingTable {
    /// Create a table holding only the self route for `network`.
    pub fn new(network: Cidr) -> Self {
        let mut routes = BTreeMap::new();
        routes.insert(Destination::Network(network), RouteEntry::local());
        Self { network, routes }
    }

    /// Create a table with the self route plus one entry per direct neighbor,
    /// keyed by the neighbor's address at the link cost.
    pub fn with_neighbors<'a, I>(network: Cidr, neighbors: I) -> Self
    where
        I: IntoIterator<Item = (&'a PeerAddr, Cost)>,
    {
        let mut table = Self::new(network);
        for (addr, cost) in neighbors {
            table.insert(
                Destination::Peer(addr.clone()),
                RouteEntry::via(cost, addr.clone()),
            );
        }
        table
    }

    /// Rebuild a table from raw routes, restoring the self route.
    pub(crate) fn from_routes(network: Cidr, mut routes: BTreeMap<Destination, RouteEntry>) -> Self {
        routes.insert(Destination::Network(network), RouteEntry::local());
        Self { network, routes }
    }

    /// The locally administered network.
    pub fn network(&self) -> &Cidr {
        &self.network
    }

    /// Returns true if `dest` is the pinned self route.
    pub fn is_self_route(&self, dest: &Destination) -> bool {
        dest.as_network() == Some(&self.network)
    }

    pub fn get(&self, dest: &Destination) -> Option<&RouteEntry> {
        self.routes.get(dest)
    }

    /// Insert or replace an entry, returning the previous one. Inserting over
    /// the self route is ignored and returns `None`.
    pub fn insert(&mut self, dest: Destination, entry: RouteEntry) -> Option<RouteEntry> {
        if self.is_self_route(&dest) {
            return None;
        }
        self.routes.insert(dest, entry)
    }

    /// Remove an entry, returning it. The self route cannot be removed.
    pub fn remove(&mut self, dest: &Destination) -> Option<RouteEntry> {
        if self.is_self_route(dest) {
            return None;
        }
        self.routes.remove(dest)
    }

    /// Keep only the entries for which `keep` returns true. The self route is
    /// always kept. Returns the number of entries removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Destination, &RouteEntry) -> bool,
    {
        let before = self.routes.len();
        let network = self.network;
        self.routes
            .retain(|dest, entry| dest.as_network() == Some(&network) || keep(dest, entry));
        before - self.routes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Destination, &RouteEntry)> {
        self.routes.iter()
    }

    /// Number of entries, self route included.
    pub fn size(&self) -> usize {
        self.routes.len()
    }

    /// A consistent copy of every entry, ordered by destination.
    pub fn entries(&self) -> Vec<(Destination, RouteEntry)> {
        self.routes
            .iter()
            .map(|(dest, entry)| (dest.clone(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(s: &str) -> PeerAddr {
        PeerAddr::new(s).unwrap()
    }

    fn net(s: &str) -> Destination {
        Destination::parse(s).unwrap()
    }

    fn local_table() -> RoutingTable {
        RoutingTable::new(Cidr::parse("10.0.0.0/24").unwrap())
    }

    #[test]
    fn test_new_has_self_route() {
        let table = local_table();
        assert_eq!(table.size(), 1);
        assert_eq!(table.get(&net("10.0.0.0/24")), Some(&RouteEntry::local()));
        assert!(table.is_self_route(&net("10.0.0.0/24")));
        assert!(!table.is_self_route(&net("10.0.0.0/23")));
    }

    #[test]
    fn test_with_neighbors() {
        let b = peer("127.0.0.1:5001");
        let c = peer("127.0.0.1:5002");
        let table = RoutingTable::with_neighbors(
            Cidr::parse("10.0.0.0/24").unwrap(),
            [(&b, 3), (&c, 10)],
        );

        assert_eq!(table.size(), 3);
        assert_eq!(
            table.get(&Destination::Peer(b.clone())),
            Some(&RouteEntry::via(3, b))
        );
        assert_eq!(
            table.get(&Destination::Peer(c.clone())),
            Some(&RouteEntry::via(10, c))
        );
    }

    #[test]
    fn test_insert_and_replace() {
        let mut table = local_table();
        let b = peer("127.0.0.1:5001");

        assert!(table
            .insert(net("10.0.1.0/24"), RouteEntry::via(3, b.clone()))
            .is_none());
        let previous = table.insert(net("10.0.1.0/24"), RouteEntry::via(4, b.clone()));
        assert_eq!(previous, Some(RouteEntry::via(3, b.clone())));
        assert_eq!(table.get(&net("10.0.1.0/24")).unwrap().cost, 4);
    }

    #[test]
    fn test_self_route_is_pinned() {
        let mut table = local_table();
        let b = peer("127.0.0.1:5001");

        assert!(table
            .insert(net("10.0.0.0/24"), RouteEntry::via(1, b))
            .is_none());
        assert!(table.remove(&net("10.0.0.0/24")).is_none());
        assert_eq!(table.retain(|_, _| false), 0);
        assert_eq!(table.get(&net("10.0.0.0/24")), Some(&RouteEntry::local()));
    }

    #[test]
    fn test_retain_counts_removed() {
        let mut table = local_table();
        let b = peer("127.0.0.1:5001");
        table.insert(net("10.0.1.0/24"), RouteEntry::via(3, b.clone()));
        table.insert(net("10.0.2.0/24"), RouteEntry::via(5, b));

        let removed = table.retain(|_, entry| entry.cost < 5);
        assert_eq!(removed, 1);
        assert_eq!(table.size(), 2);
    }

    #[test]
    fn test_entries_are_ordered() {
        let mut table = local_table();
        let b = peer("127.0.0.1:5001");
        table.insert(net("10.0.3.0/24"), RouteEntry::via(1, b.clone()));
        table.insert(net("10.0.1.0/24"), RouteEntry::via(1, b));

        let keys: Vec<String> = table
            .entries()
            .into_iter()
            .map(|(dest, _)| dest.to_string())
            .collect();
        assert_eq!(keys, vec!["10.0.0.0/24", "10.0.1.0/24", "10.0.3.0/24"]);
    }
}
