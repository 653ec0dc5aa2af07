//! Route withdrawal after a failed delivery to a neighbor.
//!
//! There is no timer here: the transport reports the failure and the purge
//! runs once per report.

use crate::destination::{Destination, PeerAddr};
use crate::table::RoutingTable;

/// Withdraw routes that depend on `dead`.
///
/// Removes the entry keyed by `dead`'s address, then every entry whose next
/// hop is `dead`, except the self route and entries keyed by another
/// configured neighbor's address. Returns the number of entries removed.
pub fn purge_neighbor<'a, I>(table: &mut RoutingTable, dead: &PeerAddr, configured: I) -> usize
where
    I: IntoIterator<Item = &'a PeerAddr>,
{
    let configured: Vec<&PeerAddr> = configured.into_iter().collect();
    let mut removed = usize::from(table.remove(&Destination::Peer(dead.clone())).is_some());

    removed += table.retain(|dest, entry| {
        if !entry.next_hop.is_via(dead) {
            return true;
        }
        match dest {
            Destination::Peer(addr) => addr != dead && configured.contains(&addr),
            Destination::Network(_) => false,
        }
    });

    if removed > 0 {
        tracing::info!(neighbor = %dead, removed, "withdrew routes through unreachable neighbor");
    }
    removed
}
