//! Bellman-Ford relaxation of the local table against one neighbor's
//! advertised routes.

use crate::destination::{Destination, PeerAddr};
use crate::table::{RouteEntry, RoutingTable};
use crate::{Cost, UNREACHABLE};

/// Apply one neighbor's advertisement to `table` and report whether any
/// entry changed.
///
/// For every advertised destination the candidate cost is
/// `link_cost + advertised cost` (saturating). The candidate replaces the
/// current entry when it is cheaper, or when the current entry already goes
/// through `neighbor` and its cost moved in either direction. Routes to the
/// local network or to `local_address` are never imported, and a saturated
/// candidate is never added as a new entry.
///
/// `neighbor` must be a configured neighbor; callers reject unknown senders
/// before calling.
pub fn apply<'a, I>(
    table: &mut RoutingTable,
    local_address: &PeerAddr,
    neighbor: &PeerAddr,
    advertised: I,
    link_cost: Cost,
) -> bool
where
    I: IntoIterator<Item = (&'a Destination, Cost)>,
{
    let mut changed = false;

    for (dest, advertised_cost) in advertised {
        if table.is_self_route(dest) || dest.is_peer(local_address) {
            continue;
        }

        let new_cost = link_cost.saturating_add(advertised_cost);
        let replace = match table.get(dest) {
            None => new_cost != UNREACHABLE,
            Some(current) if new_cost < current.cost => true,
            Some(current) => current.next_hop.is_via(neighbor) && new_cost != current.cost,
        };

        if replace {
            tracing::debug!(
                destination = %dest,
                cost = new_cost,
                next_hop = %neighbor,
                "route updated"
            );
            table.insert(dest.clone(), RouteEntry::via(new_cost, neighbor.clone()));
            changed = true;
        }
    }

    changed
}
