//! CIDR route summarization.
//!
//! Entries sharing a next hop are sorted by base address and adjacent
//! equal-prefix blocks are folded into their supernet until no pair merges.
//! An aggregate advertises the highest cost folded into it. Resolving a
//! collision between groups can leave two siblings of one group next to each
//! other, so whole passes repeat until the table stops changing.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::cidr::{try_merge, Cidr};
use crate::destination::{Destination, NextHop};
use crate::table::{RouteEntry, RoutingTable};
use crate::Cost;

/// Summarize a table. The input is left untouched; keys that are not CIDR
/// networks and the self route pass through unmerged.
pub fn summarize(table: &RoutingTable) -> RoutingTable {
    let mut current = summarize_pass(table);
    loop {
        let next = summarize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Group, merge and resolve collisions once. A pass that changes its input
/// always drops at least one entry.
fn summarize_pass(table: &RoutingTable) -> RoutingTable {
    let mut routes: BTreeMap<Destination, RouteEntry> = BTreeMap::new();
    let mut groups: BTreeMap<NextHop, Vec<(Cidr, Cost)>> = BTreeMap::new();

    for (dest, entry) in table.iter() {
        match dest {
            Destination::Network(cidr) if !table.is_self_route(dest) => groups
                .entry(entry.next_hop.clone())
                .or_default()
                .push((*cidr, entry.cost)),
            _ => {
                routes.insert(dest.clone(), entry.clone());
            }
        }
    }

    for (next_hop, blocks) in groups {
        for (cidr, cost) in merge_group(blocks) {
            let dest = Destination::Network(cidr);
            if table.is_self_route(&dest) {
                tracing::debug!(%cidr, "aggregate shadows the self route, dropped");
                continue;
            }
            match routes.entry(dest) {
                Entry::Vacant(slot) => {
                    slot.insert(RouteEntry {
                        cost,
                        next_hop: next_hop.clone(),
                    });
                }
                Entry::Occupied(mut slot) => {
                    if cost < slot.get().cost {
                        slot.insert(RouteEntry {
                            cost,
                            next_hop: next_hop.clone(),
                        });
                    }
                }
            }
        }
    }

    RoutingTable::from_routes(*table.network(), routes)
}

/// Merge one next-hop group to a fixed point.
fn merge_group(mut blocks: Vec<(Cidr, Cost)>) -> Vec<(Cidr, Cost)> {
    loop {
        blocks.sort_by_key(|(cidr, _)| (cidr.base(), cidr.prefix()));
        if !merge_adjacent(&mut blocks) {
            return blocks;
        }
    }
}

/// One left-to-right pass over sorted blocks. After a merge the scan steps
/// back one slot so the aggregate is also tried against its left neighbor.
fn merge_adjacent(blocks: &mut Vec<(Cidr, Cost)>) -> bool {
    let mut merged_any = false;
    let mut i = 0;
    while i + 1 < blocks.len() {
        let (left, left_cost) = blocks[i];
        let (right, right_cost) = blocks[i + 1];
        match try_merge(&left, &right) {
            Some(aggregate) => {
                tracing::trace!(%left, %right, %aggregate, "merged routes");
                blocks[i] = (aggregate, left_cost.max(right_cost));
                blocks.remove(i + 1);
                merged_any = true;
                i = i.saturating_sub(1);
            }
            None => i += 1,
        }
    }
    merged_any
}
