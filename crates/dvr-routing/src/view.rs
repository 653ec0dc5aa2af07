use std::collections::BTreeMap;

use crate::destination::PeerAddr;
use crate::summarize::summarize;
use crate::table::RoutingTable;

/// Build the table advertised to `neighbor`: split horizon (drop every route
/// learned through `neighbor`), then summarization. `table` is not modified.
pub fn build_view(table: &RoutingTable, neighbor: &PeerAddr) -> RoutingTable {
    let filtered: BTreeMap<_, _> = table
        .iter()
        .filter(|(_, entry)| !entry.next_hop.is_via(neighbor))
        .map(|(dest, entry)| (dest.clone(), entry.clone()))
        .collect();

    summarize(&RoutingTable::from_routes(*table.network(), filtered))
}
