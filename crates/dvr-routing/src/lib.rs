//! DVR Routing — distance-vector routing engine.
//!
//! This crate provides:
//! - [`Cidr`] — IPv4 prefix parsing, formatting and sibling merging.
//! - [`RoutingTable`] — the per-router table with its pinned self route.
//! - [`update::apply`] — Bellman-Ford relaxation against a neighbor's advertisement.
//! - [`build_view`] — the split-horizon, summarized table sent to one neighbor.
//! - [`purge_neighbor`] — route withdrawal after a failed delivery.
//! - [`Router`] — the orchestrator tying the above to a [`Transport`].

pub mod cidr;
pub mod destination;
pub mod error;
pub mod liveness;
pub mod message;
pub mod router;
pub mod summarize;
pub mod table;
pub mod transport;
pub mod update;
pub mod view;

/// Additive path cost. Link costs are positive.
pub type Cost = u32;

/// Saturation ceiling for path costs.
pub const UNREACHABLE: Cost = Cost::MAX;

// Re-exports for convenience.
pub use cidr::{try_merge, Cidr};
pub use destination::{Destination, NextHop, PeerAddr};
pub use error::RoutingError;
pub use liveness::purge_neighbor;
pub use message::{encode_table, RouterSnapshot, UpdateMessage, WireRoute, WireTable};
pub use router::{Router, RouterConfig};
pub use summarize::summarize;
pub use table::{RouteEntry, RoutingTable};
pub use transport::Transport;
pub use view::build_view;
