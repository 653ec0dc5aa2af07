//! In-memory network for multi-router scenarios.
//!
//! Every router registered on a [`LoopbackNetwork`] delivers its updates by
//! calling the target router's inbound handler directly. Disconnecting a
//! router makes every delivery to it fail, which is how scenarios simulate a
//! dead neighbor.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use dvr_routing::{
    Cidr, Cost, PeerAddr, Router, RouterConfig, RoutingError, Transport, UpdateMessage,
};

pub type LoopbackRouter = Router<LoopbackTransport>;

#[derive(Default)]
pub struct LoopbackNetwork {
    routers: RwLock<BTreeMap<PeerAddr, Arc<LoopbackRouter>>>,
}

pub struct LoopbackTransport {
    network: Arc<LoopbackNetwork>,
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn deliver(
        &self,
        neighbor: &PeerAddr,
        message: &UpdateMessage,
    ) -> Result<(), RoutingError> {
        let target = self.network.get(neighbor).ok_or_else(|| RoutingError::DeliveryFailure {
            neighbor: neighbor.to_string(),
            reason: "unreachable".into(),
        })?;
        target
            .handle_update(message)
            .map(|_| ())
            .map_err(|e| RoutingError::DeliveryFailure {
                neighbor: neighbor.to_string(),
                reason: e.to_string(),
            })
    }
}

impl LoopbackNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a router and attach it to the network.
    ///
    /// Panics on invalid input; this is test scaffolding.
    pub fn add_router(
        self: &Arc<Self>,
        address: &str,
        network: &str,
        neighbors: &[(&str, Cost)],
    ) -> Arc<LoopbackRouter> {
        let neighbors = neighbors
            .iter()
            .map(|(addr, cost)| (PeerAddr::new(*addr).unwrap(), *cost))
            .collect();
        let config = RouterConfig::new(
            PeerAddr::new(address).unwrap(),
            Cidr::parse(network).unwrap(),
            neighbors,
            Duration::from_secs(10),
        )
        .unwrap();
        let router = Arc::new(Router::new(
            config,
            LoopbackTransport {
                network: self.clone(),
            },
        ));
        self.routers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(router.address().clone(), router.clone());
        router
    }

    pub fn get(&self, address: &PeerAddr) -> Option<Arc<LoopbackRouter>> {
        self.routers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }

    /// Detach a router; deliveries to it fail from now on.
    pub fn disconnect(&self, address: &str) -> Option<Arc<LoopbackRouter>> {
        let address = PeerAddr::new(address).ok()?;
        self.routers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&address)
    }

    /// One periodic tick on every attached router, in address order.
    /// Returns the total number of failed deliveries.
    pub async fn round(&self) -> usize {
        let routers: Vec<_> = self
            .routers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut failures = 0;
        for router in routers {
            failures += router.advertise().await;
        }
        tracing::debug!(failures, "round complete");
        failures
    }

    pub async fn rounds(&self, n: usize) {
        for _ in 0..n {
            self.round().await;
        }
    }

    /// Drop every router so the transport back-references are released.
    pub fn clear(&self) {
        self.routers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
