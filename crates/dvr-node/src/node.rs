//! The routing node orchestrator.
//!
//! Owns the router and runs its two tasks: the HTTP API that receives
//! neighbor updates and the periodic advertiser.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

use dvr_routing::Router;

use crate::config::DvrConfig;
use crate::transport::HttpTransport;

pub type NodeRouter = Router<HttpTransport>;

/// A running distance-vector routing node.
pub struct DvrNode {
    config: DvrConfig,
    router: Arc<NodeRouter>,
    api_task: Option<JoinHandle<Result<()>>>,
    advertise_task: Option<JoinHandle<()>>,
}

impl DvrNode {
    /// Create a node from a resolved configuration.
    pub fn new(config: DvrConfig) -> Result<Self> {
        let router_config = config.to_router_config()?;
        let transport = HttpTransport::new(config.transport_timeout())?;
        let router = Arc::new(Router::new(router_config, transport));

        Ok(Self {
            config,
            router,
            api_task: None,
            advertise_task: None,
        })
    }

    pub fn router(&self) -> &Arc<NodeRouter> {
        &self.router
    }

    /// Bind the API and spawn both background tasks. Returns the bound
    /// address.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let api_addr: SocketAddr = self.config.api_socket_addr().parse()?;
        let listener = crate::api::bind(api_addr).await?;
        let bound = listener.local_addr()?;

        let api_router = self.router.clone();
        self.api_task = Some(tokio::spawn(crate::api::serve(listener, api_router)));

        let router = self.router.clone();
        self.advertise_task = Some(tokio::spawn(async move {
            router.run_periodic().await;
        }));

        tracing::info!(
            address = %self.router.address(),
            network = %self.router.config().network,
            interval_secs = self.config.router.update_interval_secs,
            "routing node started"
        );
        Ok(bound)
    }

    /// Wait until one of the background tasks stops. Neither stops on its
    /// own under normal operation.
    pub async fn run(&mut self) -> Result<()> {
        let (Some(api_task), Some(advertise_task)) =
            (self.api_task.as_mut(), self.advertise_task.as_mut())
        else {
            anyhow::bail!("node not started");
        };

        tokio::select! {
            result = api_task => match result {
                Ok(Ok(())) => anyhow::bail!("HTTP API server exited"),
                Ok(Err(e)) => Err(e.context("HTTP API server error")),
                Err(e) => Err(anyhow::anyhow!("HTTP API task failed: {e}")),
            },
            result = advertise_task => {
                Err(anyhow::anyhow!("advertisement task exited: {result:?}"))
            }
        }
    }

    /// Stop both tasks. Table mutations never span an await point, so
    /// aborting cannot leave the table half-written.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down routing node");
        if let Some(task) = self.advertise_task.take() {
            task.abort();
        }
        if let Some(task) = self.api_task.take() {
            task.abort();
        }
        tracing::info!(
            routes = self.router.routing_table().size(),
            "final routing table size"
        );
        Ok(())
    }
}
