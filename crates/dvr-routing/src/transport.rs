use async_trait::async_trait;

use crate::destination::PeerAddr;
use crate::error::RoutingError;
use crate::message::UpdateMessage;

/// Outbound delivery of updates to a neighbor.
///
/// Implementations own their timeout policy. Any failure must be reported as
/// `RoutingError::DeliveryFailure`; the router answers it by withdrawing the
/// neighbor's routes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, neighbor: &PeerAddr, message: &UpdateMessage)
        -> Result<(), RoutingError>;
}
