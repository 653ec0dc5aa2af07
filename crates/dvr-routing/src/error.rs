use crate::Cost;

/// Errors that can occur within the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("malformed identifier {id:?}: {reason}")]
    MalformedIdentifier { id: String, reason: String },

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("unknown neighbor: {0}")]
    UnknownNeighbor(String),

    #[error("delivery to {neighbor} failed: {reason}")]
    DeliveryFailure { neighbor: String, reason: String },

    #[error("invalid link cost {cost} for neighbor {neighbor}: must be a positive integer")]
    InvalidLinkCost { neighbor: String, cost: Cost },

    #[error("invalid router configuration: {0}")]
    InvalidConfig(String),
}

impl RoutingError {
    pub(crate) fn malformed_id(id: &str, reason: impl Into<String>) -> Self {
        RoutingError::MalformedIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
