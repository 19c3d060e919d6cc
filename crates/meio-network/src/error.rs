use thiserror::Error;

use meio_core::NodeId;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("edge endpoint {0} does not exist")]
    UnknownNode(NodeId),

    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: NodeId, to: NodeId },

    #[error("directed cycle through nodes {0:?}")]
    Cycle(Vec<NodeId>),

    #[error("node {node}: {what} must be non-negative, got {value}")]
    NegativeValue {
        node:  NodeId,
        what:  &'static str,
        value: f64,
    },

    #[error("edge {from} -> {to}: usage rate must be positive, got {value}")]
    InvalidUsageRate {
        from:  NodeId,
        to:    NodeId,
        value: f64,
    },

    #[error("network has no nodes")]
    Empty,
}

pub type NetworkResult<T> = Result<T, NetworkError>;
