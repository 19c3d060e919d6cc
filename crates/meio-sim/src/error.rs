use thiserror::Error;

use meio_core::NodeId;
use meio_model::ModelError;
use meio_network::NetworkError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("node {node} has no inventory policy")]
    MissingPolicy { node: NodeId },

    #[error(
        "inventory reconciliation failed at node {node}, period {period}: \
         |on_hand − backorders − inventory_level| = {drift}"
    )]
    ConsistencyViolation {
        node:   NodeId,
        period: usize,
        drift:  f64,
    },

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;
