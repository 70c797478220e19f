//! Error types for circuit layouts and their processors.
//!
//! This module provides a unified error type [`CircuitError`] that covers
//! layout construction, processor usage order, and engine solving.

use thiserror::Error;

/// Result type alias using [`CircuitError`].
pub type Result<T> = std::result::Result<T, CircuitError>;

/// Unified error type for all PointToPoint operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    // ============ Construction Errors ============
    /// An element terminal references a node outside the layout.
    #[error("{element} references node {node}, but the layout has {num_nodes} nodes")]
    InvalidNode {
        element: String,
        node: usize,
        num_nodes: usize,
    },

    /// Parameter numbers are 1-based; 0 is not a valid parameter number.
    #[error("{element} has parameter number {number}; parameter numbers start at 1")]
    InvalidParameterNumber { element: String, number: usize },

    /// A physical element value is out of range.
    #[error("Invalid value for {element}: {message}")]
    InvalidValue { element: String, message: String },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Usage-Order Errors ============
    /// Processing was requested before `prepare`.
    #[error("Processor used before prepare() was called")]
    NotPrepared,

    /// Channel index beyond the channels allocated in `prepare`.
    #[error("Channel {channel} out of range ({num_channels} channels configured)")]
    ChannelOutOfRange { channel: usize, num_channels: usize },

    /// A buffer holds fewer samples than requested.
    #[error("Buffer holds {len} samples but {required} were requested")]
    BufferTooShort { required: usize, len: usize },

    /// The parameter vector does not reach an index a variable element uses.
    #[error("Parameter index {index} is used by the circuit but only {provided} values were supplied")]
    MissingParameter { index: usize, provided: usize },

    /// A parameter value is NaN or infinite.
    #[error("Parameter {index} is not a finite number ({value})")]
    InvalidParameterValue { index: usize, value: f64 },

    /// Invalid sample rate passed to `prepare`.
    #[error("Invalid sample rate {sample_rate}")]
    InvalidSampleRate { sample_rate: f64 },

    /// A chain needs at least one stage.
    #[error("A circuit chain needs at least one stage")]
    EmptyChain,

    // ============ Solver Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - circuit may have a short circuit or floating node")]
    SingularMatrix,

    /// Newton-Raphson iteration did not converge
    #[error("Newton-Raphson did not converge after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },
}

impl CircuitError {
    /// Create an invalid node error
    pub fn invalid_node(element: impl Into<String>, node: usize, num_nodes: usize) -> Self {
        Self::InvalidNode {
            element: element.into(),
            node,
            num_nodes,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an invalid topology error
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(iterations: usize, residual: f64) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
        }
    }

    /// Whether this error is a caller contract violation rather than a
    /// layout or solver problem.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::NotPrepared
                | Self::ChannelOutOfRange { .. }
                | Self::BufferTooShort { .. }
                | Self::MissingParameter { .. }
                | Self::InvalidParameterValue { .. }
                | Self::InvalidSampleRate { .. }
                | Self::EmptyChain
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_element() {
        let err = CircuitError::invalid_node("R1", 7, 3);
        assert_eq!(
            err.to_string(),
            "R1 references node 7, but the layout has 3 nodes"
        );
    }

    #[test]
    fn test_usage_errors_are_classified() {
        assert!(CircuitError::NotPrepared.is_usage_error());
        assert!(CircuitError::EmptyChain.is_usage_error());
        assert!(!CircuitError::SingularMatrix.is_usage_error());
        assert!(!CircuitError::invalid_topology("x").is_usage_error());
    }
}
