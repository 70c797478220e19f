//! Operational amplifier terminals.

use crate::circuit::NodeId;

/// An operational amplifier.
///
/// The output stage is referenced to `ground_node` (node 0 unless a
/// separate reference is wired).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpAmp {
    non_inverting: NodeId,
    inverting: NodeId,
    output: NodeId,
    ground: NodeId,
}

impl OpAmp {
    /// Create an op-amp whose output is referenced to ground.
    pub fn new(non_inverting: usize, inverting: usize, output: usize) -> Self {
        Self::with_ground(non_inverting, inverting, output, 0)
    }

    /// Create an op-amp whose output is referenced to `ground`.
    pub fn with_ground(non_inverting: usize, inverting: usize, output: usize, ground: usize) -> Self {
        Self {
            non_inverting: NodeId(non_inverting),
            inverting: NodeId(inverting),
            output: NodeId(output),
            ground: NodeId(ground),
        }
    }

    /// Get the non-inverting input node.
    pub fn non_inverting_node(&self) -> NodeId {
        self.non_inverting
    }

    /// Get the inverting input node.
    pub fn inverting_node(&self) -> NodeId {
        self.inverting
    }

    /// Get the output node.
    pub fn output_node(&self) -> NodeId {
        self.output
    }

    /// Node the output stage is referenced to.
    pub fn ground_node(&self) -> NodeId {
        self.ground
    }

    pub(crate) fn nodes(&self) -> [NodeId; 4] {
        [self.non_inverting, self.inverting, self.output, self.ground]
    }
}
