//! Signal ports and fixed voltage sources.

use crate::circuit::NodeId;

/// Where the audio signal is injected: an ideal source across (node1, node2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageInput {
    node1: NodeId,
    node2: NodeId,
}

impl VoltageInput {
    /// Create an input port driving node1 relative to node2.
    pub fn new(node1: usize, node2: usize) -> Self {
        Self {
            node1: NodeId(node1),
            node2: NodeId(node2),
        }
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn node2(&self) -> NodeId {
        self.node2
    }
}

impl Default for VoltageInput {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Where the output is measured: the differential voltage V(node1) - V(node2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageOutput {
    node1: NodeId,
    node2: NodeId,
}

impl VoltageOutput {
    /// Create an output port measuring node1 relative to node2.
    pub fn new(node1: usize, node2: usize) -> Self {
        Self {
            node1: NodeId(node1),
            node2: NodeId(node2),
        }
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn node2(&self) -> NodeId {
        self.node2
    }
}

impl Default for VoltageOutput {
    fn default() -> Self {
        Self::new(2, 0)
    }
}

/// A fixed DC voltage on one node, relative to ground (a supply rail or bias).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageSource {
    voltage: f64,
    node: NodeId,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(voltage: f64, node: usize) -> Self {
        Self {
            voltage,
            node: NodeId(node),
        }
    }

    /// Get the source voltage.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}
