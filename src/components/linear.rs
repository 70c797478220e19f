//! Fixed linear passives: Resistor and Capacitor.

use crate::circuit::NodeId;

/// A fixed resistor (ohms) between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistor {
    value: f64,
    node1: NodeId,
    node2: NodeId,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(value: f64, node1: usize, node2: usize) -> Self {
        Self {
            value,
            node1: NodeId(node1),
            node2: NodeId(node2),
        }
    }

    /// Resistance in ohms.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn node2(&self) -> NodeId {
        self.node2
    }
}

/// A fixed capacitor (farads) between two nodes.
///
/// The engine discretizes it with the trapezoidal companion model:
///   i(n) = (2C/dt) * v(n) - I_eq,   I_eq = (2C/dt) * v(n-1) + i(n-1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacitor {
    value: f64,
    node1: NodeId,
    node2: NodeId,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(value: f64, node1: usize, node2: usize) -> Self {
        Self {
            value,
            node1: NodeId(node1),
            node2: NodeId(node2),
        }
    }

    /// Capacitance in farads.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn node2(&self) -> NodeId {
        self.node2
    }
}
