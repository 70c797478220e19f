//! Core types for circuit representation.

use std::fmt;

/// A node in the circuit.
/// Node 0 is always ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }

    /// Row of this node's voltage in the MNA solution vector.
    /// Returns None for ground, which is not part of the matrix.
    pub fn matrix_index(&self) -> Option<usize> {
        if self.is_ground() {
            None
        } else {
            Some(self.0 - 1)
        }
    }
}

impl From<usize> for NodeId {
    fn from(node: usize) -> Self {
        NodeId(node)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// Index for extra variables in the MNA matrix (voltage source currents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchId(pub usize);

impl BranchId {
    /// Row of this branch current in the MNA solution vector.
    /// Branch currents come after the node voltages.
    pub fn matrix_index(&self, num_nodes: usize) -> usize {
        (num_nodes - 1) + self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_has_no_matrix_row() {
        assert_eq!(NodeId::GROUND.matrix_index(), None);
        assert_eq!(NodeId(1).matrix_index(), Some(0));
        assert_eq!(NodeId(4).matrix_index(), Some(3));
    }

    #[test]
    fn test_branches_follow_nodes() {
        // 3 nodes including ground -> 2 voltage rows, then branches
        assert_eq!(BranchId(0).matrix_index(3), 2);
        assert_eq!(BranchId(2).matrix_index(3), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeId::GROUND.to_string(), "GND");
        assert_eq!(NodeId(3).to_string(), "N3");
        assert_eq!(BranchId(1).to_string(), "I1");
    }
}
