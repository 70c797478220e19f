//! 12AX7 triode element.

use crate::circuit::NodeId;

/// Published 12AX7 parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model12AX7 {
    Exh,
    Rsd1,
    Rsd2,
}

/// A 12AX7 triode section. Only the model variant parameterizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tube12AX7 {
    model: Model12AX7,
    grid: NodeId,
    anode: NodeId,
    cathode: NodeId,
}

impl Tube12AX7 {
    pub fn new(model: Model12AX7, grid: usize, anode: usize, cathode: usize) -> Self {
        Self {
            model,
            grid: NodeId(grid),
            anode: NodeId(anode),
            cathode: NodeId(cathode),
        }
    }

    pub fn model(&self) -> Model12AX7 {
        self.model
    }

    pub fn node_grid(&self) -> NodeId {
        self.grid
    }

    pub fn node_anode(&self) -> NodeId {
        self.anode
    }

    pub fn node_cathode(&self) -> NodeId {
        self.cathode
    }
}
