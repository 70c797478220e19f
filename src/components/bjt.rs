//! BJT (Bipolar Junction Transistor) element.
//!
//! The engine uses a simplified Ebers-Moll model; the junction constants
//! follow the same [`Semiconductor`] defaults as [`Diode`](super::Diode).

use super::Semiconductor;
use crate::circuit::NodeId;
use crate::THERMAL_VOLTAGE;

/// BJT doping (NPN or PNP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Doping {
    Npn,
    Pnp,
}

/// A bipolar transistor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bjt {
    doping: Doping,
    semiconductor: Semiconductor,
    base: NodeId,
    collector: NodeId,
    emitter: NodeId,
    saturation_current: f64,
    thermal_voltage: f64,
    emission_coeff: f64,
}

impl Bjt {
    /// Create a new BJT.
    pub fn new(
        doping: Doping,
        semiconductor: Semiconductor,
        base: usize,
        collector: usize,
        emitter: usize,
    ) -> Self {
        Self {
            doping,
            semiconductor,
            base: NodeId(base),
            collector: NodeId(collector),
            emitter: NodeId(emitter),
            saturation_current: semiconductor.saturation_current(),
            thermal_voltage: THERMAL_VOLTAGE,
            emission_coeff: semiconductor.emission_coefficient(),
        }
    }

    pub fn doping(&self) -> Doping {
        self.doping
    }

    pub fn semiconductor(&self) -> Semiconductor {
        self.semiconductor
    }

    /// Get the base node.
    pub fn node_base(&self) -> NodeId {
        self.base
    }

    /// Get the collector node.
    pub fn node_collector(&self) -> NodeId {
        self.collector
    }

    /// Get the emitter node.
    pub fn node_emitter(&self) -> NodeId {
        self.emitter
    }

    pub fn saturation_current(&self) -> f64 {
        self.saturation_current
    }

    pub fn set_saturation_current(&mut self, saturation_current: f64) {
        self.saturation_current = saturation_current;
    }

    pub fn thermal_voltage(&self) -> f64 {
        self.thermal_voltage
    }

    pub fn set_thermal_voltage(&mut self, thermal_voltage: f64) {
        self.thermal_voltage = thermal_voltage;
    }

    pub fn emission_coeff(&self) -> f64 {
        self.emission_coeff
    }

    pub fn set_emission_coeff(&mut self, emission_coeff: f64) {
        self.emission_coeff = emission_coeff;
    }
}
