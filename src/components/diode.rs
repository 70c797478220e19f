//! Diode element.
//!
//! The engine uses the Shockley equation:
//!   I = Is * (exp(V / (eta * Vt)) - 1)
//!
//! Saturation current, thermal voltage and emission coefficient start from
//! the [`Semiconductor`] defaults and can be overridden per instance.

use super::Semiconductor;
use crate::circuit::NodeId;
use crate::THERMAL_VOLTAGE;

/// Single diode or an anti-parallel matched pair (symmetric clipper).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiodeConfiguration {
    Single,
    MatchedPair,
}

/// A diode between anode (node1) and cathode (node2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diode {
    semiconductor: Semiconductor,
    configuration: DiodeConfiguration,
    node1: NodeId,
    node2: NodeId,
    saturation_current: f64,
    thermal_voltage: f64,
    emission_coeff: f64,
}

impl Diode {
    /// Create a new diode.
    pub fn new(
        semiconductor: Semiconductor,
        configuration: DiodeConfiguration,
        node1: usize,
        node2: usize,
    ) -> Self {
        Self {
            semiconductor,
            configuration,
            node1: NodeId(node1),
            node2: NodeId(node2),
            saturation_current: semiconductor.saturation_current(),
            thermal_voltage: THERMAL_VOLTAGE,
            emission_coeff: semiconductor.emission_coefficient(),
        }
    }

    pub fn semiconductor(&self) -> Semiconductor {
        self.semiconductor
    }

    pub fn configuration(&self) -> DiodeConfiguration {
        self.configuration
    }

    /// Anode.
    pub fn node1(&self) -> NodeId {
        self.node1
    }

    /// Cathode.
    pub fn node2(&self) -> NodeId {
        self.node2
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
