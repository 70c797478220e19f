//! Element catalog.
//!
//! Value objects describing the parts a layout is built from:
//! - Ports: Voltage Input, Voltage Output
//! - Sources: Voltage Source
//! - Linear: Resistor, Capacitor
//! - Controls: Variable Resistor, Potentiometer (see [`taper`] for the value mapping)
//! - Nonlinear: Op-Amp, Diode, BJT, 12AX7 triode
//!
//! Elements carry no solver state. The engine copies what it needs when it
//! is built from a layout.

mod bjt;
mod controls;
mod diode;
mod linear;
mod opamp;
mod sources;
pub mod taper;
mod tube;

pub use bjt::{Bjt, Doping};
pub use controls::{Potentiometer, VariableResistor};
pub use diode::{Diode, DiodeConfiguration};
pub use linear::{Capacitor, Resistor};
pub use opamp::OpAmp;
pub use sources::{VoltageInput, VoltageOutput, VoltageSource};
pub use taper::{ParamDirection, Skew};
pub use tube::{Model12AX7, Tube12AX7};

/// Semiconductor material of a junction, fixing its default constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semiconductor {
    Silicon,
    Germanium,
}

impl Semiconductor {
    /// Default saturation current (A).
    pub fn saturation_current(self) -> f64 {
        match self {
            Semiconductor::Silicon => 1.0e-12,
            Semiconductor::Germanium => 1.0e-6,
        }
    }

    /// Default emission coefficient (ideality factor).
    pub fn emission_coefficient(self) -> f64 {
        match self {
            Semiconductor::Silicon => 1.0,
            Semiconductor::Germanium => 1.68,
        }
    }
}
