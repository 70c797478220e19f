//! Ready-made layouts for common circuits.
//!
//! Node 0 is ground in every preset; the input is always across node 1 and
//! ground.

use crate::circuit::CircuitLayout;
use crate::components::{
    Bjt, Capacitor, Diode, Doping, DiodeConfiguration, Model12AX7, OpAmp, ParamDirection, Potentiometer,
    Resistor, Semiconductor, Skew, Tube12AX7, VariableResistor, VoltageInput, VoltageOutput,
    VoltageSource,
};
use crate::error::Result;

/// First-order RC low-pass: input -> R -> output, C to ground.
///
/// Cutoff is 1 / (2π R C).
pub fn rc_low_pass(resistance: f64, capacitance: f64) -> CircuitLayout {
    CircuitLayout::new(3, VoltageInput::new(1, 0), VoltageOutput::new(2, 0))
        .with_resistor(Resistor::new(resistance, 1, 2))
        .with_capacitor(Capacitor::new(capacitance, 2, 0))
}

/// Low-pass tone control on parameter 1: a 100k variable resistor in series
/// with 1k into 22nF. Turning the knob up lowers the resistance and opens
/// the filter.
pub fn tone_filter(init_value: f64) -> Result<CircuitLayout> {
    let tone = VariableResistor::new(
        100e3,
        1,
        ParamDirection::InvProportional,
        Skew::Linear,
        3,
        2,
        init_value,
    )?;
    Ok(
        CircuitLayout::new(4, VoltageInput::new(1, 0), VoltageOutput::new(2, 0))
            .with_resistor(Resistor::new(1e3, 1, 3))
            .with_variable_resistor(tone)
            .with_capacitor(Capacitor::new(22e-9, 2, 0)),
    )
}

/// Linear 10k volume potentiometer on parameter 1. The output is the wiper,
/// so the gain equals the knob position.
pub fn volume_pot(init_value: f64) -> Result<CircuitLayout> {
    let pot = Potentiometer::new(
        10e3,
        1,
        ParamDirection::InvProportional,
        Skew::Linear,
        1,
        2,
        0,
        init_value,
    )?;
    Ok(CircuitLayout::new(3, VoltageInput::new(1, 0), VoltageOutput::new(2, 0)).with_potentiometer(pot))
}

/// Symmetric hard clipper: 1k series resistor into an anti-parallel diode
/// pair to ground.
pub fn diode_clipper(semiconductor: Semiconductor) -> CircuitLayout {
    CircuitLayout::new(3, VoltageInput::new(1, 0), VoltageOutput::new(2, 0))
        .with_resistor(Resistor::new(1e3, 1, 2))
        .with_diode(Diode::new(semiconductor, DiodeConfiguration::MatchedPair, 2, 0))
}

/// Inverting op-amp amplifier with gain -`r_feedback` / `r_in`.
///
/// Node 2 is the inverting input, node 3 the output.
pub fn inverting_amplifier(r_in: f64, r_feedback: f64) -> CircuitLayout {
    CircuitLayout::new(4, VoltageInput::new(1, 0), VoltageOutput::new(3, 0))
        .with_resistor(Resistor::new(r_in, 1, 2))
        .with_resistor(Resistor::new(r_feedback, 2, 3))
        .with_op_amp(OpAmp::new(0, 2, 3))
}

/// Supply rail of the common-emitter stage.
pub const COMMON_EMITTER_SUPPLY: f64 = 9.0;

/// Fixed-bias common-emitter stage: 10µF coupling cap and 1k base stopper
/// into the base, 1M base bias from the supply, 4.7k collector load,
/// emitter grounded. The output is the collector.
///
/// An NPN stage runs from +9 V and a PNP stage from -9 V, so the two are
/// mirror images.
///
/// Nodes: 1 input, 2 coupling, 3 base, 4 collector, 5 supply.
pub fn common_emitter(doping: Doping, semiconductor: Semiconductor) -> CircuitLayout {
    let supply = match doping {
        Doping::Npn => COMMON_EMITTER_SUPPLY,
        Doping::Pnp => -COMMON_EMITTER_SUPPLY,
    };
    CircuitLayout::new(6, VoltageInput::new(1, 0), VoltageOutput::new(4, 0))
        .with_voltage_source(VoltageSource::new(supply, 5))
        .with_capacitor(Capacitor::new(10e-6, 1, 2))
        .with_resistor(Resistor::new(1e3, 2, 3))
        .with_resistor(Resistor::new(1e6, 5, 3))
        .with_resistor(Resistor::new(4.7e3, 5, 4))
        .with_bjt(Bjt::new(doping, semiconductor, 3, 4, 0))
}

/// 12AX7 common-cathode gain stage on a 250 V supply.
///
/// Nodes: 1 input, 2 grid, 3 anode, 4 cathode, 5 supply, 6 output.
pub fn tube_stage(model: Model12AX7) -> CircuitLayout {
    CircuitLayout::new(7, VoltageInput::new(1, 0), VoltageOutput::new(6, 0))
        .with_voltage_source(VoltageSource::new(250.0, 5))
        // input coupling and grid leak
        .with_capacitor(Capacitor::new(22e-9, 1, 2))
        .with_resistor(Resistor::new(1e6, 2, 0))
        // plate load
        .with_resistor(Resistor::new(100e3, 5, 3))
        // bypassed cathode bias
        .with_resistor(Resistor::new(1.5e3, 4, 0))
        .with_capacitor(Capacitor::new(22e-6, 4, 0))
        // output coupling into a 1M load
        .with_capacitor(Capacitor::new(22e-9, 3, 6))
        .with_resistor(Resistor::new(1e6, 6, 0))
        .with_tube(Tube12AX7::new(model, 2, 3, 4))
        .with_dc_blocker(true)
}
