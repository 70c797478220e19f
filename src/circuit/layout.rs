//! The circuit layout (netlist) handed to an engine.

use crate::components::{
    Bjt, Capacitor, Diode, OpAmp, Potentiometer, Resistor, Tube12AX7, VariableResistor,
    VoltageInput, VoltageOutput, VoltageSource,
};
use crate::error::Result;

/// A complete netlist: node count, one input pair, one output pair and an
/// ordered list per element kind.
///
/// A layout is a plain value. Engines copy it on construction; after that,
/// changes go through parameter updates, never through editing the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitLayout {
    /// Number of nodes, including ground (node 0).
    pub num_nodes: usize,
    pub vin: VoltageInput,
    pub vout: VoltageOutput,
    pub voltage_sources: Vec<VoltageSource>,
    pub resistors: Vec<Resistor>,
    pub variable_resistors: Vec<VariableResistor>,
    pub potentiometers: Vec<Potentiometer>,
    pub capacitors: Vec<Capacitor>,
    pub op_amps: Vec<OpAmp>,
    pub diodes: Vec<Diode>,
    pub bjts: Vec<Bjt>,
    pub tubes: Vec<Tube12AX7>,
    /// Remove DC from the output with a first-order high-pass.
    pub has_dc_blocker: bool,
    /// Informational output tag; engines do not interpret it.
    pub output_tag: f32,
}

impl Default for CircuitLayout {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            vin: VoltageInput::default(),
            vout: VoltageOutput::default(),
            voltage_sources: Vec::new(),
            resistors: Vec::new(),
            variable_resistors: Vec::new(),
            potentiometers: Vec::new(),
            capacitors: Vec::new(),
            op_amps: Vec::new(),
            diodes: Vec::new(),
            bjts: Vec::new(),
            tubes: Vec::new(),
            has_dc_blocker: false,
            output_tag: -1.0,
        }
    }
}

impl CircuitLayout {
    /// Start a layout with `num_nodes` nodes (ground included) and the given
    /// input/output pairs.
    pub fn new(num_nodes: usize, vin: VoltageInput, vout: VoltageOutput) -> Self {
        Self {
            num_nodes,
            vin,
            vout,
            ..Self::default()
        }
    }

    pub fn with_voltage_source(mut self, source: VoltageSource) -> Self {
        self.voltage_sources.push(source);
        self
    }

    pub fn with_resistor(mut self, resistor: Resistor) -> Self {
        self.resistors.push(resistor);
        self
    }

    pub fn with_variable_resistor(mut self, resistor: VariableResistor) -> Self {
        self.variable_resistors.push(resistor);
        self
    }

    pub fn with_potentiometer(mut self, pot: Potentiometer) -> Self {
        self.potentiometers.push(pot);
        self
    }

    pub fn with_capacitor(mut self, capacitor: Capacitor) -> Self {
        self.capacitors.push(capacitor);
        self
    }

    pub fn with_op_amp(mut self, op_amp: OpAmp) -> Self {
        self.op_amps.push(op_amp);
        self
    }

    pub fn with_diode(mut self, diode: Diode) -> Self {
        self.diodes.push(diode);
        self
    }

    pub fn with_bjt(mut self, bjt: Bjt) -> Self {
        self.bjts.push(bjt);
        self
    }

    pub fn with_tube(mut self, tube: Tube12AX7) -> Self {
        self.tubes.push(tube);
        self
    }

    pub fn with_dc_blocker(mut self, enabled: bool) -> Self {
        self.has_dc_blocker = enabled;
        self
    }

    pub fn with_output_tag(mut self, tag: f32) -> Self {
        self.output_tag = tag;
        self
    }

    /// Check node references and element values. See [`validate_layout`](super::validate_layout).
    pub fn validate(&self) -> Result<()> {
        super::validate_layout(self)
    }

    /// Number of entries a parameter vector needs to reach every variable element.
    pub fn num_parameters(&self) -> usize {
        self.variable_resistors
            .iter()
            .map(|r| r.parameter_index() + 1)
            .chain(self.potentiometers.iter().map(|p| p.parameter_index() + 1))
            .max()
            .unwrap_or(0)
    }

    /// Initial position of each parameter: the first element bound to it wins.
    pub fn initial_parameters(&self) -> Vec<f64> {
        let mut values: Vec<Option<f64>> = vec![None; self.num_parameters()];
        let controls = self
            .variable_resistors
            .iter()
            .map(|r| (r.parameter_index(), r.normalized_value()))
            .chain(
                self.potentiometers
                    .iter()
                    .map(|p| (p.parameter_index(), p.normalized_value())),
            );
        for (index, value) in controls {
            values[index].get_or_insert(value);
        }
        values.into_iter().map(|v| v.unwrap_or(0.0)).collect()
    }

    /// Whether any element requires Newton-Raphson iteration.
    pub fn is_nonlinear(&self) -> bool {
        !(self.diodes.is_empty() && self.bjts.is_empty() && self.tubes.is_empty())
    }
}
