//! A layout compiled into matrix-indexed stamps.

use crate::circuit::{BranchId, CircuitLayout, NodeId};
use crate::components::{DiodeConfiguration, Doping, VariableResistor};
use crate::error::Result;

use super::devices::{self, JunctionParams, KorenParams};
use super::mna::MnaMatrix;
use super::MIN_CONDUCTANCE;

/// Open-loop gain of every op-amp.
const OPAMP_GAIN: f64 = 2e5;
/// Output resistance of every op-amp.
const OPAMP_R_OUT: f64 = 75.0;
/// Differential input resistance of every op-amp.
const OPAMP_R_IN: f64 = 2e6;

type Row = Option<usize>;

fn row(node: NodeId) -> Row {
    node.matrix_index()
}

#[derive(Debug, Clone)]
pub(crate) struct VariableLeg {
    pub n1: Row,
    pub n2: Row,
    pub resistor: VariableResistor,
}

impl VariableLeg {
    /// Conductance of this leg with its parameter at `normalized`.
    pub fn conductance(&self, normalized: f64) -> f64 {
        1.0 / self.resistor.value_at(normalized)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OpAmpStamp {
    pub pos: Row,
    pub neg: Row,
    pub out: Row,
    pub reference: Row,
}

#[derive(Debug, Clone)]
pub(crate) struct DiodeStamp {
    pub anode: Row,
    pub cathode: Row,
    pub params: JunctionParams,
    pub matched_pair: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct BjtStamp {
    pub base: Row,
    pub collector: Row,
    pub emitter: Row,
    pub doping: Doping,
    pub params: JunctionParams,
}

#[derive(Debug, Clone)]
pub(crate) struct TriodeStamp {
    pub grid: Row,
    pub anode: Row,
    pub cathode: Row,
    pub params: KorenParams,
}

/// Trapezoidal companion history of one capacitor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Companion {
    pub v_prev: f64,
    pub i_prev: f64,
}

/// Last linearization voltages of every nonlinear element.
#[derive(Debug, Clone, Default)]
pub(crate) struct Junctions {
    pub diodes: Vec<f64>,
    pub bjts: Vec<[f64; 2]>,
    pub triodes: Vec<[f64; 2]>,
}

impl Junctions {
    pub fn reset(&mut self) {
        self.diodes.fill(0.0);
        self.bjts.fill([0.0; 2]);
        self.triodes.fill([0.0; 2]);
    }
}

/// Everything that changes between stamps.
pub(crate) struct StampInputs<'a> {
    /// Voltage driven across the input pair.
    pub input: f64,
    /// Current conductance of every variable leg.
    pub legs: &'a [f64],
    /// Capacitor history; `None` leaves capacitors open (DC analysis).
    pub companions: Option<(&'a [Companion], f64)>,
}

/// Compiled netlist. Node rows come first, then one branch row for the
/// input source and one per fixed voltage source.
#[derive(Debug, Clone)]
pub(crate) struct Netlist {
    pub num_nodes: usize,
    pub size: usize,
    input: (Row, Row, usize),
    output: (Row, Row),
    sources: Vec<(Row, usize, f64)>,
    conductances: Vec<(Row, Row, f64)>,
    pub legs: Vec<VariableLeg>,
    capacitors: Vec<(Row, Row, f64)>,
    op_amps: Vec<OpAmpStamp>,
    diodes: Vec<DiodeStamp>,
    bjts: Vec<BjtStamp>,
    triodes: Vec<TriodeStamp>,
    nonlinear: bool,
    pub has_dc_blocker: bool,
    pub num_parameters: usize,
    pub initial_parameters: Vec<f64>,
}

impl Netlist {
    /// Validate and compile a layout.
    pub fn compile(layout: &CircuitLayout) -> Result<Self> {
        layout.validate()?;

        let num_nodes = layout.num_nodes;
        let mut next_branch = 0usize;
        let mut branch = || {
            let b = BranchId(next_branch).matrix_index(num_nodes);
            next_branch += 1;
            b
        };

        let input = (row(layout.vin.node1()), row(layout.vin.node2()), branch());
        let sources = layout
            .voltage_sources
            .iter()
            .map(|vs| (row(vs.node()), branch(), vs.voltage()))
            .collect();

        let legs = layout
            .variable_resistors
            .iter()
            .cloned()
            .chain(
                layout
                    .potentiometers
                    .iter()
                    .flat_map(|p| p.legs().map(|leg| leg.clone())),
            )
            .map(|resistor| VariableLeg {
                n1: row(resistor.node1()),
                n2: row(resistor.node2()),
                resistor,
            })
            .collect();

        let diodes = layout
            .diodes
            .iter()
            .map(|d| DiodeStamp {
                anode: row(d.node1()),
                cathode: row(d.node2()),
                params: JunctionParams::new(
                    d.saturation_current(),
                    d.thermal_voltage(),
                    d.emission_coeff(),
                ),
                matched_pair: d.configuration() == DiodeConfiguration::MatchedPair,
            })
            .collect();

        let bjts = layout
            .bjts
            .iter()
            .map(|q| BjtStamp {
                base: row(q.node_base()),
                collector: row(q.node_collector()),
                emitter: row(q.node_emitter()),
                doping: q.doping(),
                params: JunctionParams::new(
                    q.saturation_current(),
                    q.thermal_voltage(),
                    q.emission_coeff(),
                ),
            })
            .collect();

        let triodes = layout
            .tubes
            .iter()
            .map(|t| TriodeStamp {
                grid: row(t.node_grid()),
                anode: row(t.node_anode()),
                cathode: row(t.node_cathode()),
                params: KorenParams::for_model(t.model()),
            })
            .collect();

        Ok(Self {
            num_nodes,
            size: (num_nodes - 1) + next_branch,
            input,
            output: (row(layout.vout.node1()), row(layout.vout.node2())),
            sources,
            conductances: layout
                .resistors
                .iter()
                .map(|r| (row(r.node1()), row(r.node2()), 1.0 / r.value()))
                .collect(),
            legs,
            capacitors: layout
                .capacitors
                .iter()
                .map(|c| (row(c.node1()), row(c.node2()), c.value()))
                .collect(),
            op_amps: layout
                .op_amps
                .iter()
                .map(|op| OpAmpStamp {
                    pos: row(op.non_inverting_node()),
                    neg: row(op.inverting_node()),
                    out: row(op.output_node()),
                    reference: row(op.ground_node()),
                })
                .collect(),
            diodes,
            bjts,
            triodes,
            nonlinear: layout.is_nonlinear(),
            has_dc_blocker: layout.has_dc_blocker,
            num_parameters: layout.num_parameters(),
            initial_parameters: layout.initial_parameters(),
        })
    }

    pub fn is_nonlinear(&self) -> bool {
        self.nonlinear
    }

    pub fn num_capacitors(&self) -> usize {
        self.capacitors.len()
    }

    /// Fresh (all-zero) junction state sized for this netlist.
    pub fn junctions(&self) -> Junctions {
        Junctions {
            diodes: vec![0.0; self.diodes.len()],
            bjts: vec![[0.0; 2]; self.bjts.len()],
            triodes: vec![[0.0; 2]; self.triodes.len()],
        }
    }

    /// Conductance of every variable leg for the given parameter positions.
    pub fn leg_conductances(&self, parameters: &[f64], out: &mut [f64]) {
        for (g, leg) in out.iter_mut().zip(&self.legs) {
            *g = leg.conductance(parameters[leg.resistor.parameter_index()]);
        }
    }

    /// Stamp every element into a cleared matrix, linearizing nonlinear
    /// elements around `matrix.x`.
    pub fn stamp(&self, m: &mut MnaMatrix, inputs: &StampInputs<'_>, junctions: &mut Junctions) {
        for i in 0..(self.num_nodes - 1) {
            m.add(i, i, MIN_CONDUCTANCE);
        }

        let (in1, in2, br) = self.input;
        m.stamp_voltage_source(in1, in2, br, inputs.input);

        for &(node, br, voltage) in &self.sources {
            m.stamp_voltage_source(node, None, br, voltage);
        }

        for &(n1, n2, g) in &self.conductances {
            m.stamp_conductance(n1, n2, g);
        }

        for (leg, &g) in self.legs.iter().zip(inputs.legs) {
            m.stamp_conductance(leg.n1, leg.n2, g);
        }

        if let Some((companions, dt)) = inputs.companions {
            for (&(n1, n2, c), state) in self.capacitors.iter().zip(companions) {
                let g = 2.0 * c / dt;
                m.stamp_conductance(n1, n2, g);
                // Companion current source (history term)
                m.stamp_current_source(n1, n2, -(g * state.v_prev + state.i_prev));
            }
        }

        for op in &self.op_amps {
            // VCCS into the output node plus output resistance to the reference:
            //   Vout - Vref = gm * R_out * (V+ - V-) = A * (V+ - V-)
            m.stamp_vccs(op.reference, op.out, op.pos, op.neg, OPAMP_GAIN / OPAMP_R_OUT);
            m.stamp_conductance(op.out, op.reference, 1.0 / OPAMP_R_OUT);
            m.stamp_conductance(op.pos, op.neg, 1.0 / OPAMP_R_IN);
        }

        self.stamp_nonlinear(m, junctions);
    }

    fn stamp_nonlinear(&self, m: &mut MnaMatrix, junctions: &mut Junctions) {
        for (d, v_op) in self.diodes.iter().zip(junctions.diodes.iter_mut()) {
            let v = m.voltage(d.anode) - m.voltage(d.cathode);
            *v_op = devices::limit_diode(v, *v_op, &d.params, d.matched_pair);
            let (i, g) = devices::diode(*v_op, &d.params, d.matched_pair);
            m.stamp_conductance(d.anode, d.cathode, g);
            m.stamp_current_source(d.anode, d.cathode, i - g * *v_op);
        }

        for (q, v_op) in self.bjts.iter().zip(junctions.bjts.iter_mut()) {
            let v_b = m.voltage(q.base);
            let v_new = [v_b - m.voltage(q.emitter), v_b - m.voltage(q.collector)];
            *v_op = devices::limit_bjt(v_new, *v_op, q.doping, &q.params);
            let [vbe, vbc] = *v_op;
            let op = devices::bjt(vbe, vbc, q.doping, &q.params);

            // Collector current, collector -> emitter
            m.stamp_vccs(q.collector, q.emitter, q.base, q.emitter, op.dic_dvbe);
            m.stamp_vccs(q.collector, q.emitter, q.base, q.collector, op.dic_dvbc);
            m.stamp_current_source(
                q.collector,
                q.emitter,
                op.ic - op.dic_dvbe * vbe - op.dic_dvbc * vbc,
            );

            // Base current, base -> emitter
            m.stamp_vccs(q.base, q.emitter, q.base, q.emitter, op.dib_dvbe);
            m.stamp_vccs(q.base, q.emitter, q.base, q.collector, op.dib_dvbc);
            m.stamp_current_source(
                q.base,
                q.emitter,
                op.ib - op.dib_dvbe * vbe - op.dib_dvbc * vbc,
            );
        }

        for (t, v_op) in self.triodes.iter().zip(junctions.triodes.iter_mut()) {
            let v_k = m.voltage(t.cathode);
            let v_new = [m.voltage(t.grid) - v_k, m.voltage(t.anode) - v_k];
            *v_op = devices::limit_triode(v_new, *v_op);
            let [vgk, vpk] = *v_op;
            let op = devices::triode(vgk, vpk, &t.params);

            // Plate current, anode -> cathode
            m.stamp_vccs(t.anode, t.cathode, t.grid, t.cathode, op.dip_dvgk);
            m.stamp_conductance(t.anode, t.cathode, op.dip_dvpk);
            m.stamp_current_source(
                t.anode,
                t.cathode,
                op.ip - op.dip_dvgk * vgk - op.dip_dvpk * vpk,
            );

            // Grid current, grid -> cathode
            m.stamp_conductance(t.grid, t.cathode, op.dig_dvgk);
            m.stamp_current_source(t.grid, t.cathode, op.ig - op.dig_dvgk * vgk);
        }
    }

    /// Advance capacitor history after a converged time step.
    pub fn update_companions(&self, m: &MnaMatrix, companions: &mut [Companion], dt: f64) {
        for (&(n1, n2, c), state) in self.capacitors.iter().zip(companions.iter_mut()) {
            let v = m.voltage(n1) - m.voltage(n2);
            let g = 2.0 * c / dt;
            let i = g * (v - state.v_prev) - state.i_prev;
            state.v_prev = v;
            state.i_prev = i;
        }
    }

    /// Charge every capacitor to its DC operating-point voltage.
    pub fn settle_companions(&self, m: &MnaMatrix, companions: &mut [Companion]) {
        for (&(n1, n2, _), state) in self.capacitors.iter().zip(companions.iter_mut()) {
            state.v_prev = m.voltage(n1) - m.voltage(n2);
            state.i_prev = 0.0;
        }
    }

    /// Differential voltage across the output pair.
    pub fn output(&self, m: &MnaMatrix) -> f64 {
        m.voltage(self.output.0) - m.voltage(self.output.1)
    }
}
