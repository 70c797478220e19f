//! User-controlled elements: VariableResistor and Potentiometer.

use super::taper::{clamp_normalized, map_resistance, ParamDirection, Skew};
use crate::circuit::NodeId;
use crate::error::{CircuitError, Result};

fn check_control(element: &str, max_value: f64, parameter_number: usize) -> Result<()> {
    if parameter_number == 0 {
        return Err(CircuitError::InvalidParameterNumber {
            element: element.to_string(),
            number: parameter_number,
        });
    }
    if !max_value.is_finite() || max_value <= 0.0 {
        return Err(CircuitError::invalid_value(
            element,
            format!("maximum value must be a positive number of ohms, got {max_value}"),
        ));
    }
    Ok(())
}

/// A two-terminal resistance driven by one user parameter.
///
/// The stored position is always in [0, 1]; the resistance is always in
/// [0.001 * max_value, max_value].
#[derive(Debug, Clone, PartialEq)]
pub struct VariableResistor {
    max_value: f64,
    /// 0-based index into the parameter vector.
    parameter_index: usize,
    direction: ParamDirection,
    skew: Skew,
    node1: NodeId,
    node2: NodeId,
    value: f64,
}

impl VariableResistor {
    /// Create a variable resistor.
    ///
    /// `parameter_number` is 1-based; it is stored as a 0-based index.
    pub fn new(
        max_value: f64,
        parameter_number: usize,
        direction: ParamDirection,
        skew: Skew,
        node1: usize,
        node2: usize,
        init_value: f64,
    ) -> Result<Self> {
        check_control("variable resistor", max_value, parameter_number)?;
        Ok(Self {
            max_value,
            parameter_index: parameter_number - 1,
            direction,
            skew,
            node1: NodeId(node1),
            node2: NodeId(node2),
            value: clamp_normalized(init_value),
        })
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// 0-based index into the parameter vector.
    pub fn parameter_index(&self) -> usize {
        self.parameter_index
    }

    pub fn direction(&self) -> ParamDirection {
        self.direction
    }

    pub fn skew(&self) -> Skew {
        self.skew
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn node2(&self) -> NodeId {
        self.node2
    }

    /// Set the normalized position, clamped into [0, 1].
    pub fn set_value(&mut self, normalized: f64) {
        self.value = clamp_normalized(normalized);
    }

    /// The stored normalized position.
    pub fn normalized_value(&self) -> f64 {
        self.value
    }

    /// Resistance in ohms for the current position.
    pub fn value(&self) -> f64 {
        map_resistance(self.value, self.direction, self.skew, self.max_value)
    }

    /// Resistance this element would have at `normalized`, without storing it.
    pub fn value_at(&self, normalized: f64) -> f64 {
        map_resistance(normalized, self.direction, self.skew, self.max_value)
    }
}

/// A three-terminal potentiometer.
///
/// Two variable resistors share one position and maximum value:
///   node1 ----[leg1]---- node2 (wiper) ----[leg2]---- node3
///
/// leg1 follows the requested direction and leg2 the opposite one, so one leg
/// shrinks as the other grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Potentiometer {
    direction: ParamDirection,
    node3: NodeId,
    leg1: VariableResistor,
    leg2: VariableResistor,
}

impl Potentiometer {
    /// Create a potentiometer. `parameter_number` is 1-based.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_value: f64,
        parameter_number: usize,
        direction: ParamDirection,
        skew: Skew,
        node1: usize,
        node2: usize,
        node3: usize,
        init_value: f64,
    ) -> Result<Self> {
        check_control("potentiometer", max_value, parameter_number)?;
        let leg1 = VariableResistor::new(
            max_value,
            parameter_number,
            direction,
            skew,
            node1,
            node2,
            init_value,
        )?;
        let leg2 = VariableResistor::new(
            max_value,
            parameter_number,
            direction.opposite(),
            skew,
            node2,
            node3,
            init_value,
        )?;
        Ok(Self {
            direction,
            node3: NodeId(node3),
            leg1,
            leg2,
        })
    }

    /// Leg between node1 and the wiper.
    pub fn variable_resistor1(&self) -> &VariableResistor {
        &self.leg1
    }

    /// Leg between the wiper and node3.
    pub fn variable_resistor2(&self) -> &VariableResistor {
        &self.leg2
    }

    pub fn max_value(&self) -> f64 {
        self.leg1.max_value()
    }

    /// 0-based index into the parameter vector.
    pub fn parameter_index(&self) -> usize {
        self.leg1.parameter_index()
    }

    pub fn direction(&self) -> ParamDirection {
        self.direction
    }

    pub fn skew(&self) -> Skew {
        self.leg1.skew()
    }

    pub fn node1(&self) -> NodeId {
        self.leg1.node1()
    }

    /// The wiper.
    pub fn node2(&self) -> NodeId {
        self.leg1.node2()
    }

    pub fn node3(&self) -> NodeId {
        self.node3
    }

    /// Move the wiper; both legs receive the same clamped position.
    pub fn set_value(&mut self, normalized: f64) {
        self.leg1.set_value(normalized);
        self.leg2.set_value(normalized);
    }

    pub fn normalized_value(&self) -> f64 {
        self.leg1.normalized_value()
    }

    /// Resistance seen along the potentiometer's own direction (leg1).
    pub fn value(&self) -> f64 {
        self.leg1.value()
    }

    /// Both legs, in node order.
    pub fn legs(&self) -> [&VariableResistor; 2] {
        [&self.leg1, &self.leg2]
    }
}
