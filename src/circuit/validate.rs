//! Layout validation.

use crate::circuit::NodeId;
use crate::error::{CircuitError, Result};

use super::CircuitLayout;

/// Validate a layout before an engine is built from it.
///
/// Checks:
/// - At least two nodes (ground plus one)
/// - Every port and element terminal names an existing node
/// - Input and output pairs are two distinct nodes
/// - Fixed element values are positive and finite
///
/// Connectivity (floating nodes, source loops) is left to the engine.
pub fn validate_layout(layout: &CircuitLayout) -> Result<()> {
    if layout.num_nodes < 2 {
        return Err(CircuitError::invalid_topology(format!(
            "layout needs ground plus at least one node, got {} nodes",
            layout.num_nodes
        )));
    }

    let check = |element: String, node: NodeId| -> Result<()> {
        if node.0 >= layout.num_nodes {
            Err(CircuitError::invalid_node(element, node.0, layout.num_nodes))
        } else {
            Ok(())
        }
    };

    let (in1, in2) = (layout.vin.node1(), layout.vin.node2());
    check("voltage input".to_string(), in1)?;
    check("voltage input".to_string(), in2)?;
    if in1 == in2 {
        return Err(CircuitError::invalid_topology(format!(
            "voltage input is shorted: both terminals on {in1}"
        )));
    }

    let (out1, out2) = (layout.vout.node1(), layout.vout.node2());
    check("voltage output".to_string(), out1)?;
    check("voltage output".to_string(), out2)?;
    if out1 == out2 {
        return Err(CircuitError::invalid_topology(format!(
            "voltage output measures {out1} against itself"
        )));
    }

    for (i, vs) in layout.voltage_sources.iter().enumerate() {
        let name = format!("voltage source #{i}");
        check(name.clone(), vs.node())?;
        if vs.node().is_ground() {
            return Err(CircuitError::invalid_topology(format!(
                "{name} is attached to ground"
            )));
        }
        if !vs.voltage().is_finite() {
            return Err(CircuitError::invalid_value(name, "voltage must be finite"));
        }
    }

    for (i, r) in layout.resistors.iter().enumerate() {
        let name = format!("resistor #{i}");
        check(name.clone(), r.node1())?;
        check(name.clone(), r.node2())?;
        positive(&name, r.value(), "resistance")?;
    }

    for (i, r) in layout.variable_resistors.iter().enumerate() {
        let name = format!("variable resistor #{i}");
        check(name.clone(), r.node1())?;
        check(name, r.node2())?;
    }

    for (i, p) in layout.potentiometers.iter().enumerate() {
        let name = format!("potentiometer #{i}");
        check(name.clone(), p.node1())?;
        check(name.clone(), p.node2())?;
        check(name, p.node3())?;
    }

    for (i, c) in layout.capacitors.iter().enumerate() {
        let name = format!("capacitor #{i}");
        check(name.clone(), c.node1())?;
        check(name.clone(), c.node2())?;
        positive(&name, c.value(), "capacitance")?;
    }

    for (i, op) in layout.op_amps.iter().enumerate() {
        for node in op.nodes() {
            check(format!("op-amp #{i}"), node)?;
        }
    }

    for (i, d) in layout.diodes.iter().enumerate() {
        let name = format!("diode #{i}");
        check(name.clone(), d.node1())?;
        check(name.clone(), d.node2())?;
        positive(&name, d.saturation_current(), "saturation current")?;
        positive(&name, d.thermal_voltage() * d.emission_coeff(), "eta * Vt")?;
    }

    for (i, q) in layout.bjts.iter().enumerate() {
        let name = format!("BJT #{i}");
        for node in [q.node_base(), q.node_collector(), q.node_emitter()] {
            check(name.clone(), node)?;
        }
        positive(&name, q.saturation_current(), "saturation current")?;
        positive(&name, q.thermal_voltage() * q.emission_coeff(), "eta * Vt")?;
    }

    for (i, t) in layout.tubes.iter().enumerate() {
        for node in [t.node_grid(), t.node_anode(), t.node_cathode()] {
            check(format!("12AX7 #{i}"), node)?;
        }
    }

    Ok(())
}

fn positive(element: &str, value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CircuitError::invalid_value(
            element,
            format!("{what} must be positive and finite, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;

    fn rc() -> CircuitLayout {
        CircuitLayout::new(3, VoltageInput::new(1, 0), VoltageOutput::new(2, 0))
            .with_resistor(Resistor::new(1e3, 1, 2))
            .with_capacitor(Capacitor::new(1e-6, 2, 0))
    }

    #[test]
    fn test_valid_layout() {
        assert!(validate_layout(&rc()).is_ok());
    }

    #[test]
    fn test_too_few_nodes() {
        let layout = CircuitLayout::default();
        assert!(matches!(
            validate_layout(&layout),
            Err(CircuitError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_node_out_of_range() {
        let layout = rc().with_resistor(Resistor::new(1e3, 2, 3));
        assert_eq!(
            validate_layout(&layout),
            Err(CircuitError::invalid_node("resistor #1", 3, 3))
        );
    }

    #[test]
    fn test_output_out_of_range() {
        let mut layout = rc();
        layout.vout = VoltageOutput::new(5, 0);
        assert!(matches!(
            validate_layout(&layout),
            Err(CircuitError::InvalidNode { node: 5, .. })
        ));
    }

    #[test]
    fn test_shorted_ports() {
        let mut layout = rc();
        layout.vin = VoltageInput::new(1, 1);
        assert!(validate_layout(&layout).is_err());

        let mut layout = rc();
        layout.vout = VoltageOutput::new(0, 0);
        assert!(validate_layout(&layout).is_err());
    }

    #[test]
    fn test_bad_values() {
        let layout = rc().with_resistor(Resistor::new(0.0, 1, 0));
        assert!(matches!(
            validate_layout(&layout),
            Err(CircuitError::InvalidValue { .. })
        ));

        let layout = rc().with_capacitor(Capacitor::new(f64::NAN, 1, 0));
        assert!(validate_layout(&layout).is_err());

        let mut d = Diode::new(Semiconductor::Silicon, DiodeConfiguration::Single, 2, 0);
        d.set_thermal_voltage(0.0);
        assert!(validate_layout(&rc().with_diode(d)).is_err());
    }

    #[test]
    fn test_op_amp_reference_checked() {
        let layout = rc().with_op_amp(OpAmp::with_ground(0, 1, 2, 9));
        assert!(matches!(
            validate_layout(&layout),
            Err(CircuitError::InvalidNode { node: 9, .. })
        ));
    }

    #[test]
    fn test_grounded_source_rejected() {
        let layout = rc().with_voltage_source(VoltageSource::new(9.0, 0));
        assert!(validate_layout(&layout).is_err());
    }
}
