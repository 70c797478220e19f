//! Mapping from a normalized control position to a physical resistance.
//!
//! Every variable element (a [`VariableResistor`](super::VariableResistor) or
//! either leg of a [`Potentiometer`](super::Potentiometer)) goes through
//! [`map_resistance`]:
//!
//! 1. start from the clamped position v in [0, 1]
//! 2. `InvProportional` replaces v with 1 - v
//! 3. `Log` replaces v with v^10
//! 4. v is floored at [`MIN_TRAVEL`]
//! 5. the result is v * max_value
//!
//! The `Log` curve is a steep power law, not an audio-taper approximation:
//! almost all of the resistance change happens in the last part of travel.

/// How the control position relates to resistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamDirection {
    /// Larger position, larger resistance.
    Proportional,
    /// Larger position, smaller resistance.
    InvProportional,
}

impl ParamDirection {
    /// The other direction.
    pub fn opposite(self) -> Self {
        match self {
            ParamDirection::Proportional => ParamDirection::InvProportional,
            ParamDirection::InvProportional => ParamDirection::Proportional,
        }
    }
}

/// Taper curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skew {
    Linear,
    Log,
}

/// Smallest fraction of the maximum value a variable element can reach.
pub const MIN_TRAVEL: f64 = 0.001;

/// Exponent of the `Log` taper.
pub const LOG_TAPER_EXPONENT: f64 = 10.0;

/// Clamp a requested position into [0, 1].
///
/// NaN is treated as fully counter-clockwise (0).
pub fn clamp_normalized(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Resistance for a position, direction, taper and maximum value.
pub fn map_resistance(value: f64, direction: ParamDirection, skew: Skew, max_value: f64) -> f64 {
    let mut v = clamp_normalized(value);

    if direction == ParamDirection::InvProportional {
        v = 1.0 - v;
    }

    if skew == Skew::Log {
        v = v.powf(LOG_TAPER_EXPONENT);
    }

    if v < MIN_TRAVEL {
        v = MIN_TRAVEL;
    }

    v * max_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_proportional_midpoint() {
        assert_relative_eq!(
            map_resistance(0.5, ParamDirection::Proportional, Skew::Linear, 10_000.0),
            5000.0
        );
    }

    #[test]
    fn test_floor_prevents_short() {
        assert_relative_eq!(
            map_resistance(0.0, ParamDirection::Proportional, Skew::Linear, 10_000.0),
            10.0
        );
        assert_relative_eq!(
            map_resistance(1.0, ParamDirection::InvProportional, Skew::Log, 10_000.0),
            10.0
        );
    }

    #[test]
    fn test_log_taper_is_tenth_power() {
        let r = map_resistance(0.8, ParamDirection::Proportional, Skew::Log, 10_000.0);
        assert_relative_eq!(r, 10_000.0 * 0.8f64.powi(10), epsilon = 1e-9);
        assert_relative_eq!(r, 1073.741824, epsilon = 1e-6);
    }

    #[test]
    fn test_log_taper_floor_applies_after_power() {
        // 0.5^10 is below the floor
        let r = map_resistance(0.5, ParamDirection::Proportional, Skew::Log, 10_000.0);
        assert_relative_eq!(r, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range_positions_are_clamped() {
        let max = 47_000.0;
        for (requested, clamped) in [(-3.0, 0.0), (1.7, 1.0), (f64::NAN, 0.0)] {
            for dir in [ParamDirection::Proportional, ParamDirection::InvProportional] {
                for skew in [Skew::Linear, Skew::Log] {
                    assert_eq!(
                        map_resistance(requested, dir, skew, max),
                        map_resistance(clamped, dir, skew, max)
                    );
                }
            }
        }
    }

    #[test]
    fn test_bounds_and_monotonicity() {
        let max = 250_000.0;
        let mut prev_up = 0.0;
        let mut prev_down = f64::INFINITY;
        for i in 0..=100 {
            let v = i as f64 / 100.0;
            let up = map_resistance(v, ParamDirection::Proportional, Skew::Linear, max);
            let down = map_resistance(v, ParamDirection::InvProportional, Skew::Linear, max);
            for r in [up, down] {
                assert!(r >= MIN_TRAVEL * max && r <= max);
            }
            assert!(up >= prev_up);
            // strictly decreasing until the floor is reached at v = 1
            if i < 100 {
                assert!(down < prev_down);
            }
            prev_up = up;
            prev_down = down;
        }
    }

    #[test]
    fn test_opposite_direction() {
        assert_eq!(
            ParamDirection::Proportional.opposite(),
            ParamDirection::InvProportional
        );
        assert_eq!(
            ParamDirection::InvProportional.opposite(),
            ParamDirection::Proportional
        );
    }
}
