//! Large-signal device equations used by the engine.
//!
//! Each nonlinear element is linearized around an operating point for
//! Newton-Raphson:
//!   I ≈ I0 + Σ g_k * (V_k - V_k0)
//!
//! Junction voltages are limited between iterations (SPICE `pnjlim`) so the
//! exponentials stay finite and the iteration does not overshoot.

use crate::components::{Doping, Model12AX7};

/// Largest exponent evaluated directly; beyond it the exponential continues linearly.
const EXP_LIMIT: f64 = 80.0;

/// Conductance added across every junction so reverse bias never decouples a node.
pub const JUNCTION_GMIN: f64 = 1e-12;

/// exp(x) with a linear continuation above [`EXP_LIMIT`].
/// Returns (value, derivative).
fn limited_exp(x: f64) -> (f64, f64) {
    if x > EXP_LIMIT {
        let e = EXP_LIMIT.exp();
        (e * (1.0 + x - EXP_LIMIT), e)
    } else {
        let e = x.exp();
        (e, e)
    }
}

/// Shockley junction current and conductance at voltage `v`.
pub fn junction(v: f64, is: f64, n_vt: f64) -> (f64, f64) {
    let (e, de) = limited_exp(v / n_vt);
    (is * (e - 1.0), is / n_vt * de)
}

/// Voltage above which junction steps are compressed logarithmically.
pub fn critical_voltage(is: f64, n_vt: f64) -> f64 {
    n_vt * (n_vt / (std::f64::consts::SQRT_2 * is)).ln()
}

/// Limit a forward junction step from `v_old` to `v_new`.
pub fn limit_junction(v_new: f64, v_old: f64, n_vt: f64, v_crit: f64) -> f64 {
    if v_new > v_crit && (v_new - v_old).abs() > 2.0 * n_vt {
        if v_old > 0.0 {
            let arg = 1.0 + (v_new - v_old) / n_vt;
            if arg > 0.0 {
                v_old + n_vt * arg.ln()
            } else {
                v_crit
            }
        } else {
            n_vt * (v_new / n_vt).ln()
        }
    } else {
        v_new
    }
}

/// Junction constants resolved for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionParams {
    pub is: f64,
    pub n_vt: f64,
    pub v_crit: f64,
}

impl JunctionParams {
    pub fn new(saturation_current: f64, thermal_voltage: f64, emission_coeff: f64) -> Self {
        let n_vt = emission_coeff * thermal_voltage;
        Self {
            is: saturation_current,
            n_vt,
            v_crit: critical_voltage(saturation_current, n_vt),
        }
    }

    pub fn limit(&self, v_new: f64, v_old: f64) -> f64 {
        limit_junction(v_new, v_old, self.n_vt, self.v_crit)
    }
}

/// Diode current and conductance. A matched pair is two anti-parallel diodes.
pub fn diode(v: f64, params: &JunctionParams, matched_pair: bool) -> (f64, f64) {
    let (i_fwd, g_fwd) = junction(v, params.is, params.n_vt);
    if matched_pair {
        let (i_rev, g_rev) = junction(-v, params.is, params.n_vt);
        (i_fwd - i_rev, g_fwd + g_rev + JUNCTION_GMIN)
    } else {
        (i_fwd, g_fwd + JUNCTION_GMIN)
    }
}

/// Limit a diode step; a matched pair is limited symmetrically.
pub fn limit_diode(v_new: f64, v_old: f64, params: &JunctionParams, matched_pair: bool) -> f64 {
    if matched_pair && v_new < 0.0 {
        -params.limit(-v_new, -v_old)
    } else {
        params.limit(v_new, v_old)
    }
}

/// Forward current gain used for every BJT.
pub const BETA_F: f64 = 100.0;
/// Reverse current gain used for every BJT.
pub const BETA_R: f64 = 1.0;

/// Linearized Ebers-Moll transistor at (Vbe, Vbc).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BjtOperatingPoint {
    /// Collector current (into the collector).
    pub ic: f64,
    /// Base current (into the base).
    pub ib: f64,
    pub dic_dvbe: f64,
    pub dic_dvbc: f64,
    pub dib_dvbe: f64,
    pub dib_dvbc: f64,
}

/// Ebers-Moll (transport form) for NPN or PNP.
///
/// With the polarity sign s (+1 NPN, -1 PNP) and v' = s * v:
///   If = Is(exp(Vbe'/nVt) - 1),  Ir = Is(exp(Vbc'/nVt) - 1)
///   Ic = s * (If - Ir * (1 + 1/βR)),  Ib = s * (If/βF + Ir/βR)
/// The derivatives with respect to the real junction voltages do not
/// depend on s.
pub fn bjt(vbe: f64, vbc: f64, doping: Doping, params: &JunctionParams) -> BjtOperatingPoint {
    let s = match doping {
        Doping::Npn => 1.0,
        Doping::Pnp => -1.0,
    };
    let (i_f, g_f) = junction(s * vbe, params.is, params.n_vt);
    let (i_r, g_r) = junction(s * vbc, params.is, params.n_vt);

    BjtOperatingPoint {
        ic: s * (i_f - i_r * (1.0 + 1.0 / BETA_R)),
        ib: s * (i_f / BETA_F + i_r / BETA_R),
        dic_dvbe: g_f,
        dic_dvbc: -g_r * (1.0 + 1.0 / BETA_R),
        dib_dvbe: g_f / BETA_F + JUNCTION_GMIN,
        dib_dvbc: g_r / BETA_R + JUNCTION_GMIN,
    }
}

/// Limit both junctions of a BJT, in the device's own polarity.
pub fn limit_bjt(
    v_new: [f64; 2],
    v_old: [f64; 2],
    doping: Doping,
    params: &JunctionParams,
) -> [f64; 2] {
    let s = match doping {
        Doping::Npn => 1.0,
        Doping::Pnp => -1.0,
    };
    [
        s * params.limit(s * v_new[0], s * v_old[0]),
        s * params.limit(s * v_new[1], s * v_old[1]),
    ]
}

/// Koren triode constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KorenParams {
    pub mu: f64,
    pub ex: f64,
    pub kg1: f64,
    pub kp: f64,
    pub kvb: f64,
}

impl KorenParams {
    /// Fitted constants for each 12AX7 variant.
    pub fn for_model(model: Model12AX7) -> Self {
        match model {
            Model12AX7::Exh => Self {
                mu: 100.0,
                ex: 1.4,
                kg1: 1060.0,
                kp: 600.0,
                kvb: 300.0,
            },
            Model12AX7::Rsd1 => Self {
                mu: 100.0,
                ex: 1.33,
                kg1: 1200.0,
                kp: 520.0,
                kvb: 350.0,
            },
            Model12AX7::Rsd2 => Self {
                mu: 96.0,
                ex: 1.4,
                kg1: 1380.0,
                kp: 600.0,
                kvb: 300.0,
            },
        }
    }
}

/// Grid conduction: Ig = (VG/RG) * ln(1 + exp(Vgk/VG)), roughly Vgk/RG once
/// the grid goes positive and negligible below cutoff.
const GRID_RESISTANCE: f64 = 2000.0;
const GRID_KNEE: f64 = 0.2;

/// Anode-cathode leakage so a cut-off tube keeps the anode node defined.
const PLATE_LEAKAGE: f64 = 1e-9;

/// Largest per-iteration move of the grid-cathode voltage.
const MAX_VGK_STEP: f64 = 0.5;
/// Largest per-iteration move of the plate-cathode voltage.
const MAX_VPK_STEP: f64 = 20.0;

fn softplus(x: f64) -> f64 {
    if x > 30.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

/// Koren plate current:
///   E1 = Vpk/Kp * ln(1 + exp(Kp * (1/mu + Vgk/sqrt(Kvb + Vpk^2))))
///   Ip = 2 * E1^Ex / Kg1   (zero for Vpk <= 0)
pub fn plate_current(vgk: f64, vpk: f64, p: &KorenParams) -> f64 {
    if vpk <= 0.0 {
        return 0.0;
    }
    let e1 = vpk / p.kp * softplus(p.kp * (1.0 / p.mu + vgk / (p.kvb + vpk * vpk).sqrt()));
    if e1 <= 0.0 {
        0.0
    } else {
        2.0 * e1.powf(p.ex) / p.kg1
    }
}

/// Grid current and its derivative at Vgk.
pub fn grid_current(vgk: f64) -> (f64, f64) {
    let x = vgk / GRID_KNEE;
    let i = GRID_KNEE / GRID_RESISTANCE * softplus(x);
    let sigmoid = 1.0 / (1.0 + (-x).exp());
    (i, sigmoid / GRID_RESISTANCE)
}

/// Linearized triode at (Vgk, Vpk).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriodeOperatingPoint {
    pub ip: f64,
    pub dip_dvgk: f64,
    pub dip_dvpk: f64,
    pub ig: f64,
    pub dig_dvgk: f64,
}

pub fn triode(vgk: f64, vpk: f64, p: &KorenParams) -> TriodeOperatingPoint {
    const H: f64 = 1e-3;
    let ip = plate_current(vgk, vpk, p);
    let dip_dvgk = (plate_current(vgk + H, vpk, p) - plate_current(vgk - H, vpk, p)) / (2.0 * H);
    let dip_dvpk = (plate_current(vgk, vpk + H, p) - plate_current(vgk, vpk - H, p)) / (2.0 * H);
    let (ig, dig_dvgk) = grid_current(vgk);
    TriodeOperatingPoint {
        ip,
        dip_dvgk,
        dip_dvpk: dip_dvpk.max(0.0) + PLATE_LEAKAGE,
        ig,
        dig_dvgk: dig_dvgk + JUNCTION_GMIN,
    }
}

/// Limit a triode step from [Vgk, Vpk] old to new.
pub fn limit_triode(v_new: [f64; 2], v_old: [f64; 2]) -> [f64; 2] {
    [
        v_old[0] + (v_new[0] - v_old[0]).clamp(-MAX_VGK_STEP, MAX_VGK_STEP),
        v_old[1] + (v_new[1] - v_old[1]).clamp(-MAX_VPK_STEP, MAX_VPK_STEP),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn silicon() -> JunctionParams {
        JunctionParams::new(1e-12, 26e-3, 1.0)
    }

    #[test]
    fn test_diode_forward_bias() {
        let p = silicon();
        // At 0V, current should be approximately 0
        assert!(diode(0.0, &p, false).0.abs() < 1e-15);

        // At forward bias, current should increase exponentially
        let i_small = diode(0.3, &p, false).0;
        let i_large = diode(0.6, &p, false).0;
        assert!(i_large > i_small * 100.0);
    }

    #[test]
    fn test_diode_reverse_bias() {
        let p = silicon();
        let i_rev = diode(-1.0, &p, false).0;
        assert!(i_rev < 0.0);
        assert!(i_rev > -2.0 * p.is);
    }

    #[test]
    fn test_matched_pair_is_odd() {
        let p = silicon();
        for v in [0.1, 0.4, 0.7] {
            let (i_pos, g_pos) = diode(v, &p, true);
            let (i_neg, g_neg) = diode(-v, &p, true);
            assert_relative_eq!(i_pos, -i_neg, max_relative = 1e-12);
            assert_relative_eq!(g_pos, g_neg, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_conductance_matches_slope() {
        let p = silicon();
        let v = 0.55;
        let h = 1e-7;
        let slope = (diode(v + h, &p, false).0 - diode(v - h, &p, false).0) / (2.0 * h);
        assert_relative_eq!(diode(v, &p, false).1, slope, max_relative = 1e-5);
    }

    #[test]
    fn test_exponent_stays_finite() {
        let p = silicon();
        let (i, g) = diode(50.0, &p, false);
        assert!(i.is_finite() && g.is_finite());
    }

    #[test]
    fn test_junction_limiting() {
        let p = silicon();
        // large forward jump is compressed
        let limited = p.limit(5.0, 0.6);
        assert!(limited > 0.6 && limited < 1.0);
        // small steps pass through
        assert_eq!(p.limit(0.61, 0.6), 0.61);
        // reverse bias is never limited
        assert_eq!(p.limit(-10.0, 0.6), -10.0);
        // matched pair limits negative jumps too
        let neg = limit_diode(-5.0, -0.6, &p, true);
        assert!(neg < -0.6 && neg > -1.0);
    }

    #[test]
    fn test_bjt_active_region() {
        let p = silicon();
        let op = bjt(0.65, -5.0, Doping::Npn, &p);
        assert!(op.ic > 0.0 && op.ib > 0.0);
        assert_relative_eq!(op.ic / op.ib, BETA_F, max_relative = 1e-6);
    }

    #[test]
    fn test_pnp_mirrors_npn() {
        let p = silicon();
        let npn = bjt(0.65, -5.0, Doping::Npn, &p);
        let pnp = bjt(-0.65, 5.0, Doping::Pnp, &p);
        assert_relative_eq!(npn.ic, -pnp.ic, max_relative = 1e-12);
        assert_relative_eq!(npn.ib, -pnp.ib, max_relative = 1e-12);
        assert_relative_eq!(npn.dic_dvbe, pnp.dic_dvbe, max_relative = 1e-12);
    }

    #[test]
    fn test_koren_plate_current() {
        let p = KorenParams::for_model(Model12AX7::Exh);
        // reverse plate voltage conducts nothing
        assert_eq!(plate_current(0.0, -10.0, &p), 0.0);
        // typical operating point is around a milliamp
        let ip = plate_current(-2.0, 250.0, &p);
        assert!(ip > 1e-4 && ip < 5e-3, "ip = {ip}");
        // more negative grid, less current
        assert!(plate_current(-4.0, 250.0, &p) < ip);
        // more plate voltage, more current
        assert!(plate_current(-2.0, 300.0, &p) > ip);
    }

    #[test]
    fn test_variants_differ() {
        let exh = plate_current(-1.5, 200.0, &KorenParams::for_model(Model12AX7::Exh));
        let rsd1 = plate_current(-1.5, 200.0, &KorenParams::for_model(Model12AX7::Rsd1));
        let rsd2 = plate_current(-1.5, 200.0, &KorenParams::for_model(Model12AX7::Rsd2));
        assert!(exh != rsd1 && exh != rsd2 && rsd1 != rsd2);
    }

    #[test]
    fn test_grid_current() {
        let (i_cut, _) = grid_current(-2.0);
        assert!(i_cut < 1e-7);
        let (i_on, g_on) = grid_current(1.0);
        assert!(i_on > 4e-4 && i_on < 6e-4);
        assert!(g_on > 0.0 && g_on <= 1.0 / GRID_RESISTANCE);
    }

    #[test]
    fn test_triode_step_limit() {
        let limited = limit_triode([5.0, 300.0], [-1.0, 100.0]);
        assert_eq!(limited, [-0.5, 120.0]);
    }
}
