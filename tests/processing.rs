//! End-to-end behavior of units and chains on preset circuits.

use approx::assert_relative_eq;
use point_to_point::components::{Doping, Model12AX7, Semiconductor};
use point_to_point::{presets, CircuitChain, CircuitError, CircuitProcessor, CircuitUnit};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK: usize = 256;

fn test_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE as f32;
            0.8 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
                + 0.3 * (2.0 * std::f32::consts::PI * 3100.0 * t).sin()
        })
        .collect()
}

fn prepared(unit: CircuitUnit) -> CircuitUnit {
    let mut unit = unit;
    unit.prepare(SAMPLE_RATE, BLOCK).unwrap();
    unit
}

fn all_units() -> Vec<CircuitUnit> {
    vec![
        CircuitUnit::new(presets::rc_low_pass(4.7e3, 10e-9)).unwrap(),
        CircuitUnit::new(presets::tone_filter(0.4).unwrap()).unwrap(),
        CircuitUnit::new(presets::volume_pot(0.6).unwrap()).unwrap(),
        CircuitUnit::new(presets::diode_clipper(Semiconductor::Silicon)).unwrap(),
        CircuitUnit::new(presets::inverting_amplifier(10e3, 47e3)).unwrap(),
        CircuitUnit::new(presets::tube_stage(Model12AX7::Rsd2)).unwrap(),
        CircuitUnit::new(presets::common_emitter(Doping::Npn, Semiconductor::Silicon)).unwrap(),
        CircuitUnit::new(presets::common_emitter(Doping::Pnp, Semiconductor::Silicon)).unwrap(),
    ]
}

#[test]
fn block_and_sample_processing_agree() {
    let input = test_signal(BLOCK);
    for unit in all_units() {
        let mut block = prepared(unit.clone());
        let mut single = prepared(unit);

        let mut out = vec![0.0f32; BLOCK];
        block.process(&input, &mut out, BLOCK, 0).unwrap();

        for (n, &x) in input.iter().enumerate() {
            let y = single.process_sample(x, 0).unwrap();
            assert_relative_eq!(y, out[n], epsilon = 1e-6, max_relative = 1e-5);
        }
    }
}

#[test]
fn in_place_matches_two_buffer_processing() {
    let input = test_signal(BLOCK);
    for unit in all_units() {
        let mut a = prepared(unit.clone());
        let mut b = prepared(unit);

        let mut out = vec![0.0f32; BLOCK];
        a.process(&input, &mut out, BLOCK, 0).unwrap();

        let mut buf = input.clone();
        b.process_in_place(&mut buf, BLOCK, 0).unwrap();
        assert_eq!(out, buf);
    }
}

#[test]
fn prepare_twice_gives_identical_output() {
    let input = test_signal(BLOCK);
    for unit in all_units() {
        let mut unit = prepared(unit);
        let mut first = vec![0.0f32; BLOCK];
        unit.process(&input, &mut first, BLOCK, 0).unwrap();

        unit.prepare(SAMPLE_RATE, BLOCK).unwrap();
        let mut second = vec![0.0f32; BLOCK];
        unit.process(&input, &mut second, BLOCK, 0).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn prepare_discards_smoothing_progress() {
    let mut unit = prepared(CircuitUnit::new(presets::volume_pot(0.2).unwrap()).unwrap());
    unit.set_parameter_update_interval_in_samples(1);
    unit.set_smooth_response_time_milliseconds(50.0);
    unit.set_parameters_with_smoothing(vec![0.9]).unwrap();
    for _ in 0..100 {
        unit.process_sample(1.0, 0).unwrap();
    }
    unit.prepare(SAMPLE_RATE, BLOCK).unwrap();
    // live values restart settled on the targets
    let y = unit.process_sample(1.0, 0).unwrap();
    assert_relative_eq!(y, 0.9, max_relative = 1e-4);
}

#[test]
fn transistor_stage_inverts_around_its_bias_point() {
    for (doping, sign) in [(Doping::Npn, 1.0f32), (Doping::Pnp, -1.0)] {
        let layout = presets::common_emitter(doping, Semiconductor::Silicon);
        let mut unit = prepared(CircuitUnit::new(layout).unwrap());
        let quiescent = unit.process_sample(0.0, 0).unwrap();
        assert_relative_eq!(quiescent, sign * 5.02, max_relative = 1e-2);

        // a small push on the base moves the collector the other way
        let y = unit.process_sample(sign * 2e-3, 0).unwrap();
        assert!(sign * (y - quiescent) < -0.1, "{doping:?} {quiescent} -> {y}");
    }
}

#[test]
fn channels_are_independent() {
    let mut unit = prepared(CircuitUnit::new(presets::rc_low_pass(1e3, 1e-6)).unwrap());
    for _ in 0..64 {
        unit.process_sample(1.0, 0).unwrap();
    }
    // channel 1 has only ever seen silence
    assert_eq!(unit.process_sample(0.0, 1).unwrap(), 0.0);
}

#[test]
fn one_stage_chain_behaves_like_the_stage() {
    let input = test_signal(BLOCK);
    let unit = CircuitUnit::new(presets::tone_filter(0.5).unwrap()).unwrap();

    let mut direct = unit.clone();
    let mut chain = CircuitChain::single(unit);

    direct.prepare(SAMPLE_RATE, BLOCK).unwrap();
    chain.prepare(SAMPLE_RATE, BLOCK).unwrap();

    assert_eq!(
        direct.set_parameters_with_smoothing(vec![0.9, 0.1]).unwrap(),
        chain.set_parameters_with_smoothing(vec![0.9, 0.1]).unwrap()
    );
    direct.set_parameter_update_interval_in_samples(8);
    chain.set_parameter_update_interval_in_samples(8);

    let mut a = vec![0.0f32; BLOCK];
    let mut b = vec![0.0f32; BLOCK];
    direct.process(&input, &mut a, BLOCK, 1).unwrap();
    chain.process(&input, &mut b, BLOCK, 1).unwrap();
    assert_eq!(a, b);

    assert_eq!(direct.process_sample(0.3, 0).unwrap(), chain.process_sample(0.3, 0).unwrap());
    assert_eq!(
        direct.authenticate_with_license("key"),
        chain.authenticate_with_license("key")
    );
    assert_eq!(
        direct.process_sample(0.0, 5).unwrap_err(),
        chain.process_sample(0.0, 5).unwrap_err()
    );
}

#[test]
fn two_stage_chain_is_process_then_in_place() {
    let input = test_signal(BLOCK);
    let first = CircuitUnit::new(presets::inverting_amplifier(10e3, 20e3)).unwrap();
    let second = CircuitUnit::new(presets::diode_clipper(Semiconductor::Germanium)).unwrap();

    let mut manual_first = prepared(first.clone());
    let mut manual_second = prepared(second.clone());
    let mut expected = vec![0.0f32; BLOCK];
    manual_first.process(&input, &mut expected, BLOCK, 0).unwrap();
    manual_second.process_in_place(&mut expected, BLOCK, 0).unwrap();

    let mut chain = CircuitChain::single(first).then(second);
    chain.prepare(SAMPLE_RATE, BLOCK).unwrap();
    let mut output = vec![0.0f32; BLOCK];
    chain.process(&input, &mut output, BLOCK, 0).unwrap();

    assert_eq!(output, expected);
}

#[test]
fn chain_pipes_parameters_between_units() {
    // both volume stages read parameter 1; the second stage receives what
    // the first returned, which is the clamped vector
    let mut chain = CircuitChain::single(CircuitUnit::new(presets::volume_pot(1.0).unwrap()).unwrap())
        .then(CircuitUnit::new(presets::volume_pot(1.0).unwrap()).unwrap());
    chain.prepare(SAMPLE_RATE, BLOCK).unwrap();

    let applied = chain.set_parameters_no_smoothing(vec![1.5, -3.0]).unwrap();
    assert_eq!(applied, vec![1.0, 0.0]);

    chain.set_parameters_no_smoothing(vec![0.5]).unwrap();
    let y = chain.process_sample(1.0, 0).unwrap();
    assert_relative_eq!(y, 0.25, max_relative = 1e-4);
}

#[test]
fn smoothed_change_ramps_without_jumping() {
    let mut unit = prepared(CircuitUnit::new(presets::volume_pot(0.0).unwrap()).unwrap());
    unit.set_parameter_update_interval_in_samples(4);
    unit.set_smooth_response_time_milliseconds(10.0);
    unit.set_parameters_with_smoothing(vec![1.0]).unwrap();

    let mut out = vec![1.0f32; 4800];
    unit.process_in_place(&mut out, 4800, 0).unwrap();

    for pair in out.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-6);
        assert!(pair[1] - pair[0] < 0.05, "jump {} -> {}", pair[0], pair[1]);
    }
    assert!(out[0] < 0.1);
    assert!(out[4799] > 0.99);
}

#[test]
fn immediate_change_jumps() {
    let mut unit = prepared(CircuitUnit::new(presets::volume_pot(0.0).unwrap()).unwrap());
    unit.set_parameters_no_smoothing(vec![0.75]).unwrap();
    let y = unit.process_sample(1.0, 0).unwrap();
    assert_relative_eq!(y, 0.75, max_relative = 1e-4);
}

#[test]
fn usage_errors_are_reported() {
    let mut unit = CircuitUnit::new(presets::volume_pot(0.5).unwrap()).unwrap();
    assert_eq!(unit.process_sample(0.0, 0), Err(CircuitError::NotPrepared));

    unit.prepare(SAMPLE_RATE, BLOCK).unwrap();
    assert!(matches!(
        unit.process_sample(0.0, 99),
        Err(CircuitError::ChannelOutOfRange { channel: 99, .. })
    ));
    assert_eq!(
        unit.set_parameters_no_smoothing(Vec::new()),
        Err(CircuitError::MissingParameter { index: 0, provided: 0 })
    );
    assert!(unit.authenticate_with_license(""));
}
