use saavy_fx::{
    engine::{AudioEngine, EngineConfig, ParamId},
    field::{FieldGrid, FieldPublisher, SmoothLifeRules},
    graph::node::{Effect, StereoEffect},
    resonator::{ResonatorBank, ResonatorSettings},
};

const SAMPLE_RATE: f32 = 48_000.0;

fn peak(buf: &[f32]) -> f32 {
    buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn single_resonator_rings_at_440_and_dies_within_a_second() {
    let mut bank = ResonatorBank::new(1, SAMPLE_RATE, 1).unwrap();
    bank.set_resonator(
        0,
        ResonatorSettings {
            freq_hz: 440.0,
            decay: 1.0,
            gain: 1.0,
            pan: 0.5,
        },
    )
    .unwrap();
    bank.snap();

    let len = SAMPLE_RATE as usize;
    let mut out = vec![0.0f32; len + 1];
    out[0] = 1.0;
    bank.process_block(&mut out);

    // 0.05 s .. 0.95 s
    let window = &out[len / 20..len * 19 / 20];
    let crossings = window
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count();
    let measured = crossings as f32 / 2.0 / 0.9;
    assert!((measured - 440.0).abs() <= 4.4, "rang at {} Hz", measured);

    let initial = peak(&out[..len / 100]);
    let at_one_second = peak(&out[len - 200..]);
    assert!(initial > 0.5, "initial peak {}", initial);
    assert!(at_one_second < 0.01 * initial, "{} left after 1 s", at_one_second);
}

#[test]
fn engine_output_stays_bounded_under_heavy_settings() {
    let config = EngineConfig {
        resonators: 64,
        oversampling: 4,
        ..Default::default()
    };
    let (mut engine, mut handle) = AudioEngine::new(config).unwrap();
    handle.set_param(ParamId::ResonatorDecay, 20.0).unwrap();
    handle.set_param(ParamId::DriveAmount, 30.0).unwrap();
    handle.set_param(ParamId::DriveMix, 1.0).unwrap();
    handle.set_param(ParamId::DelayFeedback, 0.8).unwrap();
    handle.set_param(ParamId::DelayMix, 0.5).unwrap();
    handle.set_param(ParamId::FilterResonance, 0.9).unwrap();
    handle.set_param(ParamId::MasterGain, 1.0).unwrap();

    let mut left = vec![0.0f32; 512];
    let mut right = vec![0.0f32; 512];
    for block in 0..200 {
        if block % 10 == 0 {
            handle.note_on(36 + (block / 10) as u8, 127).unwrap();
        }
        engine.render(&mut left, &mut right);
        for &s in left.iter().chain(right.iter()) {
            assert!(s.is_finite(), "non-finite sample in block {}", block);
            assert!(s.abs() < 8.0, "runaway output {} in block {}", s, block);
        }
    }
}

#[test]
fn processed_input_excites_the_bank() {
    let (mut engine, _handle) = AudioEngine::new(EngineConfig::default()).unwrap();

    let mut left = vec![0.0f32; 4_096];
    let mut right = vec![0.0f32; 4_096];
    left[0] = 1.0;
    right[0] = 1.0;
    engine.process(&mut left, &mut right);

    let tail = engine.latency() + 64;
    assert!(peak(&left[tail..]) > 0.0, "impulse did not ring the bank");
}

#[test]
fn ping_pong_delay_carries_a_left_only_input_to_the_right() {
    let run = |cross: f32| {
        let (mut engine, handle) = AudioEngine::new(EngineConfig::default()).unwrap();
        handle.set_param(ParamId::ResonatorMix, 0.0).unwrap();
        handle.set_param(ParamId::DelayTime, 0.01).unwrap();
        handle.set_param(ParamId::DelayMix, 1.0).unwrap();
        handle.set_param(ParamId::DelayCross, cross).unwrap();

        // Let every glide land before the impulse
        let mut left = vec![0.0f32; 9_600];
        let mut right = vec![0.0f32; 9_600];
        engine.render(&mut left, &mut right);

        left.fill(0.0);
        right.fill(0.0);
        left[0] = 1.0;
        engine.process(&mut left, &mut right);
        (peak(&left), peak(&right))
    };

    let (_, apart) = run(0.0);
    assert_eq!(apart, 0.0, "independent lines leaked into the right channel");

    let (left, bounced) = run(1.0);
    assert!(left > 1e-3, "no left echo");
    assert!(bounced > 1e-3, "no echo bounced to the right, peak {}", bounced);
}

#[test]
fn field_snapshot_reaches_the_engine() {
    let rules = SmoothLifeRules::default().with_outer_radius(3.0);
    let mut grid = FieldGrid::new(16, 16, rules, 9).unwrap();
    grid.fill(1.0);
    let (mut publisher, reader) = FieldPublisher::new(16, 16);

    let (engine, handle) = AudioEngine::new(EngineConfig::default()).unwrap();
    handle.set_param(ParamId::FieldScanRate, 0.0).unwrap();
    let mut engine = engine.with_field(reader);

    let mut left = vec![0.0f32; 256];
    let mut right = vec![0.0f32; 256];
    engine.render(&mut left, &mut right);
    assert_eq!(engine.field_generation(), 0);

    grid.step();
    publisher.publish(&grid);
    engine.render(&mut left, &mut right);
    assert_eq!(engine.field_generation(), 1);
}

#[test]
fn stereo_bank_matches_mono_sum_for_centred_pans() {
    let make = || {
        let mut bank = ResonatorBank::new(4, SAMPLE_RATE, 3).unwrap();
        bank.set_pan_width(0.0);
        bank
    };
    let mut stereo = make();
    let mut mono = make();

    let input: Vec<f32> = (0..2_000).map(|i| if i % 500 == 0 { 1.0 } else { 0.0 }).collect();
    let mut left = input.clone();
    let mut right = input.clone();
    stereo.process_stereo(&mut left, &mut right);
    let mut sum = input.clone();
    mono.process_block(&mut sum);

    for i in 0..input.len() {
        assert!((left[i] - right[i]).abs() < 1e-5, "centre pan is not balanced at {}", i);
        assert!(left[i].abs() <= sum[i].abs() + 1e-4);
    }
}
