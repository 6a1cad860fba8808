//! saavy-fx - plays a resonator arpeggio through the full engine, with a
//! SmoothLife field driving the spectral mask and filter cutoff.
//!
//! Run with: cargo run -- [seconds]
//! Log level comes from RUST_LOG (default `info`).

use std::{
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use saavy_fx::{
    engine::{AudioEngine, EngineConfig, ParamId},
    field::{FieldConfig, FieldRunner},
    MAX_BLOCK_SIZE,
};
use tracing_subscriber::EnvFilter;

const ARP: [u8; 8] = [48, 55, 60, 63, 67, 70, 72, 75];
const STEP: Duration = Duration::from_millis(220);

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seconds: Option<f32> = match std::env::args().nth(1) {
        Some(arg) => Some(arg.parse().wrap_err_with(|| format!("invalid duration {arg:?}"))?),
        None => None,
    };

    // --- Set up CPAL ---

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    // --- Field and engine ---

    let field = FieldRunner::spawn(FieldConfig::default()).wrap_err("failed to start field")?;

    let engine_config = EngineConfig {
        sample_rate,
        max_block_size: MAX_BLOCK_SIZE.min(1024),
        ..Default::default()
    };
    let (engine, mut handle) = AudioEngine::new(engine_config).wrap_err("failed to build engine")?;
    let mut engine = engine.with_field(field.reader());

    handle.set_param(ParamId::ResonatorDecay, 2.5)?;
    handle.set_param(ParamId::ResonatorSpread, 0.35)?;
    handle.set_param(ParamId::ResonatorPanWidth, 0.8)?;
    handle.set_param(ParamId::FilterCutoff, 5_000.0)?;
    handle.set_param(ParamId::DriveMix, 0.3)?;
    handle.set_param(ParamId::MaskMix, 0.6)?;
    handle.set_param(ParamId::FieldModDepth, 1.0)?;

    // Buffers reused by audio callback
    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let (l, r) = (&mut left[..frames], &mut right[..frames]);
                    engine.render(l, r);

                    // Interleave; extra channels get the left side
                    let out_off = frames_written * channels;
                    for i in 0..frames {
                        let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = if ch == 1 { r[i] } else { l[i] };
                        }
                    }
                    frames_written += frames;
                }
            },
            |err| tracing::error!(%err, "stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;
    tracing::info!(sample_rate, channels, "playing, ctrl-c to quit");

    // --- Arpeggio driver ---

    let started = Instant::now();
    let mut step = 0usize;
    // Set when a note-off is lost to a full queue; cleared once a blanket
    // release gets through.
    let mut hanging = false;
    loop {
        if seconds.is_some_and(|s| started.elapsed().as_secs_f32() >= s) {
            break;
        }
        if hanging && handle.all_notes_off().is_ok() {
            hanging = false;
        }

        let note = ARP[step % ARP.len()];
        if let Err(err) = handle.note_on(note, 90 + (step % 3) as u8 * 15) {
            tracing::debug!(%err, "note skipped");
        }
        step += 1;

        thread::sleep(STEP);
        if let Err(err) = handle.note_off(note) {
            tracing::warn!(%err, note, "note off dropped, releasing all notes next step");
            hanging = true;
        }
        handle.poll_reports();
    }

    if let Err(err) = handle.all_notes_off() {
        tracing::warn!(%err, "final release dropped");
    }
    drop(stream);
    tracing::info!(steps = step, "done");
    Ok(())
}
