//! BeatStrip - music-reactive LED lighting engine.
//!
//! Fixed-rate main loop: acquire a music frame, run the analysis engine,
//! apply its commands to the lighting controller, advance the scenes and
//! emit packed LED frames, then sleep the rest of the frame budget.

mod feed;
mod logging_setup;

use crate::feed::{FrameSource, SyntheticFeed};
use anyhow::Result;
use beatstrip_analysis::AnalysisEngine;
use beatstrip_core::config::{DEFAULT_FPS, LED_BINARY_ADDRESS};
use beatstrip_core::OutputMessage;
use beatstrip_light::LightController;
use crossbeam_channel::unbounded;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Frames between repeated overrun warnings.
const OVERRUN_LOG_INTERVAL: u64 = 100;

/// Frames between loop statistics reports.
const STATS_LOG_INTERVAL: u64 = 1000;

fn main() -> Result<()> {
    let _log_guard = logging_setup::init(&logging_setup::LogConfig::default())?;
    info!("BeatStrip session started");

    let mut engine = AnalysisEngine::new();
    let mut controller = LightController::new();

    // Packed frames and diagnostics flow out over a channel; a hardware
    // build hands the receiving end to the serial driver.
    let (output_tx, output_rx) = unbounded::<OutputMessage>();
    controller.register_output_callback(move |message| {
        let _ = output_tx.send(message.clone());
    });

    let mut feed = SyntheticFeed::new(0.25);

    let frame_budget = Duration::from_millis(1000 / DEFAULT_FPS as u64);
    info!(
        fps = DEFAULT_FPS,
        budget_ms = frame_budget.as_millis() as u64,
        "entering main loop"
    );

    let mut frame_count: u64 = 0;
    let mut max_frame_time = Duration::ZERO;
    let mut min_frame_time = Duration::MAX;

    loop {
        let frame_start = Instant::now();

        let frame = feed.next_frame();
        let commands = engine.process(&frame);
        for command in &commands {
            controller.handle_input_data(command);
        }
        controller.scene_update();
        controller.send_led_binary_data();

        for message in output_rx.try_iter() {
            dispatch_output(&message);
        }

        let elapsed = frame_start.elapsed();
        max_frame_time = max_frame_time.max(elapsed);
        min_frame_time = min_frame_time.min(elapsed);
        frame_count += 1;

        if frame_count % STATS_LOG_INTERVAL == 0 {
            info!(
                frames = frame_count,
                max_ms = max_frame_time.as_millis() as u64,
                min_us = min_frame_time.as_micros() as u64,
                "loop statistics"
            );
            max_frame_time = Duration::ZERO;
            min_frame_time = Duration::MAX;
        }

        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        } else if frame_count % OVERRUN_LOG_INTERVAL == 0 {
            warn!(
                frame = frame_count,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = frame_budget.as_millis() as u64,
                "frame budget overrun, skipping sleep"
            );
        }
    }
}

/// Hand one output message to its sink. The packed LED frames go to the
/// serial driver on hardware; here they are traced.
fn dispatch_output(message: &OutputMessage) {
    if message.address.starts_with(LED_BINARY_ADDRESS) {
        if let Ok(bytes) = message.payload.as_bytes() {
            trace!(address = %message.address, len = bytes.len(), "LED frame");
        }
    } else {
        debug!(address = %message.address, payload = ?message.payload, "control output");
    }
}
