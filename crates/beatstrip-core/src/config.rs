//! System-wide configuration defaults.

/// Main-loop and compositor frame rate.
pub const DEFAULT_FPS: u32 = 20;

/// LED counts per output group. A `0` entry means "mirror group 0's
/// buffer on that output address".
pub const DEFAULT_LED_SEP_COUNT: [usize; 2] = [205, 0];

/// Total strip length (sum of the separation counts).
pub const DEFAULT_LED_COUNT: usize = 205;

/// Upper bound on segments per effect.
pub const MAX_SEGMENTS: usize = 30;

/// Address prefix for packed LED frames.
pub const LED_BINARY_ADDRESS: &str = "/light/serial";

/// Default per-color-point opacity.
pub const DEFAULT_TRANSPARENCY: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Default section widths.
pub const DEFAULT_LENGTH: [i32; 3] = [1, 0, 0];

/// Default movement speed in LEDs per second.
pub const DEFAULT_MOVE_SPEED: f32 = 0.0;

/// Default movement range over the whole strip.
pub const DEFAULT_MOVE_RANGE: [i32; 2] = [0, DEFAULT_LED_COUNT as i32 - 1];

/// Default starting position.
pub const DEFAULT_INITIAL_POSITION: i32 = 0;

/// Default edge behavior (reflect rather than wrap).
pub const DEFAULT_IS_EDGE_REFLECT: bool = true;

/// Default fade cycle `[fade_in_start, fade_in_end, fade_out_start,
/// fade_out_end, cycle_length]` in milliseconds.
pub const DEFAULT_DIMMER_TIME: [i32; 5] = [0, 100, 200, 100, 0];

/// Default dimmer cycle stretch factor.
pub const DEFAULT_DIMMER_TIME_RATIO: f32 = 1.0;
