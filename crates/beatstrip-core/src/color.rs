//! Color math for the LED compositor.

/// One LED color as integer channels. Displayable values are `0..=255`;
/// intermediate arithmetic may leave the range and is clamped at the edges
/// of every operation.
pub type Rgb = [i32; 3];

#[inline]
fn clamp_channel(v: i32) -> i32 {
    v.clamp(0, 255)
}

/// Linear interpolation between two colors.
///
/// The factor is applied per channel with an integer cast after the
/// addition, then each channel is clamped to `0..=255`.
pub fn interpolate_colors(c1: Rgb, c2: Rgb, factor: f32) -> Rgb {
    let mut out = [0i32; 3];
    for (i, channel) in out.iter_mut().enumerate() {
        *channel = clamp_channel((c1[i] as f32 + (c2[i] - c1[i]) as f32 * factor) as i32);
    }
    out
}

/// Scale a color by a brightness factor, clamping each channel.
pub fn apply_brightness(color: Rgb, brightness: f32) -> Rgb {
    let mut out = [0i32; 3];
    for (i, channel) in out.iter_mut().enumerate() {
        *channel = clamp_channel((color[i] as f32 * brightness) as i32);
    }
    out
}

/// Weighted blend of several colors.
///
/// Weights are normalized before blending. Mismatched input lengths or a
/// zero weight sum yield black.
pub fn blend_colors(colors: &[Rgb], weights: &[f32]) -> Rgb {
    if colors.is_empty() || weights.is_empty() || colors.len() != weights.len() {
        return [0, 0, 0];
    }

    let total_weight: f32 = weights.iter().sum();
    if total_weight == 0.0 {
        return [0, 0, 0];
    }

    let mut acc = [0.0f32; 3];
    for (color, weight) in colors.iter().zip(weights) {
        let normalized = weight / total_weight;
        for (i, channel) in acc.iter_mut().enumerate() {
            *channel += color[i] as f32 * normalized;
        }
    }

    [
        clamp_channel(acc[0] as i32),
        clamp_channel(acc[1] as i32),
        clamp_channel(acc[2] as i32),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_endpoints() {
        let red = [255, 0, 0];
        let green = [0, 255, 0];
        assert_eq!(interpolate_colors(red, green, 0.0), red);
        assert_eq!(interpolate_colors(red, green, 1.0), green);
    }

    #[test]
    fn test_interpolate_midpoint_truncates() {
        // (255 + (0 - 255) * 0.5) = 127.5 -> integer cast -> 127
        assert_eq!(interpolate_colors([255, 0, 0], [0, 0, 0], 0.5), [127, 0, 0]);
    }

    #[test]
    fn test_interpolate_clamps_out_of_range_inputs() {
        let c = interpolate_colors([300, -20, 0], [300, -20, 0], 0.5);
        assert_eq!(c, [255, 0, 0]);
    }

    #[test]
    fn test_apply_brightness() {
        assert_eq!(apply_brightness([200, 100, 50], 0.5), [100, 50, 25]);
        assert_eq!(apply_brightness([200, 100, 50], 0.0), [0, 0, 0]);
        assert_eq!(apply_brightness([200, 100, 50], 2.0), [255, 200, 100]);
    }

    #[test]
    fn test_blend_zero_weights_is_black() {
        let colors = [[255, 0, 0], [0, 255, 0]];
        assert_eq!(blend_colors(&colors, &[0.0, 0.0]), [0, 0, 0]);
    }

    #[test]
    fn test_blend_normalizes_weights() {
        let colors = [[200, 0, 0], [0, 200, 0]];
        // Equal weights of any magnitude blend to the average
        assert_eq!(blend_colors(&colors, &[2.0, 2.0]), [100, 100, 0]);
    }

    #[test]
    fn test_blend_mismatched_lengths_is_black() {
        assert_eq!(blend_colors(&[[255, 0, 0]], &[1.0, 1.0]), [0, 0, 0]);
    }
}
