//! Panel progress to widget opacity mapping

/// Progress at which the widget starts to fade in
pub const FADE_START: f32 = 90.0;
/// Progress at which the widget is fully opaque
pub const FADE_END: f32 = 100.0;

/// Opacity in `[0, 1]` for a panel progress in `[0, 100]`.
///
/// Transparent up to 90, opaque from 100, linear in between.
pub fn opacity_for_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        return 0.0;
    }
    let progress = progress.clamp(0.0, 100.0);
    ((progress - FADE_START) / (FADE_END - FADE_START)).clamp(0.0, 1.0)
}

/// Scale an RGB colour by `opacity` over a black background
pub fn fade_rgb((r, g, b): (u8, u8, u8), opacity: f32) -> (u8, u8, u8) {
    let opacity = opacity.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f32 * opacity).round() as u8;
    (scale(r), scale(g), scale(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_up_to_ninety() {
        assert_eq!(opacity_for_progress(0.0), 0.0);
        assert_eq!(opacity_for_progress(50.0), 0.0);
        assert_eq!(opacity_for_progress(90.0), 0.0);
    }

    #[test]
    fn test_opaque_from_hundred() {
        assert_eq!(opacity_for_progress(100.0), 1.0);
        assert_eq!(opacity_for_progress(140.0), 1.0);
    }

    #[test]
    fn test_linear_between() {
        assert!((opacity_for_progress(95.0) - 0.5).abs() < f32::EPSILON);
        assert!((opacity_for_progress(92.5) - 0.25).abs() < 1e-6);
        assert!((opacity_for_progress(99.0) - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_and_nan() {
        assert_eq!(opacity_for_progress(-20.0), 0.0);
        assert_eq!(opacity_for_progress(f32::NAN), 0.0);
    }

    #[test]
    fn test_fade_rgb() {
        assert_eq!(fade_rgb((200, 100, 50), 0.5), (100, 50, 25));
        assert_eq!(fade_rgb((200, 100, 50), 0.0), (0, 0, 0));
        assert_eq!(fade_rgb((200, 100, 50), 3.0), (200, 100, 50));
    }
}
