use std::time::Duration;

use crate::utils::format_duration;

/// Map a pointer offset on a progress track to a normalised position.
///
/// Returns `None` when the track has no usable width (not laid out yet, or
/// a non-finite geometry), in which case the caller should not seek.
pub fn track_fraction(offset_x: f64, track_width: f64) -> Option<f64> {
    if !offset_x.is_finite() || !track_width.is_finite() || track_width <= 0.0 {
        return None;
    }
    Some((offset_x / track_width).clamp(0.0, 1.0))
}

/// Convert a normalised position to a time on a media of `duration` seconds.
///
/// `None` while the duration is unknown (zero or NaN) so nothing ever seeks
/// to NaN.
pub fn fraction_to_time(fraction: f64, duration: f64) -> Option<f64> {
    if !has_duration(duration) || !fraction.is_finite() {
        return None;
    }
    Some((fraction.clamp(0.0, 1.0) * duration).clamp(0.0, duration))
}

/// Tooltip text for hovering over the track.
pub fn preview_label(offset_x: f64, track_width: f64, duration: f64) -> Option<String> {
    preview_time(offset_x, track_width, duration).map(format_duration)
}

/// Hovered position as a `Duration`.
pub fn preview_time(offset_x: f64, track_width: f64, duration: f64) -> Option<Duration> {
    let fraction = track_fraction(offset_x, track_width)?;
    fraction_to_time(fraction, duration).map(Duration::from_secs_f64)
}

/// Position as a fraction of the duration, for drawing the filled part of
/// the track.
pub fn progress_fraction(current_time: f64, duration: f64) -> f64 {
    if !has_duration(duration) || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration).clamp(0.0, 1.0)
}

pub(crate) fn has_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}
