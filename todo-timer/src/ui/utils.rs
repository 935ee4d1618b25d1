use std::time::Duration;

/// Format a duration as MM:SS, or HH:MM:SS from one hour up. Partial seconds
/// round up so the display reaches 00:00 only at expiry.
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Fraction of the countdown already elapsed, clamped to 0.0..=1.0.
pub fn elapsed_ratio(total: Duration, remaining: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    let elapsed = total.saturating_sub(remaining);
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}
