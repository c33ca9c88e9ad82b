//! Time formatting utilities

/// Format seconds as `HH:MM:SS`, flooring fractional seconds
///
/// Hours are not wrapped, so very long inputs render as e.g. `100:00:00`.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
