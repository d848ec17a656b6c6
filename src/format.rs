// Human-readable byte and growth-rate strings for log lines.

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;
const TB: f64 = GB * 1024.0;

pub fn format_bytes(bytes: u64) -> String {
    let b = bytes as f64;
    if b >= TB {
        format!("{:.2} TB", b / TB)
    } else if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.0} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// "+1.50 MB/min", "-0.20 MB/min", or "-" when |rate| < 0.01.
pub fn format_growth_rate(mb_per_min: f64) -> String {
    if mb_per_min.abs() < 0.01 {
        "-".into()
    } else if mb_per_min > 0.0 {
        format!("+{:.2} MB/min", mb_per_min)
    } else {
        format!("{:.2} MB/min", mb_per_min)
    }
}
