//! Shared text rendering: ANSI styles, bars, banners.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[91m";
pub const GREEN: &str = "\x1b[1;32m";
pub const YELLOW: &str = "\x1b[93m";
pub const CYAN: &str = "\x1b[1;36m";

pub const LINE_WIDTH: usize = 80;

/// Center text within the report line width.
pub fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= LINE_WIDTH {
        return text.to_string();
    }
    let pad = (LINE_WIDTH - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Double-rule banner with a centered title.
pub fn banner(title: &str) -> String {
    format!(
        "{rule}\n{title}\n{rule}",
        rule = "=".repeat(LINE_WIDTH),
        title = center(title)
    )
}

/// Section heading: centered title over a rule.
pub fn section(title: &str) -> String {
    format!("{}\n{}", center(title), "=".repeat(LINE_WIDTH))
}

/// Percentage bar: `[██████              ] 30.0%`.
pub fn bar(pct: f64, width: usize) -> String {
    let clamped = pct.clamp(0.0, 100.0);
    let filled = (clamped / 100.0 * width as f64) as usize;
    format!(
        "[{}{}] {:.1}%",
        "█".repeat(filled),
        " ".repeat(width - filled),
        pct
    )
}

/// Format a float with trailing zeros trimmed (matching how distinct
/// request values read in the resource tables: "4", "2.5", "0.25").
pub fn trim_float(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0, 10), "[          ] 0.0%");
        assert_eq!(bar(50.0, 10), "[█████     ] 50.0%");
        assert_eq!(bar(100.0, 10), "[██████████] 100.0%");
        // over-utilization clamps the fill, not the label
        assert_eq!(bar(150.0, 10), "[██████████] 150.0%");
    }

    #[test]
    fn test_banner_shape() {
        let b = banner("Title");
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), LINE_WIDTH);
        assert!(lines[1].trim() == "Title");
    }

    #[test]
    fn test_trim_float() {
        assert_eq!(trim_float(4.0), "4");
        assert_eq!(trim_float(2.5), "2.5");
        assert_eq!(trim_float(0.25), "0.25");
    }
}
