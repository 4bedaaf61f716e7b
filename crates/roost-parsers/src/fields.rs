//! Autoformat field parsing for condor_q / condor_history output.
//!
//! Queries use `-af:tV`: tab-separated fields with values printed as
//! ClassAd literals, so strings arrive double-quoted and attributes the
//! ad does not define arrive as the bare word `undefined`.

/// Split one line of `-af:tV` output into optional field values.
///
/// `undefined` and empty fields become None; quoted strings are
/// unwrapped and unescaped.
pub fn split_autoformat(line: &str) -> Vec<Option<String>> {
    line.split('\t').map(parse_value).collect()
}

fn parse_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        return None;
    }
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        let inner = &trimmed[1..trimmed.len() - 1];
        return Some(unescape(inner));
    }
    Some(trimmed.to_string())
}

/// Undo ClassAd string escaping for the sequences condor emits.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse an optional field as f64.
///
/// ClassAd numerics print as integers or reals; anything else (including
/// boolean `true`/`false` from a malformed projection) becomes None.
pub fn parse_f64(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.trim().parse::<f64>().ok())
}

/// Parse an optional field as i64, accepting real-formatted integers.
pub fn parse_i64(field: Option<&str>) -> Option<i64> {
    let s = field?.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // condor occasionally prints integer attributes as reals (e.g. "2.0")
    s.parse::<f64>().ok().map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_autoformat() {
        let fields = split_autoformat("12345\t0\t5\t\"memory exceeded\"\tundefined");
        assert_eq!(fields[0].as_deref(), Some("12345"));
        assert_eq!(fields[1].as_deref(), Some("0"));
        assert_eq!(fields[2].as_deref(), Some("5"));
        assert_eq!(fields[3].as_deref(), Some("memory exceeded"));
        assert_eq!(fields[4], None);
    }

    #[test]
    fn test_split_autoformat_escapes() {
        let fields = split_autoformat("\"path \\\"quoted\\\"\"");
        assert_eq!(fields[0].as_deref(), Some("path \"quoted\""));
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(Some("2048")), Some(2048.0));
        assert_eq!(parse_f64(Some("3.5")), Some(3.5));
        assert_eq!(parse_f64(Some("abc")), None);
        assert_eq!(parse_f64(None), None);
    }

    #[test]
    fn test_parse_i64() {
        assert_eq!(parse_i64(Some("5")), Some(5));
        assert_eq!(parse_i64(Some("2.0")), Some(2));
        assert_eq!(parse_i64(Some("x")), None);
        assert_eq!(parse_i64(None), None);
    }
}
