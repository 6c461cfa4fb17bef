use once_cell::sync::Lazy;
use std::fmt;
use std::time::Instant;
use tracing_subscriber::fmt::time::FormatTime;

static START: Lazy<Instant> = Lazy::new(Instant::now);

/// Log timestamps as seconds since process start.
pub struct UptimeSeconds;

impl FormatTime for UptimeSeconds {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let elapsed = START.elapsed();
        write!(w, "{:.3}s", elapsed.as_secs_f64())
    }
}

/// Shorten opaque identifiers (fingerprints, user ids) for log lines.
/// Splits on characters, not bytes: fingerprints are client-supplied and
/// may carry multi-byte UTF-8 at any position.
pub fn abbrev(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::abbrev;

    #[test]
    fn abbrev_keeps_short_ids_whole() {
        assert_eq!(abbrev("fp-123"), "fp-123");
        assert_eq!(
            abbrev("eyJ1c2VyX2FnZW50IjoiTW96aWxsYS81"),
            "eyJ1c2Vy...YS81"
        );
    }

    #[test]
    fn abbrev_splits_multibyte_ids_on_char_boundaries() {
        // 6 chars but 18 bytes; byte-indexed slicing would panic here.
        assert_eq!(abbrev("€€€€€€"), "€€€€€€");
        assert_eq!(abbrev("éééééééééééééééé"), "éééééééé...éééé");
    }
}
