//! Utility functions
//!
//! Number formatting and parsing, char/byte index conversions for the
//! string methods, and stack growth for the recursive evaluator.

/// Grow the stack when less than this remains
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted
///
/// Wraps the recursive entry points of the interpreter (statements and
/// expressions), so nesting depth is bounded by the call-depth limit and
/// by memory rather than by the host thread's stack size.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Format a number the way scripts see it
///
/// Integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // Also covers -0
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Parse a string as a number after trimming surrounding whitespace
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    match trimmed {
        "NaN" => Some(f64::NAN),
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        // Rust accepts "inf" and "nan" spellings that scripts never produce
        t if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => None,
        t => t.parse::<f64>().ok(),
    }
}

/// Parse an optional sign followed by leading decimal digits
///
/// Returns `None` when there are no digits.
pub fn parse_leading_int(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value = digits[..end].parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Convert a byte offset into a char index
pub fn char_index(s: &str, byte_offset: usize) -> usize {
    s.get(..byte_offset).map_or(0, |prefix| prefix.chars().count())
}

/// Slice by char indices, clamping both ends to the string
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let byte_at = |idx: usize| s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b);
    let start = byte_at(start);
    let end = byte_at(end).max(start);
    &s[start..end]
}
