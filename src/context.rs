//! Quote-state tracking for single script lines.
//!
//! The classifier only cares about one question per byte position: is this
//! position live shell text, or is it inside a quoted literal? This module
//! answers it with a single left-to-right pass per line.
//!
//! # Rules
//!
//! 1. `"` toggles the double-quote state unless a single quote is open.
//! 2. `'` toggles the single-quote state unless a double quote is open.
//! 3. The quote characters themselves are never live.
//! 4. No backslash escapes are modeled, and state never crosses a line.
//!
//! Rule 4 is a known gap versus real shell grammar. A literal that spans lines
//! is treated as live text from the second line on.
//!
//! # Examples
//!
//! ```ignore
//! use script_guard::context::is_outside_quotes;
//!
//! let line = r#"echo "rm -rf /tmp" && rm -rf ./build"#;
//! assert!(!is_outside_quotes(line, 6)); // inside the double-quoted literal
//! assert!(is_outside_quotes(line, 22)); // the live `rm`
//! ```

/// Which literal, if any, the scan cursor is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteState {
    /// Live shell text.
    #[default]
    Unquoted,
    /// Inside `'...'`.
    Single,
    /// Inside `"..."`.
    Double,
}

impl QuoteState {
    #[inline]
    #[must_use]
    pub const fn is_quoted(self) -> bool {
        !matches!(self, Self::Unquoted)
    }

    /// Apply one byte to the state. Returns true if the byte was a quote that
    /// toggled the state.
    #[inline]
    fn step(&mut self, byte: u8) -> bool {
        match (byte, *self) {
            (b'"', Self::Unquoted) => *self = Self::Double,
            (b'"', Self::Double) => *self = Self::Unquoted,
            (b'\'', Self::Unquoted) => *self = Self::Single,
            (b'\'', Self::Single) => *self = Self::Unquoted,
            _ => return false,
        }
        true
    }
}

/// One byte position produced by [`QuoteScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPosition {
    /// Byte offset within the line.
    pub index: usize,
    /// True if a pattern may start here (not quoted, not a quote character).
    pub live: bool,
}

/// Single-pass scanner over one line.
///
/// State starts fresh for every scanner, so callers get the per-line reset by
/// constructing one scanner per line.
#[derive(Debug, Clone)]
pub struct QuoteScanner<'a> {
    bytes: &'a [u8],
    index: usize,
    state: QuoteState,
}

impl<'a> QuoteScanner<'a> {
    #[inline]
    #[must_use]
    pub fn new(line: &'a str) -> Self {
        Self {
            bytes: line.as_bytes(),
            index: 0,
            state: QuoteState::Unquoted,
        }
    }

    /// Quote state after every byte consumed so far.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> QuoteState {
        self.state
    }
}

impl Iterator for QuoteScanner<'_> {
    type Item = ScanPosition;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let byte = *self.bytes.get(self.index)?;
        let index = self.index;
        self.index += 1;

        let toggled = self.state.step(byte);
        Some(ScanPosition {
            index,
            live: !toggled && !self.state.is_quoted(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() - self.index;
        (remaining, Some(remaining))
    }
}

/// Returns true only when neither quote flag is set at `index`.
///
/// A quote character counts as quoted: it either opens or closes a literal.
/// Indices past the end of the line are never outside quotes.
#[must_use]
pub fn is_outside_quotes(line: &str, index: usize) -> bool {
    QuoteScanner::new(line)
        .nth(index)
        .is_some_and(|pos| pos.live)
}
