//! Byte-oriented cursor over the input buffer.
//!
//! The scanner owns the accumulated input and a forward position. All
//! pattern matching happens at the cursor via `^`-anchored [`Regex`]es
//! matched against the remaining tail, so a successful match always starts
//! at the current position. The most recent successful match is recorded so
//! it can be inspected (`matched`, `group`) or undone (`unscan`).
//!
//! Positions are byte offsets. Matches always end on character boundaries,
//! so slicing by recorded positions is safe on UTF-8 input.

use regex::Regex;
use smallvec::SmallVec;

/// Record of the most recent successful scan.
#[derive(Debug, Clone)]
struct MatchRecord {
    start: usize,
    end: usize,
    /// Capture group ranges, index 0 being the whole match.
    groups: SmallVec<[Option<(usize, usize)>; 4]>,
}

/// A forward cursor with regex matching at the current position.
#[derive(Debug, Default)]
pub(crate) struct Scanner {
    buf: String,
    pos: usize,
    last: Option<MatchRecord>,
}

impl Scanner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends input to the buffer. Earlier positions stay valid.
    pub(crate) fn push(&mut self, input: &str) {
        self.buf.push_str(input);
    }

    /// Current byte position.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// True when the cursor has consumed the whole buffer.
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// The unconsumed tail of the buffer.
    pub(crate) fn rest(&self) -> &str {
        &self.buf[self.pos..]
    }

    /// The byte at the cursor, if any.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.buf.as_bytes().get(self.pos).copied()
    }

    /// The byte `offset` bytes past the cursor, if any.
    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.buf.as_bytes().get(self.pos + offset).copied()
    }

    /// The byte just before the cursor, if any.
    pub(crate) fn prev_byte(&self) -> Option<u8> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.buf.as_bytes().get(i).copied())
    }

    /// Advances the cursor by `n` bytes.
    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    /// Matches a `^`-anchored pattern at the cursor without advancing.
    ///
    /// On success the match (and its capture groups) is recorded exactly
    /// as [`scan`](Self::scan) would record it; only the cursor stays put.
    pub(crate) fn check(&mut self, pattern: &Regex) -> bool {
        let pos = self.pos;
        if self.scan(pattern) {
            self.pos = pos;
            true
        } else {
            false
        }
    }

    /// Matches a `^`-anchored pattern at the cursor and advances past it.
    ///
    /// On success the match (and its capture groups) is recorded and `true`
    /// is returned. On failure the cursor and the last match are untouched.
    pub(crate) fn scan(&mut self, pattern: &Regex) -> bool {
        let Some(caps) = pattern.captures(self.rest()) else {
            return false;
        };
        let whole = caps.get(0).expect("group 0 always present");
        debug_assert_eq!(whole.start(), 0, "scanner patterns must be ^-anchored");
        let base = self.pos;
        let end = base + whole.end();
        let groups = caps
            .iter()
            .map(|m| m.map(|m| (base + m.start(), base + m.end())))
            .collect();
        self.last = Some(MatchRecord {
            start: base,
            end,
            groups,
        });
        self.pos = end;
        true
    }

    /// Searches forward for `pattern` and advances to the end of the first
    /// match. The recorded match covers everything consumed, from the old
    /// cursor through the end of the found match.
    pub(crate) fn scan_until(&mut self, pattern: &Regex) -> bool {
        let Some(caps) = pattern.captures(self.rest()) else {
            return false;
        };
        let whole = caps.get(0).expect("group 0 always present");
        let base = self.pos;
        let end = base + whole.end();
        let groups = caps
            .iter()
            .map(|m| m.map(|m| (base + m.start(), base + m.end())))
            .collect();
        self.last = Some(MatchRecord {
            start: base,
            end,
            groups,
        });
        self.pos = end;
        true
    }

    /// The text consumed by the most recent successful scan.
    pub(crate) fn matched(&self) -> &str {
        match &self.last {
            Some(m) => &self.buf[m.start..m.end],
            None => "",
        }
    }

    /// The length in bytes of the most recent successful scan.
    pub(crate) fn matched_len(&self) -> usize {
        self.last.as_ref().map_or(0, |m| m.end - m.start)
    }

    /// A capture group of the most recent successful scan (0 = whole match).
    pub(crate) fn group(&self, index: usize) -> Option<&str> {
        let m = self.last.as_ref()?;
        let (start, end) = (*m.groups.get(index)?)?;
        Some(&self.buf[start..end])
    }

    /// Undoes the most recent successful scan, restoring the cursor to
    /// where that scan began. One level deep only.
    pub(crate) fn unscan(&mut self) {
        if let Some(m) = self.last.take() {
            self.pos = m.start;
        }
    }

    /// A slice of the buffer by byte range.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &str {
        &self.buf[start..end]
    }
}
