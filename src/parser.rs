//! Line-oriented, single-pass parser.
//!
//! [`Parser`] drives the scanner and the stack one source line at a time.
//! For each line the cursor resets to the root, descends back into open
//! indented containers, and the first significant byte picks the block
//! form; anything unrecognized becomes a continuation line feeding the
//! inline event loop. There is no lookahead across lines and no
//! backtracking beyond undoing the most recent scanner match.
//!
//! The block dispatch lives in `block`, the inline event loop in `inline`,
//! and the `{...}` content grammar in `attributes`.

mod attributes;
mod block;
mod inline;
mod stack;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::Context;
use crate::error::Error;
use crate::node::Node;
use crate::scanner::Scanner;
use attributes::AttrList;
use stack::Stack;

/// A line ending at the cursor.
static EOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\r\n|\r|\n)").unwrap());

/// The next line ending anywhere ahead (for `scan_until`).
static EOL_SEARCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

/// Everything up to (excluding) the line ending.
static LINE_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\r\n]*").unwrap());

/// The streaming parser: feed it whole lines, then [`finish`](Parser::finish).
pub struct Parser<'c> {
    context: &'c mut Context,
    scanner: Scanner,
    stack: Stack,
    /// Block attribute list waiting for the next block element.
    pending_attrs: Option<AttrList>,
    /// 1-based number of the line currently being parsed.
    line: usize,
    /// Byte position where the current line's inline content started.
    line_start: usize,
}

impl<'c> Parser<'c> {
    /// Creates a parser that resolves extensions through `context` and
    /// stores reference-link definitions into it.
    #[must_use]
    pub fn new(context: &'c mut Context) -> Self {
        Self {
            context,
            scanner: Scanner::new(),
            stack: Stack::new(),
            pending_attrs: None,
            line: 0,
            line_start: 0,
        }
    }

    /// Parses one or more complete input lines. May be called repeatedly;
    /// state carries over between calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExtension`] when a block extension names an
    /// unregistered extension and the context has no default. Malformed
    /// markup is never an error; it degrades to literal text.
    pub fn parse(&mut self, input: &str) -> Result<(), Error> {
        self.scanner.push(input);
        while !self.scanner.is_eof() {
            self.line += 1;
            self.stack.set_level(0);
            self.parse_segment()?;
        }
        Ok(())
    }

    /// Finalizes all open structures and returns the root of the tree.
    /// Unclosed inline markup is rewritten to literal text.
    #[must_use]
    pub fn finish(mut self) -> Node {
        self.stack.close_node(1);
        self.stack.into_root()
    }

    /// The 1-based number of the most recently parsed source line, for
    /// caller-side diagnostics.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Attaches (and consumes) the pending block attribute list.
    fn attach_pending(&mut self, node: &mut Node) {
        if let Some(attrs) = self.pending_attrs.take() {
            attrs.apply(node);
        }
    }
}
