//! Continuation lines: the inline event loop.
//!
//! Literal text is consumed in runs; each run stops at an inline event
//! byte (escape, paired marker, backtick, bracket, brace, colon) or the
//! end of the line. Handlers resolve events against the stack under a
//! "closest opening wins" discipline; inline nodes with verbatim content
//! (backtick verbatim, span data, attribute lists) are hard boundaries:
//! while one is innermost, nothing new opens and only its own closer, a
//! backslash escape, or the line end means anything.
//!
//! Verbatim content is never built from text events. Each verbatim node
//! records the byte position where its content starts and copies the raw
//! slice when it closes; line ends append the open tail (normalized to LF)
//! so content can span lines.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{attributes, Parser, EOL};
use crate::error::Error;
use crate::node::{Category, ContentModel, Node, NodeType, PropertyValue};

/// A run of literal text: everything up to the next inline event byte.
static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^*_~\^`\[\]\)\{\}:\\\r\n]+").unwrap());

/// Inline extension marker `:name:`.
static INLINE_EXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:([A-Za-z0-9_]+):").unwrap());

/// Whitespace (and the line end) swallowed when bracketed data closes.
static DATA_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x0B]*\n").unwrap());

/// Bytes the backslash escape recognizes besides space, `\` and line ends.
const ESCAPABLE: &[u8] = b"*_~^`[](){}:";

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\x0B' | b'\r' | b'\n')
}

impl Parser<'_> {
    /// Parses the rest of the line as inline content of the innermost open
    /// block, opening a paragraph first when a new block may start here.
    pub(super) fn continuation_line(&mut self) -> Result<(), Error> {
        if self.stack.block_boundary()
            && self.stack.container().content_model() == ContentModel::Block
        {
            let mut paragraph = Node::new(NodeType::Paragraph);
            self.attach_pending(&mut paragraph);
            self.stack.append_child(paragraph, true);
        }
        self.stack.reset_innermost();
        let needs_soft_break = self.stack.innermost().children.last().is_some_and(|last| {
            last.category() == Category::Inline && last.node_type != NodeType::HardBreak
        });
        if needs_soft_break {
            self.stack.append_child(Node::new(NodeType::SoftBreak), false);
        }
        self.line_start = self.scanner.pos();
        self.inline_loop();

        // Carry still-open verbatim regions across the line break.
        let line_end = self.scanner.pos();
        let has_eol = self.scanner.peek().is_some();
        for level in self.stack.inline_verbatim_levels() {
            let from = match self.stack.node_mut(level).take_property("pos") {
                Some(PropertyValue::Int(p)) => p.max(0) as usize,
                _ => self.line_start,
            };
            let mut chunk = self.scanner.slice(from, line_end).to_string();
            if has_eol {
                chunk.push('\n');
            }
            let node = self.stack.node_mut(level);
            node.content.get_or_insert_with(String::new).push_str(&chunk);
        }
        self.scanner.scan(&EOL);
        Ok(())
    }

    fn inline_loop(&mut self) {
        loop {
            if self.scanner.scan(&TEXT_RUN) {
                let text = self.scanner.matched().to_string();
                self.stack.append_text(&text);
            }
            match self.scanner.peek() {
                None | Some(b'\r' | b'\n') => break,
                Some(b'\\') => self.backslash_escape(),
                Some(byte @ (b'*' | b'_' | b'~' | b'^')) => self.simple_marker(byte),
                Some(b'`') => self.verbatim_toggle(),
                Some(b'[') => self.bracket_open(),
                Some(b']') => self.bracket_close(),
                Some(b')') => self.paren_close(),
                Some(b'{') => self.attribute_open(),
                Some(b'}') => self.attribute_close(),
                Some(b':') => self.inline_extension(),
                Some(other) => {
                    // Unreachable: every non-event byte belongs to TEXT_RUN.
                    self.scanner.advance(1);
                    self.stack.append_text(&(other as char).to_string());
                }
            }
        }
    }

    /// Backslash escapes: line ends become hard breaks, a space becomes
    /// U+00A0, recognized marker bytes become literal text, and anything
    /// else keeps the backslash itself.
    fn backslash_escape(&mut self) {
        match self.scanner.peek_at(1) {
            Some(b'\r' | b'\n') => {
                self.scanner.advance(1);
                self.stack.append_child(Node::new(NodeType::HardBreak), false);
            }
            Some(b' ') => {
                self.scanner.advance(2);
                self.stack.append_text("\u{00A0}");
            }
            Some(b'\\') => {
                self.scanner.advance(2);
                self.stack.append_text("\\");
            }
            Some(byte) if ESCAPABLE.contains(&byte) => {
                self.scanner.advance(2);
                self.stack.append_text(&(byte as char).to_string());
            }
            _ => {
                self.scanner.advance(1);
                self.stack.append_text("\\");
            }
        }
    }

    /// `*`, `_`, `~`, `^`: close the innermost open node of the same type
    /// when this occurrence may close (preceded by non-whitespace), else
    /// open a new one when it may open (followed by non-whitespace), else
    /// literal text.
    fn simple_marker(&mut self, byte: u8) {
        let node_type = match byte {
            b'*' => NodeType::Strong,
            b'_' => NodeType::Emphasis,
            b'~' => NodeType::Subscript,
            _ => NodeType::Superscript,
        };
        let closing = self.scanner.prev_byte().is_some_and(|b| !is_space(b));
        let opening = self.scanner.peek_at(1).is_some_and(|b| !is_space(b));
        self.scanner.advance(1);
        if closing {
            if let Some(level) = self.stack.node_level(node_type) {
                self.stack.close_node(level);
                return;
            }
        }
        if opening && !self.stack.in_verbatim() {
            let mut node = Node::new(node_type);
            node.set_property("marker", (byte as char).to_string());
            self.stack.append_child(node, true);
        } else {
            self.stack.append_text(&(byte as char).to_string());
        }
    }

    /// Backtick: toggle verbatim. Closing copies the raw slice between the
    /// markers into `content` and drops any children collected inside.
    fn verbatim_toggle(&mut self) {
        self.scanner.advance(1);
        let marker_start = self.scanner.pos() - 1;
        if let Some(level) = self.stack.node_level(NodeType::Verbatim) {
            let from = match self.stack.node_mut(level).take_property("pos") {
                Some(PropertyValue::Int(p)) => p.max(0) as usize,
                _ => self.line_start,
            };
            let chunk = self.scanner.slice(from, marker_start).to_string();
            let node = self.stack.node_mut(level);
            node.content.get_or_insert_with(String::new).push_str(&chunk);
            node.children.clear();
            self.stack.close_node(level);
        } else if self.stack.in_verbatim() {
            self.stack.append_text("`");
        } else {
            let mut node = Node::new(NodeType::Verbatim);
            node.set_property("marker", "`");
            node.set_property("pos", self.scanner.pos());
            self.stack.append_child(node, true);
        }
    }

    fn bracket_open(&mut self) {
        self.scanner.advance(1);
        if self.stack.in_verbatim() {
            self.stack.append_text("[");
            return;
        }
        let mut node = Node::new(NodeType::Span);
        node.set_property("marker", "[");
        self.stack.append_child(node, true);
    }

    /// `]`: start bracketed data (`](`, `][`), an attribute list (`]{`),
    /// or tentatively close reference-style data with no second bracket.
    fn bracket_close(&mut self) {
        self.scanner.advance(1);
        if self.stack.in_verbatim() {
            let closes_reference = {
                let inner = self.stack.innermost();
                inner.node_type == NodeType::SpanData
                    && inner.property_str("data_type") == Some("reference")
            };
            if closes_reference {
                self.close_bracketed_data("reference", b']');
            } else {
                self.stack.append_text("]");
            }
            return;
        }
        let span_reachable = self.stack.node_level(NodeType::Span).is_some();
        match self.scanner.peek() {
            Some(b'(') if span_reachable => {
                self.scanner.advance(1);
                self.open_span_data("destination", "](");
            }
            Some(b'[') if span_reachable => {
                self.scanner.advance(1);
                self.open_span_data("reference", "][");
            }
            Some(b'{') if span_reachable => {
                self.scanner.advance(1);
                self.open_attribute_list("]{");
            }
            _ => self.close_bracketed_data("reference", b']'),
        }
    }

    /// `)`: tentatively close destination-style data.
    fn paren_close(&mut self) {
        self.scanner.advance(1);
        let closes_destination = {
            let inner = self.stack.innermost();
            inner.node_type == NodeType::SpanData
                && inner.property_str("data_type") == Some("destination")
        };
        if closes_destination {
            self.close_bracketed_data("destination", b')');
        } else {
            self.stack.append_text(")");
        }
    }

    /// Resolves a closing `)` or `]`: extract the collected data (if any),
    /// literalize unmatched inline nodes above the span, then retype the
    /// span into a link or inline extension and close it.
    fn close_bracketed_data(&mut self, kind: &str, closer: u8) {
        let closer_start = self.scanner.pos() - 1;
        let has_data = {
            let inner = self.stack.innermost();
            inner.node_type == NodeType::SpanData && inner.property_str("data_type") == Some(kind)
        };
        let data = if has_data {
            let mut span_data = self.stack.remove_top();
            let from = match span_data.take_property("pos") {
                Some(PropertyValue::Int(p)) => p.max(0) as usize,
                _ => self.line_start,
            };
            let mut content = span_data.content.take().unwrap_or_default();
            content.push_str(self.scanner.slice(from, closer_start));
            Some(DATA_BREAKS.replace_all(&content, "").into_owned())
        } else {
            None
        };
        let Some(level) = self.stack.node_level(NodeType::Span) else {
            if data.is_none() {
                self.stack.append_text(&(closer as char).to_string());
            }
            return;
        };
        self.stack.close_above(level);
        let node = self.stack.node_mut(level);
        if node.property_str("marker") == Some("[") {
            node.node_type = NodeType::Link;
            node.take_property("marker");
            if kind == "destination" {
                node.set_property("destination", data.unwrap_or_default());
            } else {
                let reference = match data {
                    Some(data) => data,
                    // Only `[x]` with no second bracket falls back to its
                    // own text; an explicit empty `][]` keeps its data.
                    None => node.text_content(),
                };
                node.set_property("reference", reference);
            }
        } else {
            node.node_type = NodeType::InlineExtension;
            node.take_property("marker");
            if let Some(data) = data {
                node.set_property("data", data);
            }
        }
        self.stack.close_node(level);
    }

    /// `{`: open an inline attribute list when the preceding sibling can
    /// host one (any inline element except text and breaks).
    fn attribute_open(&mut self) {
        self.scanner.advance(1);
        if self.stack.in_verbatim() {
            self.stack.append_text("{");
            return;
        }
        let host = self.stack.innermost().children.last().is_some_and(|last| {
            last.category() == Category::Inline
                && !matches!(
                    last.node_type,
                    NodeType::Text | NodeType::SoftBreak | NodeType::HardBreak
                )
        });
        if host {
            self.open_attribute_list("{");
        } else {
            self.stack.append_text("{");
        }
    }

    /// `}`: close an open attribute list and attach its attributes — to
    /// the span being finished (`]{`, `:name:{`) or to the previous
    /// sibling (plain `{`).
    fn attribute_close(&mut self) {
        self.scanner.advance(1);
        let closer_start = self.scanner.pos() - 1;
        if self.stack.innermost().node_type != NodeType::AttributeList {
            self.stack.append_text("}");
            return;
        }
        let mut list = self.stack.remove_top();
        let from = match list.take_property("pos") {
            Some(PropertyValue::Int(p)) => p.max(0) as usize,
            _ => self.line_start,
        };
        let mut content = list.content.take().unwrap_or_default();
        content.push_str(self.scanner.slice(from, closer_start));
        let attrs = attributes::parse_attribute_list(&content);
        if list.property_str("marker") == Some("{") {
            if let Some(previous) = self.stack.last_child_mut() {
                attrs.apply(previous);
            }
        } else if let Some(level) = self.stack.node_level(NodeType::Span) {
            self.stack.close_above(level);
            let node = self.stack.node_mut(level);
            if node.property_str("marker") != Some("[") {
                node.node_type = NodeType::InlineExtension;
            }
            node.take_property("marker");
            attrs.apply(node);
            self.stack.close_node(level);
        }
    }

    /// `:name:`: an inline extension, optionally opening bracketed
    /// content, destination data, or an attribute list.
    fn inline_extension(&mut self) {
        if self.stack.in_verbatim() || !self.scanner.scan(&INLINE_EXT) {
            self.scanner.advance(1);
            self.stack.append_text(":");
            return;
        }
        let name = self.scanner.group(1).unwrap_or("").to_string();
        match self.scanner.peek() {
            Some(b'[') => {
                self.scanner.advance(1);
                self.open_extension_span(&name, '[');
            }
            Some(b'(') => {
                self.scanner.advance(1);
                self.open_extension_span(&name, '(');
                self.open_span_data("destination", "](");
            }
            Some(b'{') => {
                self.scanner.advance(1);
                self.open_extension_span(&name, '{');
                self.open_attribute_list(&format!(":{name}:{{"));
            }
            _ => {
                let mut node = Node::new(NodeType::InlineExtension);
                node.set_property("name", name);
                self.stack.append_child(node, false);
            }
        }
    }

    fn open_extension_span(&mut self, name: &str, bracket: char) {
        let mut node = Node::new(NodeType::Span);
        node.set_property("marker", format!(":{name}:{bracket}"));
        node.set_property("name", name);
        self.stack.append_child(node, true);
    }

    fn open_span_data(&mut self, data_type: &str, marker: &str) {
        let mut node = Node::new(NodeType::SpanData);
        node.set_property("marker", marker);
        node.set_property("data_type", data_type);
        node.set_property("pos", self.scanner.pos());
        self.stack.append_child(node, true);
    }

    fn open_attribute_list(&mut self, marker: &str) {
        let mut node = Node::new(NodeType::AttributeList);
        node.set_property("marker", marker);
        node.set_property("pos", self.scanner.pos());
        self.stack.append_child(node, true);
    }
}
