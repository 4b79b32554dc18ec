//! Block dispatch: one `parse_segment` call per source line (re-entered
//! for the remainder of a line after a container marker).
//!
//! The first significant byte picks the block form. Every form that fails
//! its own preconditions undoes its scan and falls through to the inline
//! continuation path, so no line is ever rejected.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{attributes, Parser, EOL, EOL_SEARCH, LINE_TAIL};
use crate::error::Error;
use crate::extension::Extension;
use crate::node::{Node, NodeType};

/// Leading whitespace: space, tab, vertical tab.
static LEADING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\x0B]*").unwrap());

/// `#` through `######`, followed by one space.
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6}) ").unwrap());

/// Blockquote marker with content on the line.
static BQ_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^> ").unwrap());

/// Blockquote marker alone on the line.
static BQ_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>(\r\n|\r|\n|\z)").unwrap());

/// Bullet or decimal list marker, followed by one space.
static LIST_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:([*+\-])|([0-9]+)[.)]) ").unwrap());

/// Block extension marker `::name:`.
static EXT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^::([A-Za-z0-9_]+):").unwrap());

/// A whole-line block attribute list `{...}`.
static BLOCK_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{((?:\\\}|[^}\r\n])*)\}[ \t\x0B]*(\r\n|\r|\n|\z)").unwrap());

/// A whole-line reference link definition `[name]: url`.
static LINK_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\]\r\n]+)\]:[ \t]*([^ \t\r\n]+)[ \t\x0B]*(\r\n|\r|\n|\z)").unwrap()
});

impl Parser<'_> {
    /// Parses from the cursor to the end of the current line.
    pub(super) fn parse_segment(&mut self) -> Result<(), Error> {
        self.scanner.scan(&LEADING_WS);
        let indent = self.scanner.matched_len();
        if indent > 0 {
            self.stack.enter_indented(indent);
        }
        match self.scanner.peek() {
            None | Some(b'\r' | b'\n') => {
                self.blank_line();
                Ok(())
            }
            Some(b'#') => self.header(),
            Some(b'>') => self.blockquote(),
            Some(b'*' | b'+' | b'-') => self.list_item(indent),
            Some(b) if b.is_ascii_digit() => self.list_item(indent),
            Some(b':') => self.extension_block(indent),
            Some(b'{') => self.block_attribute_list(),
            Some(b'[') => self.link_definition(),
            _ => self.continuation_line(),
        }
    }

    /// A line with no content: walk to the innermost indented container and
    /// record a blank there (closing anything open above it).
    fn blank_line(&mut self) {
        self.stack.enter_indented(usize::MAX);
        if self.stack.last_child().map(|n| n.node_type) != Some(NodeType::Blank) {
            self.stack.append_child(Node::new(NodeType::Blank), false);
        }
        self.pending_attrs = None;
        self.scanner.scan(&EOL);
    }

    fn header(&mut self) -> Result<(), Error> {
        if !self.scanner.scan(&HEADER) {
            return self.continuation_line();
        }
        let level = self.scanner.group(1).map_or(1, str::len);
        if self.stack.block_boundary() {
            let mut node = Node::new(NodeType::Header);
            node.set_property("level", level);
            self.attach_pending(&mut node);
            self.stack.append_child(node, true);
        } else {
            let same_open_header = self.stack.last_child().is_some_and(|n| {
                n.node_type == NodeType::Header && n.property_int("level") == Some(level as i64)
            });
            if !same_open_header {
                self.scanner.unscan();
                return self.continuation_line();
            }
            self.stack.enter();
        }
        self.continuation_line()
    }

    fn blockquote(&mut self) -> Result<(), Error> {
        if self.scanner.scan(&BQ_MARK) {
            let open_quote =
                self.stack.last_child().map(|n| n.node_type) == Some(NodeType::Blockquote);
            if open_quote {
                self.stack.enter();
                return self.parse_segment();
            }
            if self.stack.block_boundary() {
                let mut node = Node::new(NodeType::Blockquote);
                self.attach_pending(&mut node);
                self.stack.append_child(node, true);
                return self.parse_segment();
            }
            self.scanner.unscan();
            return self.continuation_line();
        }
        if self.scanner.check(&BQ_BLANK) {
            // `>` alone only means something inside an open blockquote.
            if let Some(level) = self.stack.node_level(NodeType::Blockquote) {
                let consumed = self.scanner.matched_len();
                self.scanner.advance(consumed);
                self.stack.set_level(level);
                self.stack.enter_indented(usize::MAX);
                if self.stack.last_child().map(|n| n.node_type) != Some(NodeType::Blank) {
                    self.stack.append_child(Node::new(NodeType::Blank), false);
                }
                self.pending_attrs = None;
                return Ok(());
            }
        }
        self.continuation_line()
    }

    fn list_item(&mut self, indent: usize) -> Result<(), Error> {
        if !self.scanner.scan(&LIST_MARK) {
            return self.continuation_line();
        }
        let marker = match self.scanner.group(1) {
            Some("*") => "asterisk",
            Some("+") => "plus",
            Some("-") => "minus",
            _ => "decimal",
        };
        let start = self.scanner.group(2).and_then(|d| d.parse::<i64>().ok());
        let open_list = self.stack.last_child().is_some_and(|list| {
            list.node_type == NodeType::List
                && list.property_str("marker") == Some(marker)
                && list
                    .children
                    .last()
                    .and_then(|item| item.property_int("indent"))
                    .is_some_and(|i| i.max(0) as usize >= indent)
        });
        if open_list {
            self.stack.enter();
        } else {
            if !self.stack.block_boundary() {
                self.scanner.unscan();
                return self.continuation_line();
            }
            let mut list = Node::new(NodeType::List);
            list.set_property("indent", 0usize);
            list.set_property("marker", marker);
            if let Some(start) = start {
                list.set_property("start", start);
            }
            self.attach_pending(&mut list);
            self.stack.append_child(list, true);
        }
        let mut item = Node::new(NodeType::ListItem);
        item.set_property("indent", indent + 1);
        self.stack.append_child(item, true);
        self.parse_segment()
    }

    fn extension_block(&mut self, indent: usize) -> Result<(), Error> {
        if !self.scanner.scan(&EXT_MARK) {
            return self.continuation_line();
        }
        if !self.stack.block_boundary() {
            self.scanner.unscan();
            return self.continuation_line();
        }
        // The marker must be followed by a space or the end of the line.
        match self.scanner.peek() {
            Some(b' ') => self.scanner.advance(1),
            None | Some(b'\r' | b'\n') => {}
            Some(_) => {
                self.scanner.unscan();
                return self.continuation_line();
            }
        }
        let name = self.scanner.group(1).unwrap_or("").to_string();
        let extension = self.context.extension(&name)?;

        self.scanner.scan(&LINE_TAIL);
        let line_attrs = attributes::parse_attribute_list(self.scanner.matched());
        let mut attrs = self.pending_attrs.take().unwrap_or_default();
        attrs.merge(line_attrs);
        self.scanner.scan(&EOL);

        let parses_content = extension.parse_content();
        let mut block_indent = indent + 1;
        if !parses_content {
            if let Some(value) = attrs.attributes.remove("indent") {
                if let Ok(explicit) = value.parse::<usize>() {
                    block_indent = block_indent.max(explicit);
                }
            }
        }

        let mut node = Node::new(NodeType::ExtensionBlock);
        node.set_property("name", name);
        node.set_property("indent", block_indent);
        node.set_property(
            "content_model",
            if parses_content { "special" } else { "block" },
        );
        attrs.apply(&mut node);
        self.stack.append_child(node, !parses_content);

        if parses_content {
            self.consume_extension_lines(&*extension, block_indent);
        }
        Ok(())
    }

    /// Feeds raw lines to an extension that owns its content. A line
    /// belongs to the extension while its leading whitespace covers the
    /// block indent (the whole run is stripped) or it is blank.
    fn consume_extension_lines(&mut self, extension: &dyn Extension, indent: usize) {
        loop {
            let mut available = 0;
            while matches!(
                self.scanner.peek_at(available),
                Some(b' ' | b'\t' | b'\x0B')
            ) {
                available += 1;
            }
            if available >= indent {
                self.scanner.advance(available);
                let line = if self.scanner.scan_until(&EOL_SEARCH) {
                    let content = self
                        .scanner
                        .matched()
                        .trim_end_matches(|c| c == '\r' || c == '\n');
                    let mut line = content.to_string();
                    line.push('\n');
                    line
                } else {
                    let rest = self.scanner.rest().to_string();
                    self.scanner.advance(rest.len());
                    rest
                };
                if line.is_empty() {
                    break;
                }
                if let Some(node) = self.stack.last_child_mut() {
                    extension.parse_line(node, &line);
                }
            } else {
                match self.scanner.peek_at(available) {
                    Some(b'\r' | b'\n') => {
                        self.scanner.advance(available);
                        self.scanner.scan(&EOL);
                        if let Some(node) = self.stack.last_child_mut() {
                            extension.parse_line(node, "\n");
                        }
                    }
                    _ => break,
                }
            }
        }
        if let Some(node) = self.stack.last_child_mut() {
            extension.parsing_finished(node);
        }
    }

    fn block_attribute_list(&mut self) -> Result<(), Error> {
        if !self.stack.block_boundary() || !self.scanner.scan(&BLOCK_ATTR) {
            return self.continuation_line();
        }
        let parsed = attributes::parse_attribute_list(self.scanner.group(1).unwrap_or(""));
        match &mut self.pending_attrs {
            Some(pending) => pending.merge(parsed),
            None => self.pending_attrs = Some(parsed),
        }
        Ok(())
    }

    fn link_definition(&mut self) -> Result<(), Error> {
        if !self.stack.block_boundary() || !self.scanner.scan(&LINK_DEF) {
            return self.continuation_line();
        }
        let name = self.scanner.group(1).unwrap_or("").to_string();
        let url = self.scanner.group(2).unwrap_or("").to_string();
        self.context.link_destinations.insert(name, url);
        Ok(())
    }
}
