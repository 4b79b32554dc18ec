//! Pluggable handlers for block (`::name:`) and inline (`:name:`)
//! extensions.
//!
//! An extension declares the names it answers to, may take over parsing of
//! a block extension's raw lines, and renders the extension nodes the
//! parser produced. Handlers are stateless; anything collected during
//! parsing is stored on the node itself.

use std::rc::Rc;

use crate::error::Error;
use crate::node::{Category, Node};
use crate::render::{escape_html, Renderer};

/// A named extension handler.
pub trait Extension {
    /// The names this extension is registered under. The reserved name
    /// `default` installs it as the fallback for unknown names.
    fn names(&self) -> &'static [&'static str];

    /// True when this extension consumes the raw lines of its block form
    /// itself instead of having them parsed as blocks.
    fn parse_content(&self) -> bool {
        false
    }

    /// Receives one raw content line (trailing newline included, normalized
    /// to LF). Only called when [`parse_content`](Self::parse_content)
    /// returns true. `node` is the extension block being built.
    fn parse_line(&self, node: &mut Node, line: &str) {
        let _ = (node, line);
    }

    /// Called once after the last raw content line.
    fn parsing_finished(&self, node: &mut Node) {
        let _ = node;
    }

    /// Renders an extension node.
    ///
    /// # Errors
    ///
    /// Propagates failures from rendering child nodes.
    fn render(&self, node: &Node, renderer: &mut dyn Renderer) -> Result<(), Error>;
}

/// Looks up a built-in extension by name.
#[must_use]
pub fn builtin(name: &str) -> Option<Rc<dyn Extension>> {
    match name {
        "raw" => Some(Rc::new(RawExtension)),
        "comment" => Some(Rc::new(CommentExtension)),
        _ => None,
    }
}

/// Fallback handler for unregistered names: block content parses as blocks
/// and renders as a `<div>` classed with the extension name; inline content
/// renders as a matching `<span>`.
pub struct ContainerExtension;

impl ContainerExtension {
    fn class_for(node: &Node) -> String {
        let mut class = node.property_str("name").unwrap_or("extension").to_string();
        if let Some(extra) = node.attributes.get("class") {
            class.push(' ');
            class.push_str(extra);
        }
        class
    }

    fn open_tag(tag: &str, node: &Node) -> String {
        let mut out = format!("<{tag} class=\"{}\"", escape_html(&Self::class_for(node)));
        if let Some(id) = node.attributes.get("id") {
            out.push_str(&format!(" id=\"{}\"", escape_html(id)));
        }
        out.push('>');
        out
    }
}

impl Extension for ContainerExtension {
    fn names(&self) -> &'static [&'static str] {
        &["default"]
    }

    fn render(&self, node: &Node, renderer: &mut dyn Renderer) -> Result<(), Error> {
        match node.category() {
            Category::Block => {
                renderer.write(&Self::open_tag("div", node));
                renderer.write("\n");
                renderer.render_children(node)?;
                renderer.write("</div>\n");
            }
            Category::Inline => {
                renderer.write(&Self::open_tag("span", node));
                if node.children.is_empty() {
                    if let Some(data) = node.property_str("data") {
                        renderer.write(&escape_html(data));
                    }
                } else {
                    renderer.render_children(node)?;
                }
                renderer.write("</span>");
            }
        }
        Ok(())
    }
}

/// `::raw:` blocks replay their lines into the output byte for byte.
pub struct RawExtension;

impl Extension for RawExtension {
    fn names(&self) -> &'static [&'static str] {
        &["raw"]
    }

    fn parse_content(&self) -> bool {
        true
    }

    fn parse_line(&self, node: &mut Node, line: &str) {
        node.content.get_or_insert_with(String::new).push_str(line);
    }

    fn render(&self, node: &Node, renderer: &mut dyn Renderer) -> Result<(), Error> {
        if let Some(content) = &node.content {
            renderer.write(content);
        } else if let Some(data) = node.property_str("data") {
            renderer.write(data);
        } else {
            renderer.render_children(node)?;
        }
        Ok(())
    }
}

/// `::comment:` blocks swallow their lines and render nothing.
pub struct CommentExtension;

impl Extension for CommentExtension {
    fn names(&self) -> &'static [&'static str] {
        &["comment"]
    }

    fn parse_content(&self) -> bool {
        true
    }

    fn render(&self, _node: &Node, _renderer: &mut dyn Renderer) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    #[test]
    fn builtin_lookup() {
        assert!(builtin("raw").is_some());
        assert!(builtin("comment").is_some());
        assert!(builtin("nope").is_none());
    }

    #[test]
    fn raw_accumulates_lines_on_node() {
        let ext = RawExtension;
        let mut node = Node::new(NodeType::ExtensionBlock);
        ext.parse_line(&mut node, "one\n");
        ext.parse_line(&mut node, "two\n");
        ext.parsing_finished(&mut node);
        assert_eq!(node.content.as_deref(), Some("one\ntwo\n"));
    }

    #[test]
    fn comment_discards_lines() {
        let ext = CommentExtension;
        let mut node = Node::new(NodeType::ExtensionBlock);
        ext.parse_line(&mut node, "gone\n");
        assert!(node.content.is_none());
    }

    #[test]
    fn container_class_includes_name_and_attrs() {
        let mut node = Node::new(NodeType::ExtensionBlock);
        node.set_property("name", "note");
        node.attributes
            .insert("class".to_string(), "wide".to_string());
        assert_eq!(ContainerExtension::class_for(&node), "note wide");
    }
}
