//! HTML fragment back-end.

use crate::context::Context;
use crate::error::Error;
use crate::node::Node;
use crate::render::{escape_html, Renderer};

/// Renders a finished tree into an HTML fragment.
pub struct HtmlRenderer<'c> {
    context: &'c Context,
    out: String,
}

impl<'c> HtmlRenderer<'c> {
    /// Creates a renderer resolving extensions and references via `context`.
    #[must_use]
    pub fn new(context: &'c Context) -> Self {
        Self {
            context,
            out: String::new(),
        }
    }

    /// Renders `root` and returns the HTML fragment.
    ///
    /// # Errors
    ///
    /// Propagates extension lookup failures and
    /// [`Error::UnsupportedNode`] for broken trees.
    pub fn render(&mut self, root: &Node) -> Result<String, Error> {
        self.out.clear();
        self.render_node(root)?;
        Ok(std::mem::take(&mut self.out))
    }

    /// Serialized attributes with a leading space, in key order.
    fn attr_string(node: &Node) -> String {
        let mut out = String::new();
        for (key, value) in &node.attributes {
            out.push(' ');
            out.push_str(&escape_html(key));
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out
    }

    fn tag_around_children(&mut self, tag: &str, node: &Node) -> Result<(), Error> {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push_str(&Self::attr_string(node));
        self.out.push('>');
        self.render_children(node)?;
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        Ok(())
    }

    fn block_around_children(&mut self, tag: &str, node: &Node) -> Result<(), Error> {
        self.tag_around_children(tag, node)?;
        self.out.push('\n');
        Ok(())
    }
}

impl Renderer for HtmlRenderer<'_> {
    fn context(&self) -> &Context {
        self.context
    }

    fn write(&mut self, output: &str) {
        self.out.push_str(output);
    }

    fn render_node(&mut self, node: &Node) -> Result<(), Error> {
        self.walk(node)
    }

    fn visit_paragraph(&mut self, node: &Node) -> Result<(), Error> {
        self.block_around_children("p", node)
    }

    fn visit_header(&mut self, node: &Node) -> Result<(), Error> {
        let level = node.property_int("level").unwrap_or(1).clamp(1, 6);
        self.block_around_children(&format!("h{level}"), node)
    }

    fn visit_blockquote(&mut self, node: &Node) -> Result<(), Error> {
        self.out.push_str("<blockquote");
        self.out.push_str(&Self::attr_string(node));
        self.out.push_str(">\n");
        self.render_children(node)?;
        self.out.push_str("</blockquote>\n");
        Ok(())
    }

    fn visit_list(&mut self, node: &Node) -> Result<(), Error> {
        let ordered = node.property_str("marker") == Some("decimal");
        let tag = if ordered { "ol" } else { "ul" };
        self.out.push('<');
        self.out.push_str(tag);
        if ordered {
            if let Some(start) = node.property_int("start") {
                if start != 1 {
                    self.out.push_str(&format!(" start=\"{start}\""));
                }
            }
        }
        self.out.push_str(&Self::attr_string(node));
        self.out.push_str(">\n");
        self.render_children(node)?;
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
        Ok(())
    }

    fn visit_list_item(&mut self, node: &Node) -> Result<(), Error> {
        self.block_around_children("li", node)
    }

    fn visit_text(&mut self, node: &Node) -> Result<(), Error> {
        if let Some(content) = &node.content {
            self.out.push_str(&escape_html(content));
        }
        Ok(())
    }

    fn visit_soft_break(&mut self, _node: &Node) -> Result<(), Error> {
        self.out.push('\n');
        Ok(())
    }

    fn visit_hard_break(&mut self, _node: &Node) -> Result<(), Error> {
        self.out.push_str("<br />\n");
        Ok(())
    }

    fn visit_verbatim(&mut self, node: &Node) -> Result<(), Error> {
        self.out.push_str("<code");
        self.out.push_str(&Self::attr_string(node));
        self.out.push('>');
        if let Some(content) = &node.content {
            self.out.push_str(&escape_html(content));
        }
        self.out.push_str("</code>");
        Ok(())
    }

    fn visit_strong(&mut self, node: &Node) -> Result<(), Error> {
        self.tag_around_children("strong", node)
    }

    fn visit_emphasis(&mut self, node: &Node) -> Result<(), Error> {
        self.tag_around_children("em", node)
    }

    fn visit_subscript(&mut self, node: &Node) -> Result<(), Error> {
        self.tag_around_children("sub", node)
    }

    fn visit_superscript(&mut self, node: &Node) -> Result<(), Error> {
        self.tag_around_children("sup", node)
    }

    fn visit_link(&mut self, node: &Node) -> Result<(), Error> {
        let destination = match node.property_str("destination") {
            Some(dest) => Some(dest.to_string()),
            None => node.property_str("reference").and_then(|name| {
                self.context.link_destinations.get(name).cloned()
            }),
        };
        // An unresolved reference renders its content without an anchor.
        let Some(destination) = destination else {
            return self.render_children(node);
        };
        self.out.push_str("<a href=\"");
        self.out.push_str(&escape_html(&destination));
        self.out.push('"');
        self.out.push_str(&Self::attr_string(node));
        self.out.push('>');
        self.render_children(node)?;
        self.out.push_str("</a>");
        Ok(())
    }

    fn visit_span(&mut self, node: &Node) -> Result<(), Error> {
        self.tag_around_children("span", node)
    }
}
