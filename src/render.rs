//! The abstract renderer seam that concrete back-ends implement.
//!
//! A renderer is a depth-first visitor over the tree: [`Renderer::walk`]
//! dispatches on the node type to a per-type `visit_*` method. Defaults
//! render children for container nodes and do nothing for leaves, so a
//! back-end only overrides the types it emits output for. Extension nodes
//! dispatch through the [`Context`] registry to the handler that owns them,
//! which receives the renderer as a trait object and drives it through
//! [`Renderer::render_node`], [`Renderer::render_children`], and
//! [`Renderer::write`].

pub mod ast;
pub mod html;

pub use ast::AstRenderer;
pub use html::HtmlRenderer;

use crate::context::Context;
use crate::error::Error;
use crate::node::{Node, NodeType};

/// Escapes `& < > " '` for HTML text and attribute positions.
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A depth-first visitor over a finished tree.
///
/// Implementations forward [`render_node`](Self::render_node) to
/// [`walk`](Self::walk), which dispatches to the `visit_*` methods, and
/// override only the visits they emit output for.
pub trait Renderer {
    /// The context this renderer resolves extensions and references against.
    fn context(&self) -> &Context;

    /// Appends raw output. Extension handlers use this to emit directly
    /// into the back-end's buffer.
    fn write(&mut self, output: &str);

    /// Renders one node. Implement as `self.walk(node)` unless the
    /// back-end replaces dispatch wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedNode`] for transient node types and
    /// propagates extension lookup failures.
    fn render_node(&mut self, node: &Node) -> Result<(), Error>;

    /// Renders all children of `node` in order.
    ///
    /// # Errors
    ///
    /// Propagates the first child failure.
    fn render_children(&mut self, node: &Node) -> Result<(), Error> {
        for child in &node.children {
            self.render_node(child)?;
        }
        Ok(())
    }

    /// Dispatches `node` to its `visit_*` method by type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedNode`] for transient node types and
    /// propagates extension lookup failures.
    fn walk(&mut self, node: &Node) -> Result<(), Error>
    where
        Self: Sized,
    {
        match node.node_type {
            NodeType::Root => self.visit_root(node),
            NodeType::Blank => self.visit_blank(node),
            NodeType::Paragraph => self.visit_paragraph(node),
            NodeType::Header => self.visit_header(node),
            NodeType::Blockquote => self.visit_blockquote(node),
            NodeType::List => self.visit_list(node),
            NodeType::ListItem => self.visit_list_item(node),
            NodeType::ExtensionBlock => self.visit_extension_block(node),
            NodeType::Text => self.visit_text(node),
            NodeType::SoftBreak => self.visit_soft_break(node),
            NodeType::HardBreak => self.visit_hard_break(node),
            NodeType::Verbatim => self.visit_verbatim(node),
            NodeType::Strong => self.visit_strong(node),
            NodeType::Emphasis => self.visit_emphasis(node),
            NodeType::Subscript => self.visit_subscript(node),
            NodeType::Superscript => self.visit_superscript(node),
            NodeType::Link => self.visit_link(node),
            NodeType::Span => self.visit_span(node),
            NodeType::InlineExtension => self.visit_inline_extension(node),
            NodeType::SpanData | NodeType::AttributeList => {
                Err(Error::UnsupportedNode(node.node_type))
            }
        }
    }

    #[allow(missing_docs)]
    fn visit_root(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_blank(&mut self, _node: &Node) -> Result<(), Error> {
        Ok(())
    }

    #[allow(missing_docs)]
    fn visit_paragraph(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_header(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_blockquote(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_list(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_list_item(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    /// Dispatches a block extension node to its registered handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExtension`] when the context resolves
    /// neither the name nor a default.
    fn visit_extension_block(&mut self, node: &Node) -> Result<(), Error>
    where
        Self: Sized,
    {
        let name = node.property_str("name").unwrap_or("").to_string();
        let extension = self.context().extension(&name)?;
        extension.render(node, self)
    }

    #[allow(missing_docs)]
    fn visit_text(&mut self, _node: &Node) -> Result<(), Error> {
        Ok(())
    }

    #[allow(missing_docs)]
    fn visit_soft_break(&mut self, _node: &Node) -> Result<(), Error> {
        Ok(())
    }

    #[allow(missing_docs)]
    fn visit_hard_break(&mut self, _node: &Node) -> Result<(), Error> {
        Ok(())
    }

    #[allow(missing_docs)]
    fn visit_verbatim(&mut self, _node: &Node) -> Result<(), Error> {
        Ok(())
    }

    #[allow(missing_docs)]
    fn visit_strong(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_emphasis(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_subscript(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_superscript(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_link(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    #[allow(missing_docs)]
    fn visit_span(&mut self, node: &Node) -> Result<(), Error> {
        self.render_children(node)
    }

    /// Dispatches an inline extension node to its registered handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExtension`] when the context resolves
    /// neither the name nor a default.
    fn visit_inline_extension(&mut self, node: &Node) -> Result<(), Error>
    where
        Self: Sized,
    {
        let name = node.property_str("name").unwrap_or("").to_string();
        let extension = self.context().extension(&name)?;
        extension.render(node, self)
    }
}
