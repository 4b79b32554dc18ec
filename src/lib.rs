#![doc = include_str!("../README.md")]
#![deny(missing_docs, unsafe_code)]

pub mod context;
pub mod error;
pub mod extension;
pub mod node;
mod parser;
pub mod render;
mod scanner;

pub use context::Context;
pub use error::Error;
pub use extension::Extension;
pub use node::{Category, ContentModel, Node, NodeType, PropertyValue};
pub use parser::Parser;
pub use render::{AstRenderer, HtmlRenderer, Renderer};

/// Parses a complete document in one call.
///
/// Equivalent to feeding `input` to a [`Parser`] and calling
/// [`finish`](Parser::finish).
///
/// # Errors
///
/// Returns [`Error::UnknownExtension`] when a block extension names an
/// unregistered extension and `context` has no default.
///
/// ```
/// use penmark::{parse_document, Context, NodeType};
///
/// let mut context = Context::with_defaults();
/// let root = parse_document("# hello\n", &mut context).unwrap();
/// assert_eq!(root.children[0].node_type, NodeType::Header);
/// ```
pub fn parse_document(input: &str, context: &mut Context) -> Result<Node, Error> {
    let mut parser = Parser::new(context);
    parser.parse(input)?;
    Ok(parser.finish())
}
