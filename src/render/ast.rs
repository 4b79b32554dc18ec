//! Tree dump back-end: serializes a finished tree to JSON.

use crate::error::Error;
use crate::node::Node;

/// Serializes a finished tree to pretty-printed JSON.
///
/// Unlike the visitor back-ends this does not traverse via
/// [`Renderer`](crate::render::Renderer); the node tree itself carries the
/// serialization shape (empty maps and lists are omitted).
#[derive(Debug, Default)]
pub struct AstRenderer;

impl AstRenderer {
    /// Creates the renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders `root` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] when serialization fails.
    pub fn render(&self, root: &Node) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(root)?)
    }
}
