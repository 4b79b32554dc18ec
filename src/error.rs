//! Error types surfaced at the crate boundary.
//!
//! Parsing itself is infallible: every byte sequence produces *some* tree,
//! and malformed constructs degrade to literal text inside the parser. The
//! variants here cover the remaining caller-visible failures: configuration
//! problems (unknown extensions) and renderer invariant violations.

use crate::node::NodeType;

/// Errors produced by [`Context`](crate::Context) lookups, renderers, and
/// the CLI driver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An extension name was requested that is not registered and no
    /// `default` extension is set.
    #[error("unknown extension `{0}` and no default extension is registered")]
    UnknownExtension(String),

    /// A renderer was handed a node type it cannot process. Transient node
    /// types never appear in a finished tree, so hitting one here indicates
    /// a broken tree, not bad input.
    #[error("renderer cannot handle node type `{0:?}`")]
    UnsupportedNode(NodeType),

    /// AST serialization failed.
    #[error("failed to serialize tree: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An I/O failure in the CLI driver.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
