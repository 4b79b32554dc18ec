//! AST node types produced by the parser.
//!
//! Every element of a document is a [`Node`]: a type tag plus optional text
//! content, an HTML-style attribute map, a property map for parser/renderer
//! bookkeeping, and an ordered list of children. The tree is pure — no
//! cycles, no shared subtrees — and owns all of its data.

use std::collections::BTreeMap;

use serde::Serialize;

/// The kind of a [`Node`].
///
/// `SpanData` and `AttributeList` are transient: they exist only while the
/// parser resolves bracketed constructs and never appear in a finished tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Document root.
    Root,
    /// A blank line; records a block boundary inside a container.
    Blank,
    /// A paragraph of inline content.
    Paragraph,
    /// A header; its level (1-6) lives in the `level` property.
    Header,
    /// A `>`-marked quotation container.
    Blockquote,
    /// A list; contains only `ListItem` children.
    List,
    /// A single list item.
    ListItem,
    /// A named block extension (`::name:`).
    ExtensionBlock,
    /// Literal characters, stored in `content`.
    Text,
    /// The boundary between two source lines in the same inline context.
    SoftBreak,
    /// An explicit backslash line break.
    HardBreak,
    /// Raw text between backticks, stored in `content`.
    Verbatim,
    /// `*`-delimited inline content.
    Strong,
    /// `_`-delimited inline content.
    Emphasis,
    /// `~`-delimited inline content.
    Subscript,
    /// `^`-delimited inline content.
    Superscript,
    /// A link carrying exactly one of the `destination` or `reference`
    /// properties.
    Link,
    /// Bracketed inline content with an attribute list.
    Span,
    /// A named inline extension (`:name:`).
    InlineExtension,
    /// Transient: destination or reference data being collected.
    SpanData,
    /// Transient: attribute list content being collected.
    AttributeList,
}

/// Whether a node is a block-level or inline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Block-level element.
    Block,
    /// Inline element.
    Inline,
}

/// What a node's children (or content) are made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Block children.
    Block,
    /// Inline children.
    Inline,
    /// Literal text in `content`.
    Text,
    /// Raw text in `content`; inline markup is not recognized inside.
    Verbatim,
    /// No children and no content.
    None,
    /// Content is owned by an extension handler.
    Special,
}

impl NodeType {
    /// The category fixed for this type. Overridable per node via the
    /// `category` property (used for user-synthesized nodes).
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::Root
            | Self::Blank
            | Self::Paragraph
            | Self::Header
            | Self::Blockquote
            | Self::List
            | Self::ListItem
            | Self::ExtensionBlock => Category::Block,
            _ => Category::Inline,
        }
    }

    /// The default content model for this type.
    #[must_use]
    pub fn content_model(self) -> ContentModel {
        match self {
            Self::Root | Self::Blockquote | Self::List | Self::ListItem | Self::ExtensionBlock => {
                ContentModel::Block
            }
            Self::Paragraph
            | Self::Header
            | Self::Strong
            | Self::Emphasis
            | Self::Subscript
            | Self::Superscript
            | Self::Link
            | Self::Span
            | Self::InlineExtension => ContentModel::Inline,
            Self::Text => ContentModel::Text,
            Self::Verbatim | Self::SpanData | Self::AttributeList => ContentModel::Verbatim,
            Self::Blank | Self::SoftBreak | Self::HardBreak => ContentModel::None,
        }
    }
}

/// A value in a node's property map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// An integer property (level, indent, start, byte position).
    Int(i64),
    /// A string property (marker, name, destination, reference, data).
    Str(String),
    /// An ordered list of strings (reference tokens from an attribute list).
    List(Vec<String>),
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for PropertyValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

/// A single element of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// The node's type tag.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Literal text; used only by text and verbatim-content nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// HTML-style attributes (`id`, `class`, arbitrary keys).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Parser/renderer bookkeeping keyed by symbolic name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<&'static str, PropertyValue>,
    /// Ordered child nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates an empty node of the given type.
    #[must_use]
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            content: None,
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// The node's category, honoring a `category` property override.
    #[must_use]
    pub fn category(&self) -> Category {
        match self.property_str("category") {
            Some("block") => Category::Block,
            Some("inline") => Category::Inline,
            _ => self.node_type.category(),
        }
    }

    /// The node's content model, honoring a `content_model` property
    /// override (extension blocks use `special` when a handler owns their
    /// content).
    #[must_use]
    pub fn content_model(&self) -> ContentModel {
        match self.property_str("content_model") {
            Some("block") => ContentModel::Block,
            Some("inline") => ContentModel::Inline,
            Some("text") => ContentModel::Text,
            Some("verbatim") => ContentModel::Verbatim,
            Some("none") => ContentModel::None,
            Some("special") => ContentModel::Special,
            _ => self.node_type.content_model(),
        }
    }

    /// Sets a property, replacing any previous value.
    pub fn set_property(&mut self, key: &'static str, value: impl Into<PropertyValue>) {
        self.properties.insert(key, value.into());
    }

    /// Looks up a property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Looks up a string property.
    #[must_use]
    pub fn property_str(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(PropertyValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Looks up an integer property.
    #[must_use]
    pub fn property_int(&self, key: &str) -> Option<i64> {
        match self.properties.get(key) {
            Some(PropertyValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Removes and returns a property.
    pub fn take_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    /// Appends `text`, merging into a trailing text child when present.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.children.last_mut() {
            if last.node_type == NodeType::Text {
                last.content.get_or_insert_with(String::new).push_str(text);
                return;
            }
        }
        let mut node = Node::new(NodeType::Text);
        node.content = Some(text.to_string());
        self.children.push(node);
    }

    /// The concatenated text content of this subtree, in traversal order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(content) = &self.content {
            out.push_str(content);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
