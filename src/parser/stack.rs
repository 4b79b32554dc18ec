//! The active parsing context: an ordered path from the root to the
//! innermost open container, with a movable cursor level.
//!
//! Every open node is the last child of the node one level below it, so the
//! stack stores no node handles at all — just the number of open levels and
//! the cursor — and navigates the real tree along the chain of last
//! children. The parser resets the cursor to the root for every source line
//! and walks back down by entering existing containers or appending new
//! ones.
//!
//! Closing works in two modes. [`Stack::close_node`] pops everything from a
//! target level upward: nodes strictly above the target are *unclosed* —
//! popped inline nodes are rewritten into literal text (opening marker plus
//! leading text) with their remaining children hoisted into the parent —
//! while the target itself closes cleanly. [`Stack::remove_top`] detaches
//! the innermost node entirely; the parser uses it for transient nodes.

use smallvec::SmallVec;

use crate::node::{Category, ContentModel, Node, NodeType};

pub(crate) struct Stack {
    root: Node,
    /// Number of open levels above the root.
    open: usize,
    /// Cursor level; 0 is the root.
    level: usize,
}

impl Stack {
    pub(crate) fn new() -> Self {
        Self {
            root: Node::new(NodeType::Root),
            open: 0,
            level: 0,
        }
    }

    /// Number of nodes on the stack, the root included.
    pub(crate) fn size(&self) -> usize {
        self.open + 1
    }

    pub(crate) fn level(&self) -> usize {
        self.level
    }

    /// Moves the cursor to `level` without closing anything.
    pub(crate) fn set_level(&mut self, level: usize) {
        debug_assert!(level <= self.open);
        self.level = level;
    }

    /// Moves the cursor to the innermost open node.
    pub(crate) fn reset_innermost(&mut self) {
        self.level = self.open;
    }

    /// The node at `level`, following the chain of last children.
    pub(crate) fn node(&self, level: usize) -> &Node {
        debug_assert!(level <= self.open);
        let mut node = &self.root;
        for _ in 0..level {
            node = node
                .children
                .last()
                .expect("open node must be its parent's last child");
        }
        node
    }

    pub(crate) fn node_mut(&mut self, level: usize) -> &mut Node {
        debug_assert!(level <= self.open);
        let mut node = &mut self.root;
        for _ in 0..level {
            node = node
                .children
                .last_mut()
                .expect("open node must be its parent's last child");
        }
        node
    }

    /// The container at the cursor.
    pub(crate) fn container(&self) -> &Node {
        self.node(self.level)
    }

    /// The innermost open node.
    pub(crate) fn innermost(&self) -> &Node {
        self.node(self.open)
    }

    /// Last child of the container at the cursor.
    pub(crate) fn last_child(&self) -> Option<&Node> {
        self.container().children.last()
    }

    pub(crate) fn last_child_mut(&mut self) -> Option<&mut Node> {
        let level = self.level;
        self.node_mut(level).children.last_mut()
    }

    /// True when a new block element may start here: the cursor is at the
    /// innermost node, or the innermost node's last child is a blank.
    pub(crate) fn block_boundary(&self) -> bool {
        self.level + 1 == self.size()
            || self.innermost().children.last().map(|n| n.node_type) == Some(NodeType::Blank)
    }

    /// Descends one level into the last child, which must be open.
    pub(crate) fn enter(&mut self) {
        debug_assert!(self.level < self.open);
        self.level += 1;
    }

    /// Descends into open indented containers (list items, extension
    /// blocks) whose recorded indent is covered by `indent`. Stops at the
    /// first open node without an indent property.
    pub(crate) fn enter_indented(&mut self, indent: usize) {
        for level in self.level + 1..=self.open {
            match self.node(level).property_int("indent") {
                Some(i) if i.max(0) as usize <= indent => {
                    if i > 0 {
                        self.level = level;
                    }
                }
                _ => break,
            }
        }
    }

    /// The innermost stack level holding a node of `node_type`, or `None`.
    /// The search stops at any inline node with verbatim content unless
    /// that node is itself the searched type: verbatim regions are hard
    /// boundaries for marker matching.
    pub(crate) fn node_level(&self, node_type: NodeType) -> Option<usize> {
        for level in (0..=self.open).rev() {
            let node = self.node(level);
            if node.node_type == node_type {
                return Some(level);
            }
            if node.category() == Category::Inline
                && node.content_model() == ContentModel::Verbatim
            {
                return None;
            }
        }
        None
    }

    /// True when the innermost open node has verbatim content, i.e. inline
    /// markup must not open anything new here.
    pub(crate) fn in_verbatim(&self) -> bool {
        let node = self.innermost();
        node.category() == Category::Inline && node.content_model() == ContentModel::Verbatim
    }

    /// Open inline nodes with verbatim content, innermost first.
    pub(crate) fn inline_verbatim_levels(&self) -> SmallVec<[usize; 2]> {
        let mut levels = SmallVec::new();
        for level in (1..=self.open).rev() {
            let node = self.node(level);
            if node.category() == Category::Inline
                && node.content_model() == ContentModel::Verbatim
            {
                levels.push(level);
            }
        }
        levels
    }

    /// Appends `node` to the container at the cursor, first closing
    /// everything open above the cursor. When `container` is true the node
    /// is pushed onto the stack and the cursor enters it.
    pub(crate) fn append_child(&mut self, node: Node, container: bool) {
        if self.open > self.level {
            self.close_node(self.level + 1);
        }
        let level = self.level;
        self.node_mut(level).children.push(node);
        if container {
            self.open = self.level + 1;
            self.level += 1;
        }
    }

    /// Appends literal text at the cursor, merging adjacent runs.
    pub(crate) fn append_text(&mut self, text: &str) {
        debug_assert_eq!(self.level, self.open);
        let level = self.level;
        self.node_mut(level).push_text(text);
    }

    /// Closes everything open strictly above `level`, rewriting popped
    /// inline nodes to literal text.
    pub(crate) fn close_above(&mut self, level: usize) {
        while self.open > level {
            self.pop_top(true);
        }
        if self.level > self.open {
            self.level = self.open;
        }
    }

    /// Closes the node at `level` and everything above it. The node at
    /// `level` closes normally; inline nodes strictly above it were never
    /// matched, so each is rewritten to literal text. The cursor ends at
    /// `level - 1`.
    pub(crate) fn close_node(&mut self, level: usize) {
        debug_assert!(level >= 1);
        self.close_above(level);
        if self.open == level {
            self.pop_top(false);
        }
        if self.level > self.open {
            self.level = self.open;
        }
    }

    /// Detaches and returns the innermost open node. Its children go with
    /// it; nothing is rewritten.
    pub(crate) fn remove_top(&mut self) -> Node {
        debug_assert!(self.open >= 1);
        let parent_level = self.open - 1;
        let node = self
            .node_mut(parent_level)
            .children
            .pop()
            .expect("open node must be its parent's last child");
        self.open = parent_level;
        if self.level > self.open {
            self.level = self.open;
        }
        node
    }

    /// Pops the innermost open node. With `rewrite`, a popped inline node
    /// is replaced by literal text: its opening marker, its leading text
    /// child, then its remaining children hoisted into the parent.
    fn pop_top(&mut self, rewrite: bool) {
        debug_assert!(self.open >= 1);
        let parent_level = self.open - 1;
        let parent = self.node_mut(parent_level);
        let node = parent
            .children
            .pop()
            .expect("open node must be its parent's last child");
        if rewrite && node.category() == Category::Inline {
            let mut literal = node.property_str("marker").unwrap_or("").to_string();
            let mut rest = node.children;
            if rest.first().map(|c| c.node_type) == Some(NodeType::Text) {
                let first = rest.remove(0);
                if let Some(content) = first.content {
                    literal.push_str(&content);
                }
            }
            parent.push_text(&literal);
            parent.children.extend(rest);
        }
        self.open = parent_level;
        if self.level > self.open {
            self.level = self.open;
        }
    }

    /// Consumes the stack, returning the finished root. Everything above
    /// the root must already be closed.
    pub(crate) fn into_root(self) -> Node {
        debug_assert_eq!(self.open, 0);
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_container(stack: &mut Stack, node_type: NodeType) {
        stack.append_child(Node::new(node_type), true);
    }

    fn marker_node(node_type: NodeType, marker: &str) -> Node {
        let mut n = Node::new(node_type);
        n.set_property("marker", marker);
        n
    }

    #[test]
    fn new_stack_is_at_root_boundary() {
        let stack = Stack::new();
        assert_eq!(stack.size(), 1);
        assert_eq!(stack.level(), 0);
        assert!(stack.block_boundary());
    }

    #[test]
    fn append_container_enters_it() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        assert_eq!(stack.size(), 2);
        assert_eq!(stack.level(), 1);
        assert_eq!(stack.container().node_type, NodeType::Paragraph);
    }

    #[test]
    fn append_leaf_stays_put() {
        let mut stack = Stack::new();
        stack.append_child(Node::new(NodeType::Blank), false);
        assert_eq!(stack.size(), 1);
        assert_eq!(stack.last_child().unwrap().node_type, NodeType::Blank);
    }

    #[test]
    fn boundary_after_blank_child() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Blockquote);
        stack.append_child(Node::new(NodeType::Blank), false);
        stack.set_level(0);
        // Cursor is above the innermost, but the innermost ends in a blank.
        assert!(stack.block_boundary());
    }

    #[test]
    fn no_boundary_mid_paragraph() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_text("x");
        stack.set_level(0);
        assert!(!stack.block_boundary());
    }

    #[test]
    fn close_node_clean_close_keeps_node() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        stack.append_text("a");
        stack.close_node(2);
        let root = {
            stack.close_node(1);
            stack.into_root()
        };
        let para = &root.children[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].node_type, NodeType::Strong);
        assert_eq!(para.children[0].text_content(), "a");
    }

    #[test]
    fn unclosed_inline_rewrites_to_literal_text() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        stack.append_text("abc");
        stack.close_node(1);
        let root = stack.into_root();
        let para = &root.children[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].node_type, NodeType::Text);
        assert_eq!(para.children[0].content.as_deref(), Some("*abc"));
    }

    #[test]
    fn rewrite_hoists_closed_children() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        stack.append_text("a ");
        let mut em = marker_node(NodeType::Emphasis, "_");
        em.push_text("b");
        stack.append_child(em, false);
        stack.close_node(1);
        let root = stack.into_root();
        let para = &root.children[0];
        assert_eq!(para.children.len(), 2);
        assert_eq!(para.children[0].content.as_deref(), Some("*a "));
        assert_eq!(para.children[1].node_type, NodeType::Emphasis);
    }

    #[test]
    fn nested_unclosed_inlines_rewrite_outward() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        stack.append_text("a");
        stack.append_child(marker_node(NodeType::Emphasis, "_"), true);
        stack.append_text("b");
        stack.close_node(1);
        let root = stack.into_root();
        let para = &root.children[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].content.as_deref(), Some("*a_b"));
    }

    #[test]
    fn blocks_pop_without_rewrite() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Blockquote);
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_text("x");
        stack.close_node(1);
        let root = stack.into_root();
        assert_eq!(root.children[0].node_type, NodeType::Blockquote);
        assert_eq!(root.children[0].children[0].node_type, NodeType::Paragraph);
    }

    #[test]
    fn append_at_lower_cursor_closes_above() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_text("x");
        stack.set_level(0);
        stack.append_child(Node::new(NodeType::Blank), false);
        assert_eq!(stack.size(), 1);
        assert_eq!(stack.node(0).children.len(), 2);
    }

    #[test]
    fn enter_indented_descends_into_items() {
        let mut stack = Stack::new();
        let mut list = Node::new(NodeType::List);
        list.set_property("indent", 0usize);
        stack.append_child(list, true);
        let mut item = Node::new(NodeType::ListItem);
        item.set_property("indent", 1usize);
        stack.append_child(item, true);
        open_container(&mut stack, NodeType::Paragraph);
        stack.set_level(0);
        stack.enter_indented(2);
        // Walks past the list (indent 0) into the item (indent 1), then
        // stops at the paragraph, which has no indent property.
        assert_eq!(stack.level(), 2);
        assert_eq!(stack.container().node_type, NodeType::ListItem);
    }

    #[test]
    fn enter_indented_respects_deeper_indents() {
        let mut stack = Stack::new();
        let mut ext = Node::new(NodeType::ExtensionBlock);
        ext.set_property("indent", 4usize);
        stack.append_child(ext, true);
        stack.set_level(0);
        stack.enter_indented(2);
        assert_eq!(stack.level(), 0);
    }

    #[test]
    fn node_level_finds_innermost() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        assert_eq!(stack.node_level(NodeType::Strong), Some(3));
    }

    #[test]
    fn node_level_stops_at_verbatim() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Strong, "*"), true);
        stack.append_child(marker_node(NodeType::Verbatim, "`"), true);
        assert_eq!(stack.node_level(NodeType::Strong), None);
        assert_eq!(stack.node_level(NodeType::Verbatim), Some(3));
        assert!(stack.in_verbatim());
    }

    #[test]
    fn remove_top_detaches_node_and_children() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::SpanData, "]("), true);
        stack.append_text("url");
        let removed = stack.remove_top();
        assert_eq!(removed.node_type, NodeType::SpanData);
        assert_eq!(removed.text_content(), "url");
        assert!(stack.container().children.is_empty());
        assert_eq!(stack.size(), 2);
    }

    #[test]
    fn inline_verbatim_levels_innermost_first() {
        let mut stack = Stack::new();
        open_container(&mut stack, NodeType::Paragraph);
        stack.append_child(marker_node(NodeType::Span, "["), true);
        stack.append_child(marker_node(NodeType::SpanData, "]("), true);
        let levels = stack.inline_verbatim_levels();
        assert_eq!(levels.as_slice(), &[3]);
    }
}
