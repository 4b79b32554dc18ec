//! Attribute-list content grammar: the text between `{` and `}` (or the
//! line tail of a block extension marker).
//!
//! Grammar, applied token by token after trimming:
//! `#ident` sets the `id` attribute (last wins), `.ident` appends to the
//! `class` attribute, `key=value` sets a key (value double-quoted,
//! single-quoted, or bare; last wins), and any other run of non-whitespace
//! becomes a reference token. `\}` and `\<quote>` un-escape inside values;
//! an unescaped `}` never belongs to a token.

use std::collections::BTreeMap;

use chumsky::{extra, prelude::*};

use crate::node::{Node, PropertyValue};

/// Attributes and reference tokens parsed from one attribute list.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct AttrList {
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) refs: Vec<String>,
}

impl AttrList {
    pub(crate) fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.refs.is_empty()
    }

    fn push_class(&mut self, class: String) {
        self.attributes
            .entry("class".to_string())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(&class);
            })
            .or_insert(class);
    }

    /// Folds a later list into this one; classes accumulate, everything
    /// else is last-wins.
    pub(crate) fn merge(&mut self, other: AttrList) {
        for (key, value) in other.attributes {
            if key == "class" {
                self.push_class(value);
            } else {
                self.attributes.insert(key, value);
            }
        }
        self.refs.extend(other.refs);
    }

    /// Applies this list to a node: attributes merge into the node's
    /// attribute map, reference tokens extend its `refs` property.
    pub(crate) fn apply(self, node: &mut Node) {
        for (key, value) in self.attributes {
            if key == "class" {
                match node.attributes.get_mut("class") {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&value);
                    }
                    None => {
                        node.attributes.insert(key, value);
                    }
                }
            } else {
                node.attributes.insert(key, value);
            }
        }
        if !self.refs.is_empty() {
            match node.properties.get_mut("refs") {
                Some(PropertyValue::List(existing)) => existing.extend(self.refs),
                _ => node.set_property("refs", self.refs),
            }
        }
    }
}

/// One recognized token of attribute-list content.
enum AttrToken {
    Id(String),
    Class(String),
    KeyValue(String, String),
    Ref(String),
    /// A byte no token form accepts (an unescaped `}`); dropped.
    Skip,
}

/// Build the chumsky parser for attribute-list content.
///
/// The parser is total: every byte is consumed by some alternative, with
/// `Skip` soaking up bytes no token form accepts.
fn tokens<'src>() -> impl Parser<'src, &'src str, Vec<AttrToken>, extra::Default> {
    let ident = any()
        .filter(|c: &char| !c.is_whitespace() && !matches!(c, '.' | '#' | '}'))
        .repeated()
        .at_least(1)
        .collect::<String>();

    let id = just('#').ignore_then(ident.clone()).map(AttrToken::Id);
    let class = just('.').ignore_then(ident).map(AttrToken::Class);

    let key = any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .repeated()
        .at_least(1)
        .collect::<String>();

    let double_quoted = just('"')
        .ignore_then(
            choice((just('\\').ignore_then(one_of("\"}")), none_of("\"")))
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('"'));

    let single_quoted = just('\'')
        .ignore_then(
            choice((just('\\').ignore_then(one_of("'}")), none_of("'")))
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('\''));

    let plain = choice((
        just('\\').ignore_then(just('}')),
        any().filter(|c: &char| !c.is_whitespace() && *c != '}'),
    ));

    let bare = plain.clone().repeated().collect::<String>();

    let key_value = key
        .then_ignore(just('='))
        .then(choice((double_quoted, single_quoted, bare)))
        .map(|(key, value)| AttrToken::KeyValue(key, value));

    let reference = plain
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(AttrToken::Ref);

    let junk = any()
        .filter(|c: &char| !c.is_whitespace())
        .map(|_| AttrToken::Skip);

    let token = choice((id, class, key_value, reference, junk));
    let ws = one_of(" \t\r\n\u{0B}").repeated();

    ws.clone()
        .ignore_then(token)
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(ws)
        .then_ignore(end())
}

/// Parses attribute-list content into attributes and reference tokens.
pub(crate) fn parse_attribute_list(input: &str) -> AttrList {
    let trimmed = input.trim();
    let mut list = AttrList::default();
    if trimmed.is_empty() {
        return list;
    }
    let parsed = tokens().parse(trimmed).into_output().unwrap_or_default();
    for token in parsed {
        match token {
            AttrToken::Id(value) => {
                list.attributes.insert("id".to_string(), value);
            }
            AttrToken::Class(value) => list.push_class(value),
            AttrToken::KeyValue(key, value) => {
                list.attributes.insert(key, value);
            }
            AttrToken::Ref(value) => list.refs.push(value),
            AttrToken::Skip => {}
        }
    }
    list
}
