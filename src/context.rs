//! Shared parse/render state: the extension registry and the
//! reference-link destination table.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::extension::{builtin, CommentExtension, ContainerExtension, Extension, RawExtension};

/// State shared between a [`Parser`](crate::Parser) and the renderers that
/// consume its output.
///
/// A context owns its state for the life of a document: reference-link
/// definitions collected during one `parse` call stay visible to later
/// calls and to rendering. Parse a fresh document with a fresh context.
#[derive(Clone, Default)]
pub struct Context {
    extensions: HashMap<String, Rc<dyn Extension>>,
    default_extension: Option<Rc<dyn Extension>>,
    /// Reference-link destinations collected from `[name]: url` lines.
    pub link_destinations: HashMap<String, String>,
}

impl Context {
    /// Creates an empty context: no extensions, no default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with the built-in extensions ([`RawExtension`],
    /// [`CommentExtension`]) registered and [`ContainerExtension`] installed
    /// as the fallback for unknown names.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut ctx = Self::new();
        ctx.add_extension(Rc::new(RawExtension));
        ctx.add_extension(Rc::new(CommentExtension));
        ctx.add_extension(Rc::new(ContainerExtension));
        ctx
    }

    /// Registers an extension under each name it declares. The reserved
    /// name `default` installs it as the fallback for unknown names.
    pub fn add_extension(&mut self, extension: Rc<dyn Extension>) {
        for name in extension.names() {
            if *name == "default" {
                self.default_extension = Some(Rc::clone(&extension));
            } else {
                self.extensions
                    .insert((*name).to_string(), Rc::clone(&extension));
            }
        }
    }

    /// Registers a built-in extension by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExtension`] when no built-in carries `name`.
    pub fn add_builtin(&mut self, name: &str) -> Result<(), Error> {
        let ext = builtin(name).ok_or_else(|| Error::UnknownExtension(name.to_string()))?;
        self.add_extension(ext);
        Ok(())
    }

    /// Looks up the extension registered under `name`, falling back to the
    /// `default` extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExtension`] when the name is unregistered
    /// and no default is set.
    pub fn extension(&self, name: &str) -> Result<Rc<dyn Extension>, Error> {
        self.extensions
            .get(name)
            .or(self.default_extension.as_ref())
            .cloned()
            .ok_or_else(|| Error::UnknownExtension(name.to_string()))
    }
}
