//! String interning for data names, program names and type names

pub use lasso::Spur as Name;
use lasso::ThreadedRodeo;
use std::sync::Arc;

/// Thread-safe string interner
///
/// Clones share the same underlying storage, so a name interned through one
/// handle resolves through every other.
#[derive(Clone, Debug)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Create an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `text`, returning the existing handle when already present
    ///
    /// The text is stored as given; names differing only in case get
    /// distinct handles.
    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up `text` without interning it
    ///
    /// Returns `None` when the string was never interned, which callers use as
    /// a cheap "no symbol can have this name" answer.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    /// Resolve a handle back to its text
    #[must_use]
    pub fn resolve(&self, name: Name) -> &str {
        self.inner.resolve(&name)
    }

    /// Resolve a handle that may come from another interner
    #[must_use]
    pub fn try_resolve(&self, name: Name) -> Option<&str> {
        self.inner.try_resolve(&name)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
