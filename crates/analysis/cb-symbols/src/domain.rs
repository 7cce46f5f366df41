//! Ambiguity-tolerant name lookup structures

use cb_intern::Name;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Ordered multimap from a name to every value entered under it
///
/// Several values may share a name; deciding whether that is an error is up
/// to the caller. Names keep the order in which they were first entered and
/// each bucket keeps insertion order.
#[derive(Debug, Clone)]
pub struct Domain<T> {
    entries: IndexMap<Name, Vec<T>, FxBuildHasher>,
}

impl<T: Copy + PartialEq> Domain<T> {
    /// Create an empty domain
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::default(),
        }
    }

    /// Enter `value` under `name` and return everything now sharing that name
    pub fn enter(&mut self, name: Name, value: T) -> &[T] {
        let bucket = self.entries.entry(name).or_default();
        bucket.push(value);
        bucket
    }

    /// Values entered under `name`; empty when the name is unknown
    #[must_use]
    pub fn lookup(&self, name: Name) -> &[T] {
        self.entries.get(&name).map_or(&[], Vec::as_slice)
    }

    /// Remove the most recent occurrence of `value` from the `name` bucket
    ///
    /// An emptied bucket is dropped so the domain looks exactly as it did
    /// before the matching [`Domain::enter`].
    pub fn delete(&mut self, name: Name, value: T) -> bool {
        let Some(bucket) = self.entries.get_mut(&name) else {
            return false;
        };
        let Some(position) = bucket.iter().rposition(|candidate| *candidate == value) else {
            return false;
        };
        bucket.remove(position);
        if bucket.is_empty() {
            self.entries.shift_remove(&name);
        }
        true
    }

    /// Whether `value` is entered under `name`
    #[must_use]
    pub fn contains(&self, name: Name, value: T) -> bool {
        self.lookup(name).contains(&value)
    }

    /// Iterate over names with their buckets
    pub fn iter(&self) -> impl Iterator<Item = (Name, &[T])> {
        self.entries
            .iter()
            .map(|(name, bucket)| (*name, bucket.as_slice()))
    }

    /// Iterate over every value, bucket by bucket
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.values().flatten().copied()
    }

    /// Number of distinct names
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the domain holds no value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Copy + PartialEq> Default for Domain<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered collection of values owned by one scope symbol
///
/// Keeps both a [`Domain`] for name lookup and the overall entry order, which
/// group fields and section contents need for layout and REDEFINES checks.
#[derive(Debug, Clone)]
pub struct Scope<T> {
    domain: Domain<T>,
    order: Vec<T>,
}

impl<T: Copy + PartialEq> Scope<T> {
    /// Create an empty scope
    #[must_use]
    pub fn new() -> Self {
        Self {
            domain: Domain::new(),
            order: Vec::new(),
        }
    }

    /// Enter `value` under `name`; always succeeds
    pub fn enter(&mut self, name: Name, value: T) -> &[T] {
        self.order.push(value);
        self.domain.enter(name, value)
    }

    /// Values entered under `name`
    #[must_use]
    pub fn lookup(&self, name: Name) -> &[T] {
        self.domain.lookup(name)
    }

    /// Remove exactly this instance of `value`
    pub fn delete(&mut self, name: Name, value: T) -> bool {
        if !self.domain.delete(name, value) {
            return false;
        }
        if let Some(position) = self.order.iter().rposition(|candidate| *candidate == value) {
            self.order.remove(position);
        }
        true
    }

    /// Values in entry order
    #[must_use]
    pub fn ordered(&self) -> &[T] {
        &self.order
    }

    /// Underlying domain
    #[must_use]
    pub fn domain(&self) -> &Domain<T> {
        &self.domain
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the scope holds no value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<T: Copy + PartialEq> Default for Scope<T> {
    fn default() -> Self {
        Self::new()
    }
}
