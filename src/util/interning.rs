//! Interned identifiers.
//!
//! Project, solution, and base-definition names are compared constantly
//! during closure and pipeline work, so they are interned: every name with
//! the same content shares one `'static` allocation and equality is a
//! pointer comparison.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NAMES: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// Intern an arbitrary value into a `'static` slot, deduplicated by value.
///
/// Shared with the target interner in `core::target`; both rely on the
/// returned reference being unique per distinct value so that pointer
/// identity equals value identity.
pub(crate) fn intern<T>(pool: &RwLock<HashSet<&'static T>>, value: &T) -> &'static T
where
    T: Eq + Hash + Clone,
{
    {
        let pool = pool.read().unwrap();
        if let Some(&hit) = pool.get(value) {
            return hit;
        }
    }

    let mut pool = pool.write().unwrap();
    // Re-check under the write lock; another thread may have won the race.
    if let Some(&hit) = pool.get(value) {
        return hit;
    }

    let leaked: &'static T = Box::leak(Box::new(value.clone()));
    pool.insert(leaked);
    leaked
}

/// An interned name with pointer equality and zero-cost cloning.
#[derive(Clone, Copy)]
pub struct InternedString {
    inner: &'static str,
}

impl InternedString {
    /// Intern a name.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();

        {
            let names = NAMES.read().unwrap();
            if let Some(&hit) = names.get(s) {
                return InternedString { inner: hit };
            }
        }

        let mut names = NAMES.write().unwrap();
        if let Some(&hit) = names.get(s) {
            return InternedString { inner: hit };
        }

        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        names.insert(leaked);
        InternedString { inner: leaked }
    }

    /// The underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.inner
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Deref for InternedString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.inner
    }
}

impl AsRef<str> for InternedString {
    #[inline]
    fn as_ref(&self) -> &str {
        self.inner
    }
}

impl Borrow<str> for InternedString {
    #[inline]
    fn borrow(&self) -> &str {
        self.inner
    }
}

impl PartialEq for InternedString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for InternedString {}

impl PartialOrd for InternedString {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedString {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(other.inner)
    }
}

impl Hash for InternedString {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // All equal names share an address, so hashing the pointer is sound.
        std::ptr::hash(self.inner, state)
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner, f)
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}

impl From<&str> for InternedString {
    fn from(s: &str) -> Self {
        InternedString::new(s)
    }
}

impl From<String> for InternedString {
    fn from(s: String) -> Self {
        InternedString::new(s)
    }
}

impl From<&String> for InternedString {
    fn from(s: &String) -> Self {
        InternedString::new(s)
    }
}

impl Serialize for InternedString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InternedString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(InternedString::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_content_same_pointer() {
        let a = InternedString::new("graphics");
        let b = InternedString::new("graphics");
        let c = InternedString::new("scheduler");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(std::ptr::eq(a.inner, b.inner));
    }

    #[test]
    fn test_usable_as_map_key() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(InternedString::new("game"), 1);
        assert_eq!(map.get(&InternedString::new("game")), Some(&1));
    }

    #[test]
    fn test_intern_helper_dedups_by_value() {
        static POOL: LazyLock<RwLock<HashSet<&'static (u32, u32)>>> =
            LazyLock::new(|| RwLock::new(HashSet::new()));

        let a = intern(&POOL, &(1, 2));
        let b = intern(&POOL, &(1, 2));
        let c = intern(&POOL, &(3, 4));

        assert!(std::ptr::eq(a, b));
        assert!(!std::ptr::eq(a, c));
    }
}
