//! Interned identifiers for segments and child components.
//!
//! Catalogue identifiers are compared constantly while chains are aligned
//! (every exhaust child is looked up in the intake alignment table), so they
//! are interned once and compared as symbols afterwards.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every [`Id`].
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Identifier of a segment or child component.
///
/// Two ids created from the same string are equal and hash identically, which
/// is what cross-chain matching relies on.
///
/// # Examples
///
/// ```
/// use ahu_core::identifier::Id;
///
/// let fan = Id::new("fan-01");
/// assert_eq!(fan, Id::new("fan-01"));
/// assert_eq!(fan, "fan-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{value}")
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner
            .resolve(self.0)
            .is_some_and(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_new_interns_equal_strings() {
        let id1 = Id::new("plate-utilizer");
        let id2 = Id::new("plate-utilizer");
        let id3 = Id::new("fan");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "plate-utilizer");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("segment-7");
        assert_eq!(format!("{id}"), "segment-7");
    }

    #[test]
    fn test_hash_and_eq() {
        let mut map = HashMap::new();
        map.insert(Id::new("a"), 1.0);
        map.insert(Id::new("b"), 2.0);

        assert_eq!(map.get(&Id::new("a")), Some(&1.0));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("airValve-1");
        assert!(id == "airValve-1");
        assert!(id != "airValve-2");
    }
}
