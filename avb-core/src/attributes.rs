//! The attribute dictionary and the plain reference-list containers.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{AvbString, ObjectRef};

/// One attribute value. The on-disk type code {1,2,3,4} maps onto the four
/// variants, so classification is total: a blob is a blob only when stored
/// as [`AttrValue::Bytes`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttrValue {
    Int(i32),
    Str(AvbString),
    Obj(ObjectRef),
    Bytes(Vec<u8>),
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(AvbString::from(v))
    }
}

impl From<AvbString> for AttrValue {
    fn from(v: AvbString) -> Self {
        AttrValue::Str(v)
    }
}

impl From<ObjectRef> for AttrValue {
    fn from(v: ObjectRef) -> Self {
        AttrValue::Obj(v)
    }
}

/// A string-keyed attribute map (`ATTR`).
///
/// Entries keep their insertion order, which is also the on-disk order, so
/// a decoded map rewrites byte-for-byte. When the map is owned by a
/// [`crate::Root`], mutate it through [`crate::Root::attributes_mut`] so
/// the change is recorded for persistence.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attributes {
    pub(crate) entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. Replacing keeps the entry's original position;
    /// a new key appends.
    pub fn insert(&mut self, key: &str, value: AttrValue) -> Option<AttrValue> {
        for (k, v) in self.entries.iter_mut() {
            if k == key {
                return Some(std::mem::replace(v, value));
            }
        }
        self.entries.push((key.to_string(), value));
        None
    }

    /// Remove an entry, returning its value if the key was present.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let i = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(i).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An ordered object-reference sequence with a 32-bit on-disk count
/// (`PRLS`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterList {
    pub refs: Vec<ObjectRef>,
}

/// An ordered object-reference sequence with a 16-bit on-disk count
/// (`TMCS`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeCrumbList {
    pub refs: Vec<ObjectRef>,
}
