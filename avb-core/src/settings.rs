//! This module contains the [`ReadSettings`] structure which customises how
//! a pool of chunks is decoded.
//!
//! The defaults are permissive enough to decode a single chunk in
//! isolation (references cannot be range-checked without the rest of the
//! bin) while staying strict about body contents.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ReadSettings {
    /// Error on object references whose index falls outside the pool.
    /// Off by default so that chunks can be decoded without their bin.
    pub(crate) check_refs: bool,
    /// Preserve chunks of unregistered classes as opaque objects instead of
    /// failing the pool read.
    pub(crate) skip_unknown_classes: bool,
    /// Accept decoders leaving unread bytes at the end of a body.
    pub(crate) allow_trailing_bytes: bool,
}

impl Default for ReadSettings {
    fn default() -> Self {
        ReadSettings {
            check_refs: false,
            skip_unknown_classes: true,
            allow_trailing_bytes: false,
        }
    }
}

impl ReadSettings {
    pub fn set_check_refs(&mut self, check: bool) {
        self.check_refs = check;
    }

    pub fn get_check_refs(&self) -> bool {
        self.check_refs
    }

    pub fn set_skip_unknown_classes(&mut self, skip: bool) {
        self.skip_unknown_classes = skip;
    }

    pub fn get_skip_unknown_classes(&self) -> bool {
        self.skip_unknown_classes
    }

    pub fn set_allow_trailing_bytes(&mut self, allow: bool) {
        self.allow_trailing_bytes = allow;
    }

    pub fn get_allow_trailing_bytes(&self) -> bool {
        self.allow_trailing_bytes
    }

    #[cfg(feature = "to_json")]
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(&self).map_err(|e| e.to_string())
    }
}
