//! This contains the closed value sets used by the object model.
//!
//! AVB objects carry a number of small integer codes (media kind, mob type,
//! usage, attribute value type). Codes that come from a fixed table in the
//! format get an error on unknown values; codes that are known to appear
//! with undocumented values in the wild fall back to an `Invalid`/`Unknown`
//! variant instead, so that a bin can still be read.
use num::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::*;

/// The kind of media a component cuts. From the `media_kind_id` field of
/// every component body.
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MediaKind {
    Null = 0,
    Picture = 1,
    Sound = 2,
    Timecode = 3,
    Edgecode = 4,
    Attribute = 5,
    EffectData = 6,
    DescriptiveMetadata = 7,
    Invalid,
}

impl MediaKind {
    pub fn new(source: i16) -> Self {
        Self::from_i16(source).unwrap_or(Self::Invalid)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        let name = match self {
            MediaKind::Null => "none",
            MediaKind::Picture => "picture",
            MediaKind::Sound => "sound",
            MediaKind::Timecode => "timecode",
            MediaKind::Edgecode => "edgecode",
            MediaKind::Attribute => "attribute",
            MediaKind::EffectData => "effectdata",
            MediaKind::DescriptiveMetadata => "DescriptiveMetadata",
            MediaKind::Invalid => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// The mob variety of a composition. Only three values are valid.
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MobType {
    CompositionMob = 1,
    MasterMob = 2,
    SourceMob = 3,
}

impl MobType {
    /// NB: We give a result here because anything outside the table means
    /// the composition is not usable.
    pub fn new(source: u8) -> Result<Self, AvbError> {
        MobType::from_u8(source).ok_or_else(|| AvbError::ParseEnum {
            f: "MobType".to_string(),
            code: source as i64,
        })
    }
}

impl std::fmt::Display for MobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{:?}", self)
    }
}

/// What a composition mob is used for. The codes come from OMF; 8 and
/// 10..=14 are seen in the wild but undocumented, so anything outside the
/// table maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Usage {
    Unspecified = 0,
    Precompute = 1,
    Subclip = 2,
    Effect = 3,
    Group = 4,
    GroupOofter = 5,
    Motion = 6,
    MasterMob = 7,
    PrecomputeFile = 9,
    Unknown,
}

impl Usage {
    pub fn new(source: i32) -> Self {
        Self::from_i32(source).unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for Usage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        let name = match self {
            Usage::Unspecified => "none",
            Usage::Precompute => "precompute",
            Usage::Subclip => "subclip",
            Usage::Effect => "effect",
            Usage::Group => "group",
            Usage::GroupOofter => "groupoofter",
            Usage::Motion => "motion",
            Usage::MasterMob => "mastermob",
            Usage::PrecomputeFile => "precompute_file",
            Usage::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// The value encoding selector of an attribute entry.
#[derive(Debug, Clone, Copy, PartialEq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttrType {
    Int = 1,
    Str = 2,
    Obj = 3,
    Bob = 4,
}

impl AttrType {
    pub fn new(source: u32) -> Option<Self> {
        Self::from_u32(source)
    }
}
