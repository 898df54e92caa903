//! The base media component and its clip, timecode, filler and sequence
//! specializations.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::MediaKind;
use crate::{AvbObject, AvbString, Exp10, MobId, ObjectRef, Root};

/// The fields shared by every object in the component family, stored at the
/// top of each concrete variant.
///
/// `length` belongs to the clip tail of the body and defaults to 0 for
/// classes that do not carry one (plain sequences read it as part of their
/// own tail).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentHeader {
    /// "Bag of bits" legacy slots.
    pub left_bob: ObjectRef,
    pub right_bob: ObjectRef,
    pub media_kind_id: i16,
    pub edit_rate: Exp10,
    pub name: AvbString,
    pub effect_id: AvbString,
    pub attribute_ref: ObjectRef,
    pub session_ref: ObjectRef,
    pub precomputed: ObjectRef,
    pub param_list: ObjectRef,
    pub length: u32,
}

impl ComponentHeader {
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::new(self.media_kind_id)
    }

    /// The symbolic media kind, with out-of-table ids rendered as
    /// `unknown<n>`.
    /// ```
    /// use avb_core::ComponentHeader;
    ///
    /// let mut h = ComponentHeader::default();
    /// h.media_kind_id = 2;
    /// assert_eq!(h.media_kind_name(), "sound");
    /// h.media_kind_id = 42;
    /// assert_eq!(h.media_kind_name(), "unknown42");
    /// ```
    pub fn media_kind_name(&self) -> String {
        match self.media_kind() {
            MediaKind::Invalid => format!("unknown{}", self.media_kind_id),
            kind => kind.to_string(),
        }
    }
}

/// An ordered run of components on a single conceptual track (`SEQU`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sequence {
    pub header: ComponentHeader,
    pub component_refs: Vec<ObjectRef>,
}

impl Sequence {
    /// Resolve the member components in order. References that do not
    /// resolve (null or dangling) are skipped.
    pub fn components<'a>(&'a self, root: &'a Root) -> impl Iterator<Item = &'a AvbObject> {
        self.component_refs.iter().filter_map(move |r| root.resolve(*r))
    }
}

/// A reference into source material (`SCLP`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SourceClip {
    pub header: ComponentHeader,
    /// The legacy two-word Avid id, kept verbatim for rewriting. When both
    /// words are zero the SMPTE id is normalized to the zero value.
    pub mob_id_hi: i32,
    pub mob_id_lo: i32,
    pub track_id: i16,
    pub start_time: i32,
    pub mob_id: MobId,
}

/// A timecode stream (`TCCP`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timecode {
    pub header: ComponentHeader,
    pub flags: u32,
    pub fps: u16,
    /// Unused on current bins; kept raw so unusual files rewrite exactly.
    pub reserved: [u8; 6],
    pub start: u32,
}

/// An edgecode stream (`ECCP`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edgecode {
    pub header: ComponentHeader,
}

/// A reference to a sibling track (`TRKR`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackRef {
    pub header: ComponentHeader,
}

/// A parameter clip (`PRCL`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParamClip {
    pub header: ComponentHeader,
}

/// Empty space on a track (`FILL`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Filler {
    pub header: ComponentHeader,
}
