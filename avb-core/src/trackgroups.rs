//! Multi-track containers and their effect specializations.
//!
//! A track group body declares a track count and then stores one
//! variable-length record per track; the `flags` word of each record
//! determines how many child references follow it. The closed flags table
//! lives in [`Track::ref_count_for`]; a flags value outside the table makes
//! the whole group undecodable.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::{MobType, Usage};
use crate::errors::AvbError;
use crate::{AvbObject, AvbString, ComponentHeader, Datetime, MobId, ObjectRef, Rational, Root};

/// One track record of a [`TrackGroup`].
///
/// `refs` is the raw child sequence in load order; the typed slots below it
/// are filled by classifying each reference by its target class. Rewriting
/// uses `refs`, so the record stays bit-exact even when classification left
/// slots empty.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    pub flags: u16,
    /// The track label. `None` on a sentinel record (`flags == 0`), which
    /// stores no further fields at all.
    pub index: Option<i16>,
    pub control_code: Option<i16>,
    pub control_sub_code: Option<i16>,
    pub lock_number: Option<i16>,
    pub attributes: Option<ObjectRef>,
    pub session_attr: Option<ObjectRef>,
    pub component: Option<ObjectRef>,
    pub filler_proxy: Option<ObjectRef>,
    pub bob_data: Option<ObjectRef>,
    pub refs: Vec<ObjectRef>,
}

impl Track {
    /// The closed flags-to-reference-count table. `None` means the flags
    /// value is unknown and the enclosing group cannot be decoded.
    pub fn ref_count_for(flags: u16) -> Option<usize> {
        match flags {
            4 | 5 | 16 => Some(1),
            12 | 13 | 21 | 517 => Some(2),
            29 | 519 | 525 | 533 => Some(3),
            541 | 527 => Some(4),
            543 => Some(5),
            _ => None,
        }
    }

    /// Whether a record with these flags stores a control-code pair instead
    /// of a label and counted references (the pan/volume track shape).
    pub fn is_control_shape(flags: u16) -> bool {
        matches!(flags, 36 | 100)
    }

    /// Whether a record with these flags stores a track label on disk.
    pub fn has_label(flags: u16) -> bool {
        !matches!(flags, 4 | 12 | 16)
    }

    /// The first child reference that points at a member of the component
    /// family, resolved through the root.
    pub fn segment<'a>(&self, root: &'a Root) -> Option<&'a AvbObject> {
        self.refs
            .iter()
            .find(|r| r.class_id().is_component())
            .and_then(|r| root.resolve(*r))
    }
}

/// The base multi-track container (`TRKG`), also decoded as a concrete
/// class.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackGroup {
    pub header: ComponentHeader,
    pub mc_mode: u8,
    pub group_length: i32,
    pub num_scalars: i32,
    pub tracks: Vec<Track>,
}

/// The shared tail of the track-effect classes: trim lengths, the global
/// info scalars and the keyframe reference.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectInfo {
    pub left_length: i32,
    pub right_length: i32,
    pub info_version: i16,
    pub info_current: i32,
    pub info_smooth: i32,
    pub info_color_item: i16,
    pub info_quality: i16,
    pub info_is_reversed: i8,
    pub info_aspect_on: bool,
    pub keyframes: ObjectRef,
    pub info_force_software: bool,
    pub info_never_hardware: bool,
}

/// A track-level effect (`TKFX`), also the base of the concrete audio and
/// video effect classes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackEffect {
    pub group: TrackGroup,
    pub info: EffectInfo,
    pub trackman: Option<ObjectRef>,
}

/// Clip gain and pan automation (`PVOL`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanVolumeEffect {
    pub effect: TrackEffect,
    pub level: i32,
    pub pan: i32,
    pub suppress_validation: bool,
    pub level_set: bool,
    pub pan_set: bool,
    pub supports_seperate_gain: Option<i32>,
    pub is_trim_gain_effect: Option<i32>,
}

/// One band of an [`EqualizerMultiBand`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EqualizerBand {
    pub band_type: i32,
    pub freq: i32,
    pub gain: i32,
    pub q: i32,
    pub enable: bool,
}

/// A multi-band equalizer (`EQMB`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EqualizerMultiBand {
    pub effect: TrackEffect,
    pub bands: Vec<EqualizerBand>,
    pub effect_enable: bool,
    pub filter_name: AvbString,
}

/// One opaque state chunk of an audio-suite plugin. The payload is plugin
/// private data and is carried as raw bytes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AspiPluginChunk {
    pub version: i32,
    pub manufacturer_id: u32,
    pub product_id: u32,
    pub plugin_id: u32,
    pub chunk_id: u32,
    pub name: AvbString,
    pub data: Vec<u8>,
}

/// One plugin entry of an [`AudioSuitePluginEffect`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AspiPlugin {
    pub name: AvbString,
    pub manufacturer_id: u32,
    pub product_id: u32,
    pub plugin_id: u32,
    pub chunks: Vec<AspiPluginChunk>,
}

/// Saved audio-suite plugin state (`ASPI`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AudioSuitePluginEffect {
    pub effect: TrackEffect,
    pub plugins: Vec<AspiPlugin>,
    /// The undocumented pair of words from extension slot 1, preserved but
    /// not interpreted.
    pub mob_id_words: Option<(i32, i32)>,
    pub mark_in: Option<i64>,
    pub mark_out: Option<i64>,
    pub tracks_to_affect: Option<u32>,
    pub rendering_mode: Option<i32>,
    pub padding_secs: Option<i32>,
    pub mob_id: Option<MobId>,
    pub preset_path: Option<Vec<u8>>,
}

/// The retiming base carried by the capture-mask, motion-effect and repeat
/// classes. `WARP` itself is never decoded directly.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeWarp {
    pub group: TrackGroup,
    pub phase_offset: i32,
}

/// A pulldown/frame mask (`MASK`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaptureMask {
    pub warp: TimeWarp,
    pub is_double: bool,
    pub mask_bits: u32,
}

/// A speed change (`SPED`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionEffect {
    pub warp: TimeWarp,
    pub rate: Rational,
    pub offset_adjust: Option<f64>,
    pub source_param_list: Option<ObjectRef>,
    pub new_source_calculation: Option<bool>,
}

/// A frame repeat (`REPT`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Repeat {
    pub warp: TimeWarp,
}

/// A replacement set (`RSET`).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepSet {
    pub group: TrackGroup,
    pub rep_set_type: Option<i32>,
}

/// A transition between two segments (`TNFX`). Past the cutpoint the body
/// repeats the track-effect tail.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionEffect {
    pub group: TrackGroup,
    pub cutpoint: i32,
    pub info: EffectInfo,
    pub trackman: Option<ObjectRef>,
}

/// A multi-camera style selector (`SLCT`): one of the tracks is the active
/// one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selector {
    pub group: TrackGroup,
    pub is_ganged: bool,
    /// Always less than the number of tracks.
    pub selected: u16,
}

impl Selector {
    /// The per-track segments, in track order. Tracks whose segment does
    /// not resolve yield `None`.
    pub fn components<'a>(&'a self, root: &'a Root) -> impl Iterator<Item = Option<&'a AvbObject>> {
        self.group.tracks.iter().map(move |t| t.segment(root))
    }
}

/// A whole mob (`CMPO`): the top of a composition, master or source tree.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Composition {
    pub group: TrackGroup,
    pub last_modified: i32,
    pub mob_type_id: u8,
    pub usage_code: i32,
    pub descriptor: ObjectRef,
    pub creation_time: Option<Datetime>,
    pub mob_id: Option<MobId>,
}

impl Composition {
    pub fn mob_type(&self) -> Result<MobType, AvbError> {
        MobType::new(self.mob_type_id)
    }

    pub fn usage(&self) -> Usage {
        Usage::new(self.usage_code)
    }
}
