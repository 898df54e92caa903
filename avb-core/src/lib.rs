//! This library is the foundation for the `avb-in` and `avb-out` crates. It
//! holds the object model for the composition classes of an Avid bin (AVB)
//! file, the object pool (the "root") that resolves references between them,
//! and the shared error type. It can be built either with serialization
//! support, or in a slightly more lightweight manner without it (see
//! features).
//!
//! An AVB bin is a heterogeneous pool of typed objects that reference one
//! another by index. The outer container (chunk framing, index table,
//! compression) is not handled here; this workspace only deals with object
//! bodies handed over as `(class id, bytes)` pairs.
#![allow(clippy::derive_partial_eq_without_eq)]
extern crate num;
#[macro_use]
extern crate num_derive;

#[cfg(feature = "serde")]
extern crate serde;
#[cfg(feature = "to_json")]
extern crate serde_json;

pub mod attributes;
pub mod components;
pub mod enums;
pub mod errors;
pub mod mobid;
pub mod settings;
pub mod trackgroups;

pub use errors::AvbError;

pub use attributes::{AttrValue, Attributes, ParameterList, TimeCrumbList};
pub use components::*;
pub use enums::*;
pub use mobid::MobId;
pub use settings::ReadSettings;
pub use trackgroups::*;

use fnv::FnvHashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type tag bytes used by tagged scalars inside object bodies.
pub const TAG_BYTE_ARRAY: u8 = 65;
pub const TAG_BOOL: u8 = 66;
pub const TAG_UINT8: u8 = 68;
pub const TAG_UINT16: u8 = 70;
pub const TAG_INT32: u8 = 71;
pub const TAG_UINT32: u8 = 72;
pub const TAG_DOUBLE: u8 = 75;
pub const TAG_INT64: u8 = 77;

/// The four-byte ASCII identifier naming an object's concrete class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassId(pub [u8; 4]);

impl ClassId {
    pub const ATTRIBUTES: ClassId = ClassId(*b"ATTR");
    pub const PARAMETER_LIST: ClassId = ClassId(*b"PRLS");
    pub const TIME_CRUMB_LIST: ClassId = ClassId(*b"TMCS");
    pub const SEQUENCE: ClassId = ClassId(*b"SEQU");
    pub const SOURCE_CLIP: ClassId = ClassId(*b"SCLP");
    pub const TIMECODE: ClassId = ClassId(*b"TCCP");
    pub const EDGECODE: ClassId = ClassId(*b"ECCP");
    pub const TRACK_REF: ClassId = ClassId(*b"TRKR");
    pub const PARAM_CLIP: ClassId = ClassId(*b"PRCL");
    pub const FILLER: ClassId = ClassId(*b"FILL");
    pub const TRACK_GROUP: ClassId = ClassId(*b"TRKG");
    pub const TRACK_EFFECT: ClassId = ClassId(*b"TKFX");
    pub const PAN_VOLUME_EFFECT: ClassId = ClassId(*b"PVOL");
    pub const EQUALIZER_MULTI_BAND: ClassId = ClassId(*b"EQMB");
    pub const AUDIO_SUITE_PLUGIN_EFFECT: ClassId = ClassId(*b"ASPI");
    pub const TIME_WARP: ClassId = ClassId(*b"WARP");
    pub const CAPTURE_MASK: ClassId = ClassId(*b"MASK");
    pub const MOTION_EFFECT: ClassId = ClassId(*b"SPED");
    pub const REPEAT: ClassId = ClassId(*b"REPT");
    pub const REP_SET: ClassId = ClassId(*b"RSET");
    pub const TRANSITION_EFFECT: ClassId = ClassId(*b"TNFX");
    pub const SELECTOR: ClassId = ClassId(*b"SLCT");
    pub const COMPOSITION: ClassId = ClassId(*b"CMPO");
    /// Reserved identifier of the null sentinel; an intentionally empty
    /// reference resolves to this.
    pub const NULL: ClassId = ClassId(*b"NULL");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether objects of this class belong to the media component family
    /// (anything that can sit on a track).
    pub fn is_component(&self) -> bool {
        matches!(
            *self,
            ClassId::SEQUENCE
                | ClassId::SOURCE_CLIP
                | ClassId::TIMECODE
                | ClassId::EDGECODE
                | ClassId::TRACK_REF
                | ClassId::PARAM_CLIP
                | ClassId::FILLER
                | ClassId::TRACK_GROUP
                | ClassId::TRACK_EFFECT
                | ClassId::PAN_VOLUME_EFFECT
                | ClassId::EQUALIZER_MULTI_BAND
                | ClassId::AUDIO_SUITE_PLUGIN_EFFECT
                | ClassId::TIME_WARP
                | ClassId::CAPTURE_MASK
                | ClassId::MOTION_EFFECT
                | ClassId::REPEAT
                | ClassId::REP_SET
                | ClassId::TRANSITION_EFFECT
                | ClassId::SELECTOR
                | ClassId::COMPOSITION
        )
    }
}

impl Default for ClassId {
    fn default() -> Self {
        ClassId::NULL
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0.iter() {
            if b.is_ascii_graphic() {
                write!(f, "{}", *b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// A string as stored on disk: a `u16` byte length followed by raw bytes.
///
/// The on-disk encoding is not declared anywhere in the format, so the raw
/// bytes are kept verbatim for bit-exact rewriting and exposed as UTF-8 on
/// a best-effort basis.
/// ```
/// use avb_core::AvbString;
///
/// let s = AvbString::from("V1");
/// assert_eq!(s.to_string_lossy(), "V1");
/// assert_eq!(s.as_bytes(), b"V1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AvbString(pub Vec<u8>);

impl AvbString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<&str> for AvbString {
    fn from(s: &str) -> Self {
        AvbString(s.as_bytes().to_vec())
    }
}

impl From<String> for AvbString {
    fn from(s: String) -> Self {
        AvbString(s.into_bytes())
    }
}

impl std::fmt::Display for AvbString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

/// The base-ten rational used for edit rates: `mantissa * 10^exponent`.
/// Both words are stored raw so the value rewrites bit-exactly.
/// ```
/// use avb_core::Exp10;
///
/// let rate = Exp10 { mantissa: 2997, exponent: -2 };
/// assert!((rate.value() - 29.97).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Exp10 {
    pub mantissa: i32,
    pub exponent: i32,
}

impl Exp10 {
    pub fn value(&self) -> f64 {
        self.mantissa as f64 * 10f64.powi(self.exponent)
    }
}

/// A numerator/denominator pair, used for motion-effect rates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

/// A timestamp as stored on disk: raw seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Datetime(pub u32);

impl Datetime {
    /// The broken-down UTC time, if the raw value is representable.
    pub fn to_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.0 as i64, 0)
    }
}

/// A non-owning handle to an object in a [`Root`].
///
/// Carries the pool index and the class identifier the root knew for that
/// index when the reference was made. Index 0 is the null sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectRef {
    index: u32,
    class_id: ClassId,
}

impl ObjectRef {
    /// The intentionally empty reference.
    pub const NULL: ObjectRef = ObjectRef {
        index: 0,
        class_id: ClassId::NULL,
    };

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn is_null(&self) -> bool {
        self.index == 0
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        ObjectRef::NULL
    }
}

/// A chunk whose class has no registered decoder. The raw body is kept so
/// the object still rewrites byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnknownChunk {
    pub class_id: ClassId,
    pub data: Vec<u8>,
}

/// One decoded object of any of the composition classes.
///
/// The linear class chains of the format (`Component` → `Clip` →
/// `SourceClip` and so on) are modeled as one sum type of concrete
/// variants; shared base fields live in header records inlined at the top
/// of each variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AvbObject {
    Attributes(Attributes),
    ParameterList(ParameterList),
    TimeCrumbList(TimeCrumbList),
    Sequence(Sequence),
    SourceClip(SourceClip),
    Timecode(Timecode),
    Edgecode(Edgecode),
    TrackRef(TrackRef),
    ParamClip(ParamClip),
    Filler(Filler),
    TrackGroup(TrackGroup),
    TrackEffect(TrackEffect),
    PanVolumeEffect(PanVolumeEffect),
    EqualizerMultiBand(EqualizerMultiBand),
    AudioSuitePluginEffect(AudioSuitePluginEffect),
    CaptureMask(CaptureMask),
    MotionEffect(MotionEffect),
    Repeat(Repeat),
    RepSet(RepSet),
    TransitionEffect(TransitionEffect),
    Selector(Selector),
    Composition(Composition),
    Unknown(UnknownChunk),
}

impl AvbObject {
    /// The concrete class identifier of this object.
    pub fn class_id(&self) -> ClassId {
        use AvbObject::*;
        match self {
            Attributes(_) => ClassId::ATTRIBUTES,
            ParameterList(_) => ClassId::PARAMETER_LIST,
            TimeCrumbList(_) => ClassId::TIME_CRUMB_LIST,
            Sequence(_) => ClassId::SEQUENCE,
            SourceClip(_) => ClassId::SOURCE_CLIP,
            Timecode(_) => ClassId::TIMECODE,
            Edgecode(_) => ClassId::EDGECODE,
            TrackRef(_) => ClassId::TRACK_REF,
            ParamClip(_) => ClassId::PARAM_CLIP,
            Filler(_) => ClassId::FILLER,
            TrackGroup(_) => ClassId::TRACK_GROUP,
            TrackEffect(_) => ClassId::TRACK_EFFECT,
            PanVolumeEffect(_) => ClassId::PAN_VOLUME_EFFECT,
            EqualizerMultiBand(_) => ClassId::EQUALIZER_MULTI_BAND,
            AudioSuitePluginEffect(_) => ClassId::AUDIO_SUITE_PLUGIN_EFFECT,
            CaptureMask(_) => ClassId::CAPTURE_MASK,
            MotionEffect(_) => ClassId::MOTION_EFFECT,
            Repeat(_) => ClassId::REPEAT,
            RepSet(_) => ClassId::REP_SET,
            TransitionEffect(_) => ClassId::TRANSITION_EFFECT,
            Selector(_) => ClassId::SELECTOR,
            Composition(_) => ClassId::COMPOSITION,
            Unknown(u) => u.class_id,
        }
    }

    /// The shared component header, for any object in the component family.
    pub fn component_header(&self) -> Option<&ComponentHeader> {
        use AvbObject::*;
        match self {
            Sequence(x) => Some(&x.header),
            SourceClip(x) => Some(&x.header),
            Timecode(x) => Some(&x.header),
            Edgecode(x) => Some(&x.header),
            TrackRef(x) => Some(&x.header),
            ParamClip(x) => Some(&x.header),
            Filler(x) => Some(&x.header),
            TrackGroup(x) => Some(&x.header),
            TrackEffect(x) => Some(&x.group.header),
            PanVolumeEffect(x) => Some(&x.effect.group.header),
            EqualizerMultiBand(x) => Some(&x.effect.group.header),
            AudioSuitePluginEffect(x) => Some(&x.effect.group.header),
            CaptureMask(x) => Some(&x.warp.group.header),
            MotionEffect(x) => Some(&x.warp.group.header),
            Repeat(x) => Some(&x.warp.group.header),
            RepSet(x) => Some(&x.group.header),
            TransitionEffect(x) => Some(&x.group.header),
            Selector(x) => Some(&x.group.header),
            Composition(x) => Some(&x.group.header),
            _ => None,
        }
    }

    /// The attribute map, if this is an `ATTR` object.
    pub fn as_attributes(&self) -> Option<&Attributes> {
        match self {
            AvbObject::Attributes(a) => Some(a),
            _ => None,
        }
    }

    #[cfg(feature = "to_json")]
    /// Serialisation of the decoded object.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }
}

/// One slot of the object pool.
#[derive(Debug, Clone)]
struct Entry {
    class_id: ClassId,
    object: Option<AvbObject>,
}

/// The object pool of one bin: every decoded object lives here and is
/// addressed by a dense index.
///
/// The root owns all objects exclusively; [`ObjectRef`]s are non-owning, so
/// reference cycles between objects are fine. Entry 0 is reserved for the
/// null sentinel. During a bulk decode pass the `reading` flag is set and
/// attribute mutations do not self-register as modified.
/// ```
/// use avb_core::{Attributes, AvbObject, ClassId, Root};
///
/// let mut root = Root::new();
/// let r = root.add_object(AvbObject::Attributes(Attributes::new()));
/// assert_eq!(r.class_id(), ClassId::ATTRIBUTES);
/// assert!(root.resolve(r).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Root {
    entries: Vec<Entry>,
    reading: bool,
    modified: FnvHashSet<u32>,
    settings: ReadSettings,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Root {
    pub fn new() -> Self {
        Self::with_settings(ReadSettings::default())
    }

    pub fn with_settings(settings: ReadSettings) -> Self {
        Root {
            // Entry 0 is the null sentinel and never holds an object.
            entries: vec![Entry {
                class_id: ClassId::NULL,
                object: None,
            }],
            reading: false,
            modified: FnvHashSet::default(),
            settings,
        }
    }

    /// Get the settings this root was opened with.
    pub fn get_settings(&self) -> &ReadSettings {
        &self.settings
    }

    /// The number of pool slots, including the reserved null slot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// Whether a bulk decode pass is in progress. While set, attribute
    /// mutations are not recorded as modifications.
    pub fn reading(&self) -> bool {
        self.reading
    }

    pub fn set_reading(&mut self, reading: bool) {
        self.reading = reading;
    }

    /// Allocate a pool slot for an object of the given class and return the
    /// reference to it. Decoders use this to register chunks before their
    /// bodies are read, so that forward references resolve to a class id.
    pub fn reserve(&mut self, class_id: ClassId) -> ObjectRef {
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            class_id,
            object: None,
        });
        ObjectRef { index, class_id }
    }

    /// Place a decoded object into a slot previously handed out by
    /// [`Self::reserve`].
    pub fn install(&mut self, r: ObjectRef, object: AvbObject) -> Result<(), AvbError> {
        if r.index == 0 || r.index as usize >= self.entries.len() {
            return Err(AvbError::BadReference {
                index: r.index,
                len: self.entries.len(),
            });
        }
        let entry = &mut self.entries[r.index as usize];
        if entry.class_id != object.class_id() {
            return Err(AvbError::InvariantViolation {
                msg: format!(
                    "slot {} is reserved for {} but got {}",
                    r.index,
                    entry.class_id,
                    object.class_id()
                ),
            });
        }
        entry.object = Some(object);
        Ok(())
    }

    /// Reserve a slot and install the object in one go.
    pub fn add_object(&mut self, object: AvbObject) -> ObjectRef {
        let r = self.reserve(object.class_id());
        self.entries[r.index as usize].object = Some(object);
        r
    }

    /// Dereference. `None` is the null sentinel: the reference was
    /// intentionally empty, points at a slot that was never installed, or
    /// is out of range.
    pub fn resolve(&self, r: ObjectRef) -> Option<&AvbObject> {
        if r.index == 0 {
            return None;
        }
        self.entries
            .get(r.index as usize)
            .and_then(|e| e.object.as_ref())
    }

    /// The class identifier known for a pool index, `NULL` if the index is
    /// 0 or outside the pool.
    pub fn class_id_at(&self, index: u32) -> ClassId {
        if index == 0 {
            return ClassId::NULL;
        }
        self.entries
            .get(index as usize)
            .map(|e| e.class_id)
            .unwrap_or(ClassId::NULL)
    }

    /// Build a reference to a pool index, caching the class id currently
    /// known for it.
    pub fn make_ref(&self, index: u32) -> ObjectRef {
        ObjectRef {
            index,
            class_id: self.class_id_at(index),
        }
    }

    /// Record an object as modified for later persistence. Idempotent.
    pub fn add_modified(&mut self, r: ObjectRef) {
        if r.index != 0 {
            self.modified.insert(r.index);
        }
    }

    pub fn is_modified(&self, r: ObjectRef) -> bool {
        self.modified.contains(&r.index)
    }

    /// Drain the modified set, returning the references in pool order.
    pub fn take_modified(&mut self) -> Vec<ObjectRef> {
        let mut indices: Vec<u32> = self.modified.drain().collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| self.make_ref(i)).collect()
    }

    /// Iterate over all installed objects with their references.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &AvbObject)> {
        self.entries.iter().enumerate().filter_map(move |(i, e)| {
            e.object.as_ref().map(|o| {
                (
                    ObjectRef {
                        index: i as u32,
                        class_id: e.class_id,
                    },
                    o,
                )
            })
        })
    }

    /// Mutable access to an `ATTR` object with modification tracking: any
    /// mutation through the returned wrapper registers the object as
    /// modified unless the root is in a bulk decode pass.
    /// ```
    /// use avb_core::{AttrValue, Attributes, AvbObject, Root};
    ///
    /// let mut root = Root::new();
    /// let r = root.add_object(AvbObject::Attributes(Attributes::new()));
    /// root.attributes_mut(r).unwrap().insert("_MARK", AttrValue::Int(1));
    /// assert_eq!(root.take_modified(), vec![r]);
    /// ```
    pub fn attributes_mut(&mut self, r: ObjectRef) -> Result<AttributesMut<'_>, AvbError> {
        let reading = self.reading;
        let len = self.entries.len();
        let Root {
            entries, modified, ..
        } = self;
        let entry = entries
            .get_mut(r.index as usize)
            .filter(|_| r.index != 0)
            .ok_or(AvbError::BadReference { index: r.index, len })?;
        match entry.object {
            Some(AvbObject::Attributes(ref mut attrs)) => Ok(AttributesMut {
                attrs,
                modified,
                index: r.index,
                reading,
            }),
            _ => Err(AvbError::InvariantViolation {
                msg: format!("object {} is not an attribute map", r.index),
            }),
        }
    }
}

/// A mutation wrapper over an [`Attributes`] object owned by a [`Root`].
///
/// Forwards map operations and records the object as modified afterwards,
/// unless the root is reading.
pub struct AttributesMut<'a> {
    attrs: &'a mut Attributes,
    modified: &'a mut FnvHashSet<u32>,
    index: u32,
    reading: bool,
}

impl<'a> AttributesMut<'a> {
    fn mark_modified(&mut self) {
        if !self.reading {
            self.modified.insert(self.index);
        }
    }

    pub fn insert(&mut self, key: &str, value: AttrValue) -> Option<AttrValue> {
        let old = self.attrs.insert(key, value);
        self.mark_modified();
        old
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let old = self.attrs.remove(key);
        self.mark_modified();
        old
    }

    pub fn clear(&mut self) {
        self.attrs.clear();
        self.mark_modified();
    }
}

impl<'a> std::ops::Deref for AttributesMut<'a> {
    type Target = Attributes;

    fn deref(&self) -> &Attributes {
        self.attrs
    }
}
