//! This is a library for decoding the object chunks of Avid bin (AVB)
//! files into the `avb-core` object model.
//!
//! The outer container (chunk framing inside the bin, the index table,
//! header and footer) is a collaborator's concern: this crate consumes
//! `(class id, body bytes)` pairs. Each body is decoded by the registered
//! decoder for its class; the resulting objects live in an
//! [`avb_core::Root`] pool and reference one another by index.
//!
//! This library is not designed for editing of bins by itself, although
//! together with `avb-out` a decoded pool can be rewritten chunk by chunk.
extern crate log;
extern crate memmap2;

pub mod chunk_file;
pub mod read_attributes;
pub mod read_components;
pub mod read_scalars;
pub mod read_trackgroups;
#[cfg(test)]
mod tests;

pub use avb_core::enums;
pub use avb_core::errors::*;
pub use avb_core::{AvbObject, ClassId, ObjectRef, ReadSettings, Root, UnknownChunk};

pub use chunk_file::{read_chunk_file, MappedChunk};

use read_scalars::BodyReader;

/// One object body as supplied by the outer container.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub class_id: ClassId,
    pub data: Vec<u8>,
}

/// A decoder entry point: consumes a body positioned at its first byte.
pub type DecodeFn = fn(&mut BodyReader<'_>, &Root) -> Result<AvbObject, AvbError>;

/// The static class registry: every class identifier this crate can decode,
/// with its decoder.
pub static CLASS_REGISTRY: &[(ClassId, DecodeFn)] = &[
    (ClassId::ATTRIBUTES, read_attributes::read_attributes),
    (ClassId::PARAMETER_LIST, read_attributes::read_parameter_list),
    (ClassId::TIME_CRUMB_LIST, read_attributes::read_time_crumb_list),
    (ClassId::SEQUENCE, read_components::read_sequence),
    (ClassId::SOURCE_CLIP, read_components::read_source_clip),
    (ClassId::TIMECODE, read_components::read_timecode),
    (ClassId::EDGECODE, read_components::read_edgecode),
    (ClassId::TRACK_REF, read_components::read_track_ref),
    (ClassId::PARAM_CLIP, read_components::read_param_clip),
    (ClassId::FILLER, read_components::read_filler),
    (ClassId::TRACK_GROUP, read_trackgroups::read_track_group),
    (ClassId::TRACK_EFFECT, read_trackgroups::read_track_effect),
    (ClassId::PAN_VOLUME_EFFECT, read_trackgroups::read_pan_volume),
    (ClassId::EQUALIZER_MULTI_BAND, read_trackgroups::read_equalizer),
    (
        ClassId::AUDIO_SUITE_PLUGIN_EFFECT,
        read_trackgroups::read_audio_suite,
    ),
    (ClassId::CAPTURE_MASK, read_trackgroups::read_capture_mask),
    (ClassId::MOTION_EFFECT, read_trackgroups::read_motion_effect),
    (ClassId::REPEAT, read_trackgroups::read_repeat),
    (ClassId::REP_SET, read_trackgroups::read_rep_set),
    (ClassId::TRANSITION_EFFECT, read_trackgroups::read_transition),
    (ClassId::SELECTOR, read_trackgroups::read_selector),
    (ClassId::COMPOSITION, read_trackgroups::read_composition),
];

/// Look up the decoder for a class identifier.
pub fn decoder_for(class_id: ClassId) -> Option<DecodeFn> {
    CLASS_REGISTRY
        .iter()
        .find(|(id, _)| *id == class_id)
        .map(|(_, f)| *f)
}

/// Decode one object body against an existing root.
///
/// The root supplies reference resolution (class ids for indices the pool
/// already knows) and the read settings; the returned object is not
/// installed into it. Bodies of unregistered classes yield
/// [`AvbError::UnknownClass`]; by default a decoder must consume the body
/// exactly.
pub fn read_object(root: &Root, class_id: ClassId, body: &[u8]) -> Result<AvbObject, AvbError> {
    let decode = decoder_for(class_id).ok_or(AvbError::UnknownClass { class_id })?;

    let mut r = BodyReader::new(body);
    let object = decode(&mut r, root)?;

    if r.remaining() != 0 && !root.get_settings().get_allow_trailing_bytes() {
        return Err(AvbError::TrailingBytes {
            class_id,
            count: r.remaining(),
        });
    }
    Ok(object)
}

/// Decode a whole pool of chunks into a fresh [`Root`].
///
/// All chunks are first reserved so that references between them resolve to
/// a class id regardless of decode order, then every body is decoded with
/// the root's `reading` flag set. Chunks of unregistered classes are kept
/// as opaque [`UnknownChunk`] objects when the settings say so (the
/// default), otherwise they fail the read.
///
/// ```
/// use std::env::var;
/// use std::path::PathBuf;
/// use avb_core::{ClassId, ReadSettings};
/// use avb_in::{read_chunk_file, read_pool};
///
/// let mut root_dir = var("CARGO_MANIFEST_DIR").map(PathBuf::from).unwrap();
/// root_dir.pop();
/// let dir = root_dir.join("testdata").join("chunks");
///
/// let chunks = vec![
///     read_chunk_file(dir.join("FILL").join("fill_01.chunk").to_str().unwrap()).unwrap(),
/// ];
/// let root = read_pool(chunks, ReadSettings::default()).unwrap();
/// // The pool holds the null slot plus the decoded filler.
/// assert_eq!(root.len(), 2);
/// assert_eq!(root.class_id_at(1), ClassId::FILLER);
/// ```
pub fn read_pool<I>(chunks: I, settings: ReadSettings) -> Result<Root, AvbError>
where
    I: IntoIterator<Item = Chunk>,
{
    let chunks: Vec<Chunk> = chunks.into_iter().collect();
    let mut root = Root::with_settings(settings);

    let refs: Vec<ObjectRef> = chunks.iter().map(|c| root.reserve(c.class_id)).collect();

    root.set_reading(true);
    for (chunk, r) in chunks.into_iter().zip(refs) {
        let object = match read_object(&root, chunk.class_id, &chunk.data) {
            Ok(object) => object,
            Err(AvbError::UnknownClass { class_id })
                if root.get_settings().get_skip_unknown_classes() =>
            {
                log::warn!(
                    "no decoder for class {}, keeping {} byte(s) as-is",
                    class_id,
                    chunk.data.len()
                );
                AvbObject::Unknown(UnknownChunk {
                    class_id,
                    data: chunk.data,
                })
            }
            Err(e) => {
                root.set_reading(false);
                return Err(e);
            }
        };
        root.install(r, object)?;
    }
    root.set_reading(false);

    Ok(root)
}
