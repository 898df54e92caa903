//! This is a library for encoding `avb-core` objects back into Avid bin
//! (AVB) object chunks. Every encoder is the exact inverse of its decoder
//! in `avb-in`, so a decoded object rewrites byte-for-byte as long as none
//! of the documented lossy normalizations applied.
//!
//! The outer container is a collaborator's concern; this crate produces
//! `(class id, body bytes)` pairs and can frame single objects into the
//! same `.chunk` files that `avb-in` reads.
extern crate avb_core;
extern crate num;
#[cfg(test)]
extern crate avb_in;
#[cfg(test)]
extern crate tempfile;

#[cfg(test)]
mod integration_tests;
pub mod write_attributes;
pub mod write_components;
pub mod write_scalars;
pub mod write_trackgroups;

pub use avb_core::enums;
pub use avb_core::errors::*;
pub use avb_core::{AvbObject, ClassId, ObjectRef, Root};

use std::io::Write;
use std::path::Path;

use crate::write_scalars::BodyWriter;

/// Encode one object into its body bytes.
///
/// References already carry their pool index, so no root is needed;
/// opaque chunks of unregistered classes are passed through untouched.
pub fn encode_object(object: &AvbObject) -> Result<Vec<u8>, AvbError> {
    let mut w = BodyWriter::new();
    match object {
        AvbObject::Attributes(x) => write_attributes::write_attributes(&mut w, x)?,
        AvbObject::ParameterList(x) => write_attributes::write_parameter_list(&mut w, x)?,
        AvbObject::TimeCrumbList(x) => write_attributes::write_time_crumb_list(&mut w, x)?,
        AvbObject::Sequence(x) => write_components::write_sequence(&mut w, x)?,
        AvbObject::SourceClip(x) => write_components::write_source_clip(&mut w, x)?,
        AvbObject::Timecode(x) => write_components::write_timecode(&mut w, x)?,
        AvbObject::Edgecode(x) => write_components::write_edgecode(&mut w, x)?,
        AvbObject::TrackRef(x) => write_components::write_track_ref(&mut w, x)?,
        AvbObject::ParamClip(x) => write_components::write_param_clip(&mut w, x)?,
        AvbObject::Filler(x) => write_components::write_filler(&mut w, x)?,
        AvbObject::TrackGroup(x) => write_trackgroups::write_track_group(&mut w, x)?,
        AvbObject::TrackEffect(x) => write_trackgroups::write_track_effect(&mut w, x)?,
        AvbObject::PanVolumeEffect(x) => write_trackgroups::write_pan_volume(&mut w, x)?,
        AvbObject::EqualizerMultiBand(x) => write_trackgroups::write_equalizer(&mut w, x)?,
        AvbObject::AudioSuitePluginEffect(x) => write_trackgroups::write_audio_suite(&mut w, x)?,
        AvbObject::CaptureMask(x) => write_trackgroups::write_capture_mask(&mut w, x)?,
        AvbObject::MotionEffect(x) => write_trackgroups::write_motion_effect(&mut w, x)?,
        AvbObject::Repeat(x) => write_trackgroups::write_repeat(&mut w, x)?,
        AvbObject::RepSet(x) => write_trackgroups::write_rep_set(&mut w, x)?,
        AvbObject::TransitionEffect(x) => write_trackgroups::write_transition(&mut w, x)?,
        AvbObject::Selector(x) => write_trackgroups::write_selector(&mut w, x)?,
        AvbObject::Composition(x) => write_trackgroups::write_composition(&mut w, x)?,
        AvbObject::Unknown(x) => w.write_bytes(&x.data),
    }
    Ok(w.into_bytes())
}

/// Encode an object and frame it into a `.chunk` file (four class-id
/// bytes, `u32` little-endian body length, body).
pub fn write_chunk_file<P: AsRef<Path>>(path: P, object: &AvbObject) -> Result<(), AvbError> {
    let body = encode_object(object)?;
    if body.len() > u32::MAX as usize {
        return Err(AvbError::InvariantViolation {
            msg: format!("body of {} bytes does not fit a u32 length", body.len()),
        });
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(object.class_id().as_bytes())?;
    file.write_all(&(body.len() as u32).to_le_bytes())?;
    file.write_all(&body)?;
    Ok(())
}

/// Drain the root's modified set, encoding each dirty object. The outer
/// container decides where the bodies go.
pub fn encode_modified(root: &mut Root) -> Result<Vec<(ObjectRef, Vec<u8>)>, AvbError> {
    let mut out = Vec::new();
    for r in root.take_modified() {
        let object = root.resolve(r).ok_or(AvbError::BadReference {
            index: r.index(),
            len: root.len(),
        })?;
        out.push((r, encode_object(object)?));
    }
    Ok(out)
}
