//! Decoders for the base component and its clip-family classes.
use avb_core::errors::*;
use avb_core::{
    AvbObject, ComponentHeader, Edgecode, Filler, MobId, ParamClip, Root, Sequence, SourceClip,
    Timecode, TrackRef, TAG_UINT32,
};

use crate::read_scalars::{read_mob_id, read_object_ref, BodyReader};

/// The shared header at the top of every component-family body.
pub fn read_component_header(
    r: &mut BodyReader<'_>,
    root: &Root,
) -> Result<ComponentHeader, AvbError> {
    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x03)?;

    let mut header = ComponentHeader {
        left_bob: read_object_ref(root, r)?,
        right_bob: read_object_ref(root, r)?,
        ..Default::default()
    };

    header.media_kind_id = r.read_s16le()?;
    header.edit_rate = r.read_exp10()?;
    header.name = r.read_string()?;
    header.effect_id = r.read_string()?;

    header.attribute_ref = read_object_ref(root, r)?;
    header.session_ref = read_object_ref(root, r)?;
    header.precomputed = read_object_ref(root, r)?;

    // The parameter list rides in a fixed sub-section rather than the body
    // proper.
    r.read_assert_tag(0x01)?;
    r.read_assert_tag(0x01)?;
    r.read_assert_tag(TAG_UINT32)?;
    header.param_list = read_object_ref(root, r)?;

    Ok(header)
}

/// The clip tail: its own envelope plus the length override.
pub fn read_clip_tail(
    r: &mut BodyReader<'_>,
    header: &mut ComponentHeader,
) -> Result<(), AvbError> {
    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;
    header.length = r.read_u32le()?;
    Ok(())
}

pub fn read_sequence(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let header = read_component_header(r, root)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x03)?;

    let count = r.read_u32le()?;
    let mut component_refs = Vec::new();
    for _ in 0..count {
        component_refs.push(read_object_ref(root, r)?);
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::Sequence(Sequence {
        header,
        component_refs,
    }))
}

pub fn read_source_clip(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let mut header = read_component_header(r, root)?;
    read_clip_tail(r, &mut header)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x03)?;

    let mob_id_hi = r.read_s32le()?;
    let mob_id_lo = r.read_s32le()?;
    let track_id = r.read_s16le()?;
    let start_time = r.read_s32le()?;
    let mut mob_id = read_mob_id(r)?;

    // A zeroed legacy id always means "no material", whatever the SMPTE
    // field bytes say.
    if mob_id_hi == 0 && mob_id_lo == 0 {
        mob_id = MobId::default();
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::SourceClip(SourceClip {
        header,
        mob_id_hi,
        mob_id_lo,
        track_id,
        start_time,
        mob_id,
    }))
}

pub fn read_timecode(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let mut header = read_component_header(r, root)?;
    read_clip_tail(r, &mut header)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let flags = r.read_u32le()?;
    let fps = r.read_u16le()?;

    let mut reserved = [0u8; 6];
    reserved.copy_from_slice(&r.read_bytes(6)?);

    let start = r.read_u32le()?;

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::Timecode(Timecode {
        header,
        flags,
        fps,
        reserved,
        start,
    }))
}

pub fn read_edgecode(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let mut header = read_component_header(r, root)?;
    read_clip_tail(r, &mut header)?;
    Ok(AvbObject::Edgecode(Edgecode { header }))
}

pub fn read_track_ref(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let mut header = read_component_header(r, root)?;
    read_clip_tail(r, &mut header)?;
    Ok(AvbObject::TrackRef(TrackRef { header }))
}

pub fn read_param_clip(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let mut header = read_component_header(r, root)?;
    read_clip_tail(r, &mut header)?;
    Ok(AvbObject::ParamClip(ParamClip { header }))
}

pub fn read_filler(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let mut header = read_component_header(r, root)?;
    read_clip_tail(r, &mut header)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;
    r.read_assert_tag(0x03)?;

    Ok(AvbObject::Filler(Filler { header }))
}
