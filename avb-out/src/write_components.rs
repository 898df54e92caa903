//! Encoders for the base component and its clip-family classes.
use avb_core::errors::*;
use avb_core::{
    ComponentHeader, Edgecode, Filler, ParamClip, Sequence, SourceClip, Timecode, TrackRef,
    TAG_UINT32,
};

use crate::write_scalars::BodyWriter;

pub fn write_component_header(
    w: &mut BodyWriter,
    header: &ComponentHeader,
) -> Result<(), AvbError> {
    w.write_u8(0x02);
    w.write_u8(0x03);

    w.write_object_ref(header.left_bob);
    w.write_object_ref(header.right_bob);

    w.write_s16le(header.media_kind_id);
    w.write_exp10(header.edit_rate);
    w.write_string(&header.name)?;
    w.write_string(&header.effect_id)?;

    w.write_object_ref(header.attribute_ref);
    w.write_object_ref(header.session_ref);
    w.write_object_ref(header.precomputed);

    w.write_u8(0x01);
    w.write_u8(0x01);
    w.write_u8(TAG_UINT32);
    w.write_object_ref(header.param_list);

    Ok(())
}

pub fn write_clip_tail(w: &mut BodyWriter, header: &ComponentHeader) {
    w.write_u8(0x02);
    w.write_u8(0x01);
    w.write_u32le(header.length);
}

pub fn write_sequence(w: &mut BodyWriter, seq: &Sequence) -> Result<(), AvbError> {
    write_component_header(w, &seq.header)?;

    w.write_u8(0x02);
    w.write_u8(0x03);

    w.write_u32le(seq.component_refs.len() as u32);
    for r in seq.component_refs.iter() {
        w.write_object_ref(*r);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_source_clip(w: &mut BodyWriter, clip: &SourceClip) -> Result<(), AvbError> {
    write_component_header(w, &clip.header)?;
    write_clip_tail(w, &clip.header);

    w.write_u8(0x02);
    w.write_u8(0x03);

    w.write_s32le(clip.mob_id_hi);
    w.write_s32le(clip.mob_id_lo);
    w.write_s16le(clip.track_id);
    w.write_s32le(clip.start_time);
    w.write_mob_id(&clip.mob_id);

    w.write_u8(0x03);
    Ok(())
}

pub fn write_timecode(w: &mut BodyWriter, tc: &Timecode) -> Result<(), AvbError> {
    write_component_header(w, &tc.header)?;
    write_clip_tail(w, &tc.header);

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_u32le(tc.flags);
    w.write_u16le(tc.fps);
    w.write_bytes(&tc.reserved);
    w.write_u32le(tc.start);

    w.write_u8(0x03);
    Ok(())
}

pub fn write_edgecode(w: &mut BodyWriter, ec: &Edgecode) -> Result<(), AvbError> {
    write_component_header(w, &ec.header)?;
    write_clip_tail(w, &ec.header);
    Ok(())
}

pub fn write_track_ref(w: &mut BodyWriter, tr: &TrackRef) -> Result<(), AvbError> {
    write_component_header(w, &tr.header)?;
    write_clip_tail(w, &tr.header);
    Ok(())
}

pub fn write_param_clip(w: &mut BodyWriter, pc: &ParamClip) -> Result<(), AvbError> {
    write_component_header(w, &pc.header)?;
    write_clip_tail(w, &pc.header);
    Ok(())
}

pub fn write_filler(w: &mut BodyWriter, fill: &Filler) -> Result<(), AvbError> {
    write_component_header(w, &fill.header)?;
    write_clip_tail(w, &fill.header);

    w.write_u8(0x02);
    w.write_u8(0x01);
    w.write_u8(0x03);
    Ok(())
}
