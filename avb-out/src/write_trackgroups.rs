//! Encoders for the multi-track containers and the effect classes. Each is
//! the exact inverse of its decoder, writing optional extension blocks only
//! for fields that are present.
use avb_core::errors::*;
use avb_core::{
    AudioSuitePluginEffect, CaptureMask, ClassId, Composition, EffectInfo, EqualizerMultiBand,
    MotionEffect, PanVolumeEffect, RepSet, Repeat, Selector, TimeWarp, Track, TrackEffect,
    TrackGroup, TransitionEffect, TAG_BOOL, TAG_BYTE_ARRAY, TAG_DOUBLE, TAG_INT32, TAG_INT64,
    TAG_UINT16, TAG_UINT32, TAG_UINT8,
};

use crate::write_components::write_component_header;
use crate::write_scalars::BodyWriter;

/// Write one track record. The bytes a record stores are fully determined
/// by its flags word, so the raw reference sequence must agree with the
/// flags table.
fn write_track(w: &mut BodyWriter, track: &Track, class_id: ClassId) -> Result<(), AvbError> {
    w.write_u16le(track.flags);

    // A sentinel record is its flags word and nothing else.
    if track.flags == 0 {
        return Ok(());
    }

    if Track::is_control_shape(track.flags) {
        let control_ref = track.refs.first().ok_or_else(|| AvbError::InvariantViolation {
            msg: format!("{}: control-shape track without a control ref", class_id),
        })?;
        w.write_object_ref(*control_ref);
        w.write_s16le(track.control_code.unwrap_or(0));
        if track.flags == 100 {
            w.write_s16le(track.control_sub_code.unwrap_or(0));
        }
        return Ok(());
    }

    if Track::has_label(track.flags) {
        w.write_s16le(track.index.unwrap_or(0));
    }

    let ref_count = Track::ref_count_for(track.flags).ok_or(AvbError::UnknownTrackFlag {
        class_id,
        flags: track.flags,
    })?;
    if track.refs.len() != ref_count {
        return Err(AvbError::InvariantViolation {
            msg: format!(
                "{}: flags {} require {} refs, track has {}",
                class_id,
                track.flags,
                ref_count,
                track.refs.len()
            ),
        });
    }

    for r in track.refs.iter() {
        w.write_object_ref(*r);
    }
    Ok(())
}

pub fn write_track_group_header(
    w: &mut BodyWriter,
    group: &TrackGroup,
    class_id: ClassId,
) -> Result<(), AvbError> {
    write_component_header(w, &group.header)?;

    w.write_u8(0x02);
    w.write_u8(0x08);

    w.write_u8(group.mc_mode);
    w.write_s32le(group.group_length);
    w.write_s32le(group.num_scalars);

    w.write_s32le(group.tracks.len() as i32);
    for track in group.tracks.iter() {
        write_track(w, track, class_id)?;
    }

    w.write_u8(0x01);
    w.write_u8(0x01);

    for track in group.tracks.iter() {
        w.write_u8(69);
        w.write_s16le(track.lock_number.unwrap_or(0));
    }
    Ok(())
}

pub fn write_track_group(w: &mut BodyWriter, group: &TrackGroup) -> Result<(), AvbError> {
    write_track_group_header(w, group, ClassId::TRACK_GROUP)
}

fn write_effect_info(w: &mut BodyWriter, info: &EffectInfo) {
    w.write_s32le(info.left_length);
    w.write_s32le(info.right_length);

    w.write_s16le(info.info_version);
    w.write_s32le(info.info_current);
    w.write_s32le(info.info_smooth);
    w.write_s16le(info.info_color_item);
    w.write_s16le(info.info_quality);
    w.write_s8(info.info_is_reversed);
    w.write_bool(info.info_aspect_on);

    w.write_object_ref(info.keyframes);
    w.write_bool(info.info_force_software);
    w.write_bool(info.info_never_hardware);
}

/// The track-effect base body. No close byte: only the exact class `TKFX`
/// terminates here.
pub fn write_track_effect_header(
    w: &mut BodyWriter,
    effect: &TrackEffect,
    class_id: ClassId,
) -> Result<(), AvbError> {
    write_track_group_header(w, &effect.group, class_id)?;

    w.write_u8(0x02);
    w.write_u8(0x06);

    write_effect_info(w, &effect.info);

    if let Some(trackman) = effect.trackman {
        w.write_u8(0x01);
        w.write_u8(0x02);
        w.write_u8(TAG_UINT32);
        w.write_object_ref(trackman);
    }
    Ok(())
}

pub fn write_track_effect(w: &mut BodyWriter, effect: &TrackEffect) -> Result<(), AvbError> {
    write_track_effect_header(w, effect, ClassId::TRACK_EFFECT)?;
    w.write_u8(0x03);
    Ok(())
}

pub fn write_pan_volume(w: &mut BodyWriter, pvol: &PanVolumeEffect) -> Result<(), AvbError> {
    write_track_effect_header(w, &pvol.effect, ClassId::PAN_VOLUME_EFFECT)?;

    w.write_u8(0x02);
    w.write_u8(0x05);

    w.write_s32le(pvol.level);
    w.write_s32le(pvol.pan);

    w.write_bool(pvol.suppress_validation);
    w.write_bool(pvol.level_set);
    w.write_bool(pvol.pan_set);

    if let Some(v) = pvol.supports_seperate_gain {
        w.write_u8(0x01);
        w.write_u8(0x01);
        w.write_u8(TAG_INT32);
        w.write_s32le(v);
    }
    if let Some(v) = pvol.is_trim_gain_effect {
        w.write_u8(0x01);
        w.write_u8(0x02);
        w.write_u8(TAG_INT32);
        w.write_s32le(v);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_equalizer(
    w: &mut BodyWriter,
    eq: &EqualizerMultiBand,
) -> Result<(), AvbError> {
    write_track_effect_header(w, &eq.effect, ClassId::EQUALIZER_MULTI_BAND)?;

    w.write_u8(0x02);
    w.write_u8(0x05);

    w.write_s32le(eq.bands.len() as i32);
    for band in eq.bands.iter() {
        w.write_s32le(band.band_type);
        w.write_s32le(band.freq);
        w.write_s32le(band.gain);
        w.write_s32le(band.q);
        w.write_bool(band.enable);
    }

    w.write_bool(eq.effect_enable);
    w.write_string(&eq.filter_name)?;

    w.write_u8(0x03);
    Ok(())
}

pub fn write_audio_suite(
    w: &mut BodyWriter,
    aspi: &AudioSuitePluginEffect,
) -> Result<(), AvbError> {
    write_track_effect_header(w, &aspi.effect, ClassId::AUDIO_SUITE_PLUGIN_EFFECT)?;

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_s32le(aspi.plugins.len() as i32);
    for plugin in aspi.plugins.iter() {
        w.write_string(&plugin.name)?;
        w.write_u32le(plugin.manufacturer_id);
        w.write_u32le(plugin.product_id);
        w.write_u32le(plugin.plugin_id);

        w.write_s32le(plugin.chunks.len() as i32);
        for chunk in plugin.chunks.iter() {
            w.write_s32le(chunk.data.len() as i32);

            w.write_s32le(chunk.version);
            w.write_u32le(chunk.manufacturer_id);
            w.write_u32le(chunk.product_id);
            w.write_u32le(chunk.plugin_id);

            w.write_u32le(chunk.chunk_id);
            w.write_string(&chunk.name)?;
            w.write_bytes(&chunk.data);
        }
    }

    if let Some((hi, lo)) = aspi.mob_id_words {
        w.write_u8(0x01);
        w.write_u8(0x01);
        w.write_u8(TAG_INT32);
        w.write_s32le(hi);
        w.write_u8(TAG_INT32);
        w.write_s32le(lo);
    }
    if let Some(v) = aspi.mark_in {
        w.write_u8(0x01);
        w.write_u8(0x02);
        w.write_u8(TAG_INT64);
        w.write_s64le(v);
    }
    if let Some(v) = aspi.mark_out {
        w.write_u8(0x01);
        w.write_u8(0x03);
        w.write_u8(TAG_INT64);
        w.write_s64le(v);
    }
    if let Some(v) = aspi.tracks_to_affect {
        w.write_u8(0x01);
        w.write_u8(0x04);
        w.write_u8(TAG_UINT32);
        w.write_u32le(v);
    }
    if let Some(v) = aspi.rendering_mode {
        w.write_u8(0x01);
        w.write_u8(0x05);
        w.write_u8(TAG_INT32);
        w.write_s32le(v);
    }
    if let Some(v) = aspi.padding_secs {
        w.write_u8(0x01);
        w.write_u8(0x06);
        w.write_u8(TAG_INT32);
        w.write_s32le(v);
    }
    if let Some(mob_id) = aspi.mob_id {
        w.write_u8(0x01);
        w.write_u8(0x08);
        w.write_u8(TAG_BYTE_ARRAY);
        w.write_s32le(12);
        w.write_bytes(&mob_id.smpte_label);
        w.write_u8(TAG_UINT8);
        w.write_u8(mob_id.length);
        w.write_u8(TAG_UINT8);
        w.write_u8(mob_id.instance_high);
        w.write_u8(TAG_UINT8);
        w.write_u8(mob_id.instance_mid);
        w.write_u8(TAG_UINT8);
        w.write_u8(mob_id.instance_low);
        w.write_u8(TAG_UINT32);
        w.write_u32le(mob_id.data1);
        w.write_u8(TAG_UINT16);
        w.write_u16le(mob_id.data2);
        w.write_u8(TAG_UINT16);
        w.write_u16le(mob_id.data3);
        w.write_u8(TAG_BYTE_ARRAY);
        w.write_s32le(8);
        w.write_bytes(&mob_id.data4);
    }
    if let Some(preset_path) = aspi.preset_path.as_ref() {
        w.write_u8(0x01);
        w.write_u8(0x09);
        w.write_u8(TAG_UINT32);
        w.write_u32le(preset_path.len() as u32);
        w.write_u8(TAG_BYTE_ARRAY);
        w.write_u32le(preset_path.len() as u32);
        w.write_bytes(preset_path);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_time_warp_header(
    w: &mut BodyWriter,
    warp: &TimeWarp,
    class_id: ClassId,
) -> Result<(), AvbError> {
    write_track_group_header(w, &warp.group, class_id)?;

    w.write_u8(0x02);
    w.write_u8(0x02);
    w.write_s32le(warp.phase_offset);
    Ok(())
}

pub fn write_capture_mask(w: &mut BodyWriter, mask: &CaptureMask) -> Result<(), AvbError> {
    write_time_warp_header(w, &mask.warp, ClassId::CAPTURE_MASK)?;

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_bool(mask.is_double);
    w.write_u32le(mask.mask_bits);

    w.write_u8(0x03);
    Ok(())
}

pub fn write_motion_effect(w: &mut BodyWriter, sped: &MotionEffect) -> Result<(), AvbError> {
    write_time_warp_header(w, &sped.warp, ClassId::MOTION_EFFECT)?;

    w.write_u8(0x02);
    w.write_u8(0x03);

    w.write_s32le(sped.rate.num);
    w.write_s32le(sped.rate.den);

    if let Some(v) = sped.offset_adjust {
        w.write_u8(0x01);
        w.write_u8(0x01);
        w.write_u8(TAG_DOUBLE);
        w.write_f64le(v);
    }
    if let Some(v) = sped.source_param_list {
        w.write_u8(0x01);
        w.write_u8(0x02);
        w.write_u8(TAG_UINT32);
        w.write_object_ref(v);
    }
    if let Some(v) = sped.new_source_calculation {
        w.write_u8(0x01);
        w.write_u8(0x03);
        w.write_u8(TAG_BOOL);
        w.write_bool(v);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_repeat(w: &mut BodyWriter, rept: &Repeat) -> Result<(), AvbError> {
    write_time_warp_header(w, &rept.warp, ClassId::REPEAT)?;

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_u8(0x03);
    Ok(())
}

pub fn write_rep_set(w: &mut BodyWriter, rset: &RepSet) -> Result<(), AvbError> {
    write_track_group_header(w, &rset.group, ClassId::REP_SET)?;

    w.write_u8(0x02);
    w.write_u8(0x01);

    if let Some(v) = rset.rep_set_type {
        w.write_u8(0x01);
        w.write_u8(0x01);
        w.write_u8(TAG_INT32);
        w.write_s32le(v);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_transition(
    w: &mut BodyWriter,
    tnfx: &TransitionEffect,
) -> Result<(), AvbError> {
    write_track_group_header(w, &tnfx.group, ClassId::TRANSITION_EFFECT)?;

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_s32le(tnfx.cutpoint);

    w.write_u8(0x02);
    w.write_u8(0x05);

    write_effect_info(w, &tnfx.info);

    if let Some(trackman) = tnfx.trackman {
        w.write_u8(0x01);
        w.write_u8(0x01);
        w.write_u8(TAG_UINT32);
        w.write_object_ref(trackman);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_selector(w: &mut BodyWriter, slct: &Selector) -> Result<(), AvbError> {
    if slct.selected as usize >= slct.group.tracks.len() {
        return Err(AvbError::InvariantViolation {
            msg: format!(
                "SLCT: selected track {} of {}",
                slct.selected,
                slct.group.tracks.len()
            ),
        });
    }

    write_track_group_header(w, &slct.group, ClassId::SELECTOR)?;

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_bool(slct.is_ganged);
    w.write_u16le(slct.selected);

    w.write_u8(0x03);
    Ok(())
}

pub fn write_composition(w: &mut BodyWriter, cmpo: &Composition) -> Result<(), AvbError> {
    write_track_group_header(w, &cmpo.group, ClassId::COMPOSITION)?;

    w.write_u8(0x02);
    w.write_u8(0x02);

    // The legacy two-word mob id is not kept on the model; the SMPTE id in
    // the extension block is authoritative.
    w.write_s32le(0);
    w.write_s32le(0);
    w.write_s32le(cmpo.last_modified);

    w.write_u8(cmpo.mob_type_id);
    w.write_s32le(cmpo.usage_code);
    w.write_object_ref(cmpo.descriptor);

    if let Some(creation_time) = cmpo.creation_time {
        w.write_u8(0x01);
        w.write_u8(0x01);
        w.write_u8(TAG_INT32);
        w.write_datetime(creation_time);
        w.write_mob_id(&cmpo.mob_id.unwrap_or_default());
    }

    w.write_u8(0x03);
    Ok(())
}
