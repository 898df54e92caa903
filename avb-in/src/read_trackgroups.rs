//! Decoders for the multi-track containers and the effect classes.
//!
//! The track records are the most irregular part of the format: the number
//! of bytes a record occupies depends on its `flags` word (see
//! [`Track::ref_count_for`]), and a group body may declare more tracks than
//! it stores.
use avb_core::errors::*;
use avb_core::{
    AspiPlugin, AspiPluginChunk, AudioSuitePluginEffect, AvbObject, CaptureMask, ClassId,
    Composition, EffectInfo, EqualizerBand, EqualizerMultiBand, MobId, MotionEffect, ObjectRef,
    PanVolumeEffect, Rational, RepSet, Repeat, Root, Selector, TimeWarp, Track, TrackEffect,
    TrackGroup, TransitionEffect, TAG_BOOL, TAG_BYTE_ARRAY, TAG_DOUBLE, TAG_INT32, TAG_INT64,
    TAG_UINT16, TAG_UINT32, TAG_UINT8,
};

use crate::read_components::read_component_header;
use crate::read_scalars::{read_mob_id, read_object_ref, BodyReader};

/// Slot the collected child references of a track by their target class.
/// The raw sequence is kept alongside so the record rewrites bit-exactly.
fn classify_track_refs(
    track: &mut Track,
    refs: Vec<ObjectRef>,
    class_id: ClassId,
) -> Result<(), AvbError> {
    let mut attrs = Vec::new();
    let mut trkr = Vec::new();
    let mut others = Vec::new();
    let mut nulls = 0usize;

    for r in refs.iter() {
        let cid = r.class_id();
        if cid == ClassId::ATTRIBUTES {
            attrs.push(*r);
        } else if cid == ClassId::TRACK_REF {
            trkr.push(*r);
        } else if cid == ClassId::NULL {
            nulls += 1;
        } else {
            others.push(*r);
        }
    }

    if attrs.len() > 2 || trkr.len() > 1 || others.len() > 2 || nulls > 5 {
        return Err(AvbError::InvariantViolation {
            msg: format!(
                "{}: track holds {} attribute, {} proxy, {} component and {} null refs",
                class_id,
                attrs.len(),
                trkr.len(),
                others.len(),
                nulls
            ),
        });
    }

    track.attributes = attrs.first().copied();
    track.session_attr = attrs.get(1).copied();
    track.filler_proxy = trkr.first().copied();
    track.component = others.first().copied();
    track.bob_data = others.get(1).copied();
    track.refs = refs;
    Ok(())
}

/// The group header shared by every `TRKG`-family body: component header,
/// group scalars, the track records and the lock-number trailer.
pub fn read_track_group_header(
    r: &mut BodyReader<'_>,
    root: &Root,
    class_id: ClassId,
) -> Result<TrackGroup, AvbError> {
    let header = read_component_header(r, root)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x08)?;

    let mc_mode = r.read_u8()?;
    let group_length = r.read_s32le()?;
    let num_scalars = r.read_s32le()?;

    let track_count = r.read_s32le()?;
    let mut tracks: Vec<Track> = Vec::new();

    // Track records have variable lengths, so this loop cannot skip ahead.
    let mut has_tracks = true;
    for i in 0..track_count.max(0) {
        let mut track = Track {
            flags: r.read_u16le()?,
            ..Default::default()
        };

        // A sentinel record stores nothing past its flags word.
        if track.flags == 0 {
            tracks.push(track);
            continue;
        }

        let mut refs = Vec::new();

        // The pan/volume shape keeps a control reference and one or two
        // control variables instead of counted references.
        if Track::is_control_shape(track.flags) {
            refs.push(read_object_ref(root, r)?);
            track.index = Some((i + 1) as i16);
            track.control_code = Some(r.read_s16le()?);
            if track.flags == 100 {
                track.control_sub_code = Some(r.read_s16le()?);
            }
            classify_track_refs(&mut track, refs, class_id)?;
            tracks.push(track);
            continue;
        }

        let mut index = (i + 1) as i16;
        if Track::has_label(track.flags) {
            index = r.read_s16le()?;
        }
        track.index = Some(index);

        if track.flags == 0 && index == 0 {
            has_tracks = false;
            break;
        }

        let ref_count = Track::ref_count_for(track.flags).ok_or(AvbError::UnknownTrackFlag {
            class_id,
            flags: track.flags,
        })?;

        for _ in 0..ref_count {
            refs.push(read_object_ref(root, r)?);
        }

        classify_track_refs(&mut track, refs, class_id)?;
        tracks.push(track);
    }

    r.read_assert_tag(0x01)?;
    r.read_assert_tag(0x01)?;

    // One lock number per declared track, whether or not the records above
    // were all stored.
    for i in 0..track_count.max(0) {
        r.read_assert_tag(69)?;
        let lock = r.read_s16le()?;
        if has_tracks {
            if let Some(track) = tracks.get_mut(i as usize) {
                track.lock_number = Some(lock);
            }
        }
    }

    Ok(TrackGroup {
        header,
        mc_mode,
        group_length,
        num_scalars,
        tracks,
    })
}

pub fn read_track_group(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let group = read_track_group_header(r, root, ClassId::TRACK_GROUP)?;
    Ok(AvbObject::TrackGroup(group))
}

/// The info scalars shared by `TKFX` and the `TNFX` tail.
fn read_effect_info(r: &mut BodyReader<'_>, root: &Root) -> Result<EffectInfo, AvbError> {
    Ok(EffectInfo {
        left_length: r.read_s32le()?,
        right_length: r.read_s32le()?,
        info_version: r.read_s16le()?,
        info_current: r.read_s32le()?,
        info_smooth: r.read_s32le()?,
        info_color_item: r.read_s16le()?,
        info_quality: r.read_s16le()?,
        info_is_reversed: r.read_s8()?,
        info_aspect_on: r.read_bool()?,
        keyframes: read_object_ref(root, r)?,
        info_force_software: r.read_bool()?,
        info_never_hardware: r.read_bool()?,
    })
}

/// The track-effect base body. No close byte: only the exact class `TKFX`
/// terminates here, subclasses keep reading.
pub fn read_track_effect_header(
    r: &mut BodyReader<'_>,
    root: &Root,
    class_id: ClassId,
) -> Result<TrackEffect, AvbError> {
    let group = read_track_group_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x06)?;

    let info = read_effect_info(r, root)?;

    let mut trackman = None;
    while let Some(tag) = r.next_extension()? {
        match tag {
            0x02 => {
                r.read_assert_tag(TAG_UINT32)?;
                trackman = Some(read_object_ref(root, r)?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    Ok(TrackEffect {
        group,
        info,
        trackman,
    })
}

pub fn read_track_effect(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let effect = read_track_effect_header(r, root, ClassId::TRACK_EFFECT)?;
    r.read_assert_tag(0x03)?;
    Ok(AvbObject::TrackEffect(effect))
}

pub fn read_pan_volume(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let class_id = ClassId::PAN_VOLUME_EFFECT;
    let effect = read_track_effect_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x05)?;

    let level = r.read_s32le()?;
    let pan = r.read_s32le()?;

    let suppress_validation = r.read_bool()?;
    let level_set = r.read_bool()?;
    let pan_set = r.read_bool()?;

    let mut supports_seperate_gain = None;
    let mut is_trim_gain_effect = None;
    while let Some(tag) = r.next_extension()? {
        match tag {
            0x01 => {
                r.read_assert_tag(TAG_INT32)?;
                supports_seperate_gain = Some(r.read_s32le()?);
            }
            0x02 => {
                r.read_assert_tag(TAG_INT32)?;
                is_trim_gain_effect = Some(r.read_s32le()?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::PanVolumeEffect(PanVolumeEffect {
        effect,
        level,
        pan,
        suppress_validation,
        level_set,
        pan_set,
        supports_seperate_gain,
        is_trim_gain_effect,
    }))
}

pub fn read_equalizer(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let effect = read_track_effect_header(r, root, ClassId::EQUALIZER_MULTI_BAND)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x05)?;

    let num_bands = r.read_s32le()?;
    if num_bands < 0 {
        return Err(AvbError::InvariantViolation {
            msg: format!("EQMB: negative band count {}", num_bands),
        });
    }

    let mut bands = Vec::with_capacity(num_bands as usize);
    for _ in 0..num_bands {
        bands.push(EqualizerBand {
            band_type: r.read_s32le()?,
            freq: r.read_s32le()?,
            gain: r.read_s32le()?,
            q: r.read_s32le()?,
            enable: r.read_bool()?,
        });
    }

    let effect_enable = r.read_bool()?;
    let filter_name = r.read_string()?;

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::EqualizerMultiBand(EqualizerMultiBand {
        effect,
        bands,
        effect_enable,
        filter_name,
    }))
}

pub fn read_audio_suite(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let class_id = ClassId::AUDIO_SUITE_PLUGIN_EFFECT;
    let effect = read_track_effect_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let number_of_plugins = r.read_s32le()?;
    if number_of_plugins < 0 {
        return Err(AvbError::InvariantViolation {
            msg: format!("ASPI: negative plugin count {}", number_of_plugins),
        });
    }

    let mut plugins = Vec::with_capacity(number_of_plugins as usize);
    for _ in 0..number_of_plugins {
        let mut plugin = AspiPlugin {
            name: r.read_string()?,
            manufacturer_id: r.read_u32le()?,
            product_id: r.read_u32le()?,
            plugin_id: r.read_u32le()?,
            chunks: Vec::new(),
        };

        let num_of_chunks = r.read_s32le()?;
        for _ in 0..num_of_chunks.max(0) {
            let chunk_size = r.read_s32le()?;
            if chunk_size < 0 {
                return Err(AvbError::InvariantViolation {
                    msg: format!("ASPI: negative chunk size {}", chunk_size),
                });
            }

            let chunk = AspiPluginChunk {
                version: r.read_s32le()?,
                manufacturer_id: r.read_u32le()?,
                product_id: r.read_u32le()?,
                plugin_id: r.read_u32le()?,
                chunk_id: r.read_u32le()?,
                name: r.read_string()?,
                data: r.read_bytes(chunk_size as usize)?,
            };
            plugin.chunks.push(chunk);
        }
        plugins.push(plugin);
    }

    let mut out = AudioSuitePluginEffect {
        effect,
        plugins,
        ..Default::default()
    };

    while let Some(tag) = r.next_extension()? {
        match tag {
            0x01 => {
                // Undocumented pair of words; kept verbatim, never
                // interpreted.
                r.read_assert_tag(TAG_INT32)?;
                let hi = r.read_s32le()?;
                r.read_assert_tag(TAG_INT32)?;
                let lo = r.read_s32le()?;
                out.mob_id_words = Some((hi, lo));
            }
            0x02 => {
                r.read_assert_tag(TAG_INT64)?;
                out.mark_in = Some(r.read_s64le()?);
            }
            0x03 => {
                r.read_assert_tag(TAG_INT64)?;
                out.mark_out = Some(r.read_s64le()?);
            }
            0x04 => {
                r.read_assert_tag(TAG_UINT32)?;
                out.tracks_to_affect = Some(r.read_u32le()?);
            }
            0x05 => {
                r.read_assert_tag(TAG_INT32)?;
                out.rendering_mode = Some(r.read_s32le()?);
            }
            0x06 => {
                r.read_assert_tag(TAG_INT32)?;
                out.padding_secs = Some(r.read_s32le()?);
            }
            0x08 => {
                // Unlike everywhere else, this MobID is stored with a tag
                // on every field.
                let mut mob_id = MobId::default();
                r.read_assert_tag(TAG_BYTE_ARRAY)?;
                let length = r.read_s32le()?;
                if length != 12 {
                    return Err(AvbError::InvariantViolation {
                        msg: format!("ASPI: SMPTE label length {}", length),
                    });
                }
                mob_id.smpte_label.copy_from_slice(&r.read_bytes(12)?);
                r.read_assert_tag(TAG_UINT8)?;
                mob_id.length = r.read_u8()?;
                r.read_assert_tag(TAG_UINT8)?;
                mob_id.instance_high = r.read_u8()?;
                r.read_assert_tag(TAG_UINT8)?;
                mob_id.instance_mid = r.read_u8()?;
                r.read_assert_tag(TAG_UINT8)?;
                mob_id.instance_low = r.read_u8()?;
                r.read_assert_tag(TAG_UINT32)?;
                mob_id.data1 = r.read_u32le()?;
                r.read_assert_tag(TAG_UINT16)?;
                mob_id.data2 = r.read_u16le()?;
                r.read_assert_tag(TAG_UINT16)?;
                mob_id.data3 = r.read_u16le()?;
                r.read_assert_tag(TAG_BYTE_ARRAY)?;
                let length = r.read_s32le()?;
                if length != 8 {
                    return Err(AvbError::InvariantViolation {
                        msg: format!("ASPI: Data4 length {}", length),
                    });
                }
                mob_id.data4.copy_from_slice(&r.read_bytes(8)?);
                out.mob_id = Some(mob_id);
            }
            0x09 => {
                r.read_assert_tag(TAG_UINT32)?;
                let preset_path_length = r.read_u32le()?;
                r.read_assert_tag(TAG_BYTE_ARRAY)?;
                let length = r.read_u32le()?;
                if preset_path_length != length {
                    return Err(AvbError::InvariantViolation {
                        msg: format!(
                            "ASPI: preset path length {} != byte array length {}",
                            preset_path_length, length
                        ),
                    });
                }
                out.preset_path = Some(r.read_bytes(length as usize)?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::AudioSuitePluginEffect(out))
}

/// The retiming base body shared by `MASK`, `SPED` and `REPT`.
pub fn read_time_warp_header(
    r: &mut BodyReader<'_>,
    root: &Root,
    class_id: ClassId,
) -> Result<TimeWarp, AvbError> {
    let group = read_track_group_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x02)?;
    let phase_offset = r.read_s32le()?;

    Ok(TimeWarp {
        group,
        phase_offset,
    })
}

pub fn read_capture_mask(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let warp = read_time_warp_header(r, root, ClassId::CAPTURE_MASK)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let is_double = r.read_bool()?;
    let mask_bits = r.read_u32le()?;

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::CaptureMask(CaptureMask {
        warp,
        is_double,
        mask_bits,
    }))
}

pub fn read_motion_effect(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let class_id = ClassId::MOTION_EFFECT;
    let warp = read_time_warp_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x03)?;

    let num = r.read_s32le()?;
    let den = r.read_s32le()?;

    let mut out = MotionEffect {
        warp,
        rate: Rational { num, den },
        ..Default::default()
    };

    while let Some(tag) = r.next_extension()? {
        match tag {
            0x01 => {
                r.read_assert_tag(TAG_DOUBLE)?;
                out.offset_adjust = Some(r.read_f64le()?);
            }
            0x02 => {
                r.read_assert_tag(TAG_UINT32)?;
                out.source_param_list = Some(read_object_ref(root, r)?);
            }
            0x03 => {
                r.read_assert_tag(TAG_BOOL)?;
                out.new_source_calculation = Some(r.read_bool()?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::MotionEffect(out))
}

pub fn read_repeat(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let warp = read_time_warp_header(r, root, ClassId::REPEAT)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::Repeat(Repeat { warp }))
}

pub fn read_rep_set(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let class_id = ClassId::REP_SET;
    let group = read_track_group_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let mut rep_set_type = None;
    while let Some(tag) = r.next_extension()? {
        match tag {
            0x01 => {
                r.read_assert_tag(TAG_INT32)?;
                rep_set_type = Some(r.read_s32le()?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::RepSet(RepSet {
        group,
        rep_set_type,
    }))
}

pub fn read_transition(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let class_id = ClassId::TRANSITION_EFFECT;
    let group = read_track_group_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let cutpoint = r.read_s32le()?;

    // The rest of the body repeats the track-effect tail, one version back.
    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x05)?;

    let info = read_effect_info(r, root)?;

    let mut trackman = None;
    while let Some(tag) = r.next_extension()? {
        match tag {
            0x01 => {
                r.read_assert_tag(TAG_UINT32)?;
                trackman = Some(read_object_ref(root, r)?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::TransitionEffect(TransitionEffect {
        group,
        cutpoint,
        info,
        trackman,
    }))
}

pub fn read_selector(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let group = read_track_group_header(r, root, ClassId::SELECTOR)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let is_ganged = r.read_bool()?;
    let selected = r.read_u16le()?;

    if selected as usize >= group.tracks.len() {
        return Err(AvbError::InvariantViolation {
            msg: format!(
                "SLCT: selected track {} of {}",
                selected,
                group.tracks.len()
            ),
        });
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::Selector(Selector {
        group,
        is_ganged,
        selected,
    }))
}

pub fn read_composition(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    let class_id = ClassId::COMPOSITION;
    let group = read_track_group_header(r, root, class_id)?;

    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x02)?;

    // The legacy two-word mob id adds nothing over the SMPTE id that
    // follows in the extension block.
    let _mob_id_hi = r.read_s32le()?;
    let _mob_id_lo = r.read_s32le()?;
    let last_modified = r.read_s32le()?;

    let mob_type_id = r.read_u8()?;
    let usage_code = r.read_s32le()?;
    let descriptor = read_object_ref(root, r)?;

    let mut creation_time = None;
    let mut mob_id = None;
    while let Some(tag) = r.next_extension()? {
        match tag {
            0x01 => {
                r.read_assert_tag(TAG_INT32)?;
                creation_time = Some(r.read_datetime()?);
                mob_id = Some(read_mob_id(r)?);
            }
            tag => return Err(AvbError::UnknownExtension { class_id, tag }),
        }
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::Composition(Composition {
        group,
        last_modified,
        mob_type_id,
        usage_code,
        descriptor,
        creation_time,
        mob_id,
    }))
}
