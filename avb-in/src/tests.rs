use crate::chunk_file::MappedChunk;
use crate::{read_chunk_file, read_object, read_pool, Chunk};

use avb_core::{AttrValue, AvbError, AvbObject, ClassId, Datetime, MediaKind, ReadSettings, Root};

// NB: The fixture tests only work with the chunk files in place.
const CHUNK_DIR: &str = "../testdata/chunks";

fn fixture(class_dir: &str, name: &str) -> Chunk {
    read_chunk_file(&format!("{}/{}/{}", CHUNK_DIR, class_dir, name)).expect("missing fixture")
}

fn decode(class_dir: &str, name: &str) -> AvbObject {
    let chunk = fixture(class_dir, name);
    let root = Root::new();
    read_object(&root, chunk.class_id, &chunk.data).expect("decode failed")
}

// A few bodies are assembled by hand to drive the error paths; the helpers
// below build the fixed header prefixes.

fn component_header_bytes() -> Vec<u8> {
    let mut v = vec![0x02, 0x03];
    v.extend_from_slice(&0u32.to_le_bytes()); // left_bob
    v.extend_from_slice(&0u32.to_le_bytes()); // right_bob
    v.extend_from_slice(&1i16.to_le_bytes()); // media_kind_id
    v.extend_from_slice(&25i32.to_le_bytes()); // edit_rate mantissa
    v.extend_from_slice(&0i32.to_le_bytes()); // edit_rate exponent
    v.extend_from_slice(&0u16.to_le_bytes()); // name ""
    v.extend_from_slice(&0u16.to_le_bytes()); // effect_id ""
    v.extend_from_slice(&0u32.to_le_bytes()); // attribute_ref
    v.extend_from_slice(&0u32.to_le_bytes()); // session_ref
    v.extend_from_slice(&0u32.to_le_bytes()); // precomputed
    v.extend_from_slice(&[0x01, 0x01, 72]);
    v.extend_from_slice(&0u32.to_le_bytes()); // param_list
    v
}

fn track_group_bytes(track: &[u8]) -> Vec<u8> {
    let mut v = component_header_bytes();
    v.extend_from_slice(&[0x02, 0x08, 0x00]); // envelope + mc_mode
    v.extend_from_slice(&0i32.to_le_bytes()); // group length
    v.extend_from_slice(&0i32.to_le_bytes()); // num_scalars
    v.extend_from_slice(&1i32.to_le_bytes()); // track count
    v.extend_from_slice(track);
    v.extend_from_slice(&[0x01, 0x01, 69]);
    v.extend_from_slice(&0i16.to_le_bytes()); // lock number
    v
}

fn flags4_track() -> Vec<u8> {
    let mut v = 4u16.to_le_bytes().to_vec();
    v.extend_from_slice(&0u32.to_le_bytes());
    v
}

#[test]
fn test_mapped_chunk_framing() {
    let path = format!("{}/FILL/fill_01.chunk", CHUNK_DIR);
    let chunk = MappedChunk::open(&path).expect("Couldn't map chunk");
    assert_eq!(chunk.class_id(), ClassId::FILLER);
    assert_eq!(chunk.body().len(), 52);
    assert_eq!(chunk.to_chunk(), fixture("FILL", "fill_01.chunk"));
}

#[test]
fn test_attr_chunk() {
    let attrs = match decode("ATTR", "attr_01.chunk") {
        AvbObject::Attributes(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(attrs.len(), 4);
    assert_eq!(attrs.get("_COUNT"), Some(&AttrValue::Int(3)));
    assert_eq!(attrs.get("_NAME"), Some(&AttrValue::from("clip A")));
    assert!(matches!(attrs.get("_REF"), Some(AttrValue::Obj(r)) if r.is_null()));
    assert_eq!(attrs.get("_BLOB"), Some(&AttrValue::Bytes(vec![1, 2, 3])));
}

#[test]
fn test_ref_list_chunks() {
    let prls = match decode("PRLS", "prls_01.chunk") {
        AvbObject::ParameterList(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(prls.refs.len(), 3);
    assert_eq!(prls.refs[0].index(), 1);
    assert!(prls.refs[2].is_null());

    let tmcs = match decode("TMCS", "tmcs_01.chunk") {
        AvbObject::TimeCrumbList(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(tmcs.refs.len(), 2);
}

#[test]
fn test_sequence_chunk() {
    let sequ = match decode("SEQU", "sequ_01.chunk") {
        AvbObject::Sequence(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(sequ.header.name.to_string_lossy(), "V1");
    assert_eq!(sequ.header.media_kind(), MediaKind::Picture);
    assert_eq!(sequ.header.edit_rate.value(), 25.0);
    assert_eq!(
        sequ.component_refs.iter().map(|r| r.index()).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn test_source_clip_chunk() {
    let sclp = match decode("SCLP", "sclp_01.chunk") {
        AvbObject::SourceClip(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(sclp.header.length, 100);
    assert_eq!((sclp.mob_id_hi, sclp.mob_id_lo), (5, 6));
    assert_eq!(sclp.track_id, 1);
    assert_eq!(sclp.start_time, 0);
    assert_eq!(sclp.mob_id.data1, 0x1234);
    assert!(!sclp.mob_id.is_zero());
}

#[test]
fn test_source_clip_zero_legacy_id_zeroes_the_mob_id() {
    // Hand-built: the legacy words are zero but the SMPTE payload is not.
    let mut body = component_header_bytes();
    body.extend_from_slice(&[0x02, 0x01]);
    body.extend_from_slice(&100u32.to_le_bytes());
    body.extend_from_slice(&[0x02, 0x03]);
    body.extend_from_slice(&0i32.to_le_bytes());
    body.extend_from_slice(&0i32.to_le_bytes());
    body.extend_from_slice(&1i16.to_le_bytes());
    body.extend_from_slice(&0i32.to_le_bytes());
    let mut payload = [0u8; 32];
    payload[0] = 0x06; // SMPTE label
    payload[17] = 0xFE; // Data1
    body.extend_from_slice(&payload);
    body.push(0x03);

    let root = Root::new();
    let sclp = match read_object(&root, ClassId::SOURCE_CLIP, &body).unwrap() {
        AvbObject::SourceClip(x) => x,
        _ => panic!("wrong class"),
    };
    assert!(sclp.mob_id.is_zero());
}

#[test]
fn test_timecode_chunk() {
    let tccp = match decode("TCCP", "tccp_01.chunk") {
        AvbObject::Timecode(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(tccp.header.length, 107892);
    assert_eq!(tccp.flags, 0);
    assert_eq!(tccp.fps, 25);
    assert_eq!(tccp.reserved, [0, 1, 2, 3, 4, 5]);
    assert_eq!(tccp.start, 90000);
}

#[test]
fn test_clip_family_chunks() {
    let fill = match decode("FILL", "fill_01.chunk") {
        AvbObject::Filler(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(fill.header.length, 10);

    assert!(matches!(
        decode("ECCP", "eccp_01.chunk"),
        AvbObject::Edgecode(_)
    ));
    assert!(matches!(
        decode("TRKR", "trkr_01.chunk"),
        AvbObject::TrackRef(_)
    ));
    assert!(matches!(
        decode("PRCL", "prcl_01.chunk"),
        AvbObject::ParamClip(_)
    ));
}

#[test]
fn test_track_group_chunk() {
    let trkg = match decode("TRKG", "trkg_01.chunk") {
        AvbObject::TrackGroup(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(trkg.mc_mode, 2);
    assert_eq!(trkg.group_length, 100);
    assert_eq!(trkg.tracks.len(), 2);

    // Flags 4 and 12 store no label; the index is synthesized.
    let t0 = &trkg.tracks[0];
    assert_eq!(t0.flags, 4);
    assert_eq!(t0.index, Some(1));
    assert_eq!(t0.refs.len(), 1);
    assert_eq!(t0.lock_number, Some(0));

    let t1 = &trkg.tracks[1];
    assert_eq!(t1.flags, 12);
    assert_eq!(t1.index, Some(2));
    assert_eq!(t1.refs.len(), 2);
}

#[test]
fn test_track_effect_chunk() {
    let tkfx = match decode("TKFX", "tkfx_01.chunk") {
        AvbObject::TrackEffect(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(tkfx.group.tracks.len(), 1);
    assert_eq!(tkfx.group.tracks[0].flags, 21);
    assert_eq!(tkfx.group.tracks[0].index, Some(1));
    assert_eq!(tkfx.info.info_quality, 2);
    assert_eq!(tkfx.info.keyframes.index(), 3);
    assert_eq!(tkfx.trackman.map(|r| r.index()), Some(4));
}

#[test]
fn test_pan_volume_chunks() {
    let pvol = match decode("PVOL", "pvol_01.chunk") {
        AvbObject::PanVolumeEffect(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(pvol.level, 1536);
    assert_eq!(pvol.pan, -200);
    assert!(!pvol.suppress_validation);
    assert!(pvol.level_set);
    assert!(pvol.pan_set);
    assert_eq!(pvol.supports_seperate_gain, Some(1));
    assert_eq!(pvol.is_trim_gain_effect, Some(0));

    // The control-shape track stores a control code instead of a label.
    let track = &pvol.effect.group.tracks[0];
    assert_eq!(track.flags, 36);
    assert_eq!(track.index, Some(1));
    assert_eq!(track.control_code, Some(1));
    assert_eq!(track.control_sub_code, None);
    assert_eq!(track.refs.len(), 1);

    let pvol2 = match decode("PVOL", "pvol_02.chunk") {
        AvbObject::PanVolumeEffect(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(pvol2.effect.group.tracks[0].flags, 100);
    assert_eq!(pvol2.effect.group.tracks[0].control_sub_code, Some(2));
    assert_eq!(pvol2.supports_seperate_gain, None);
    assert_eq!(pvol2.is_trim_gain_effect, None);
    assert_eq!(pvol2.effect.trackman, None);
}

#[test]
fn test_equalizer_chunk() {
    let eqmb = match decode("EQMB", "eqmb_01.chunk") {
        AvbObject::EqualizerMultiBand(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(eqmb.bands.len(), 2);
    assert_eq!(eqmb.bands[0].freq, 80);
    assert_eq!(eqmb.bands[0].gain, -3);
    assert!(eqmb.bands[0].enable);
    assert!(!eqmb.bands[1].enable);
    assert!(eqmb.effect_enable);
    assert_eq!(eqmb.filter_name.to_string_lossy(), "Parametric");
}

#[test]
fn test_audio_suite_chunk() {
    let aspi = match decode("ASPI", "aspi_01.chunk") {
        AvbObject::AudioSuitePluginEffect(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(aspi.plugins.len(), 1);
    let plugin = &aspi.plugins[0];
    assert_eq!(plugin.name.to_string_lossy(), "EQ III");
    assert_eq!(plugin.chunks.len(), 1);
    assert_eq!(plugin.chunks[0].chunk_id, 0x73746174);
    assert_eq!(plugin.chunks[0].data, vec![0x10, 0x20, 0x30, 0x40, 0x55]);

    assert_eq!(aspi.mob_id_words, Some((12, 34)));
    assert_eq!(aspi.mark_in, Some(3600));
    assert_eq!(aspi.mark_out, Some(7200));
    assert_eq!(aspi.tracks_to_affect, Some(1));
    assert_eq!(aspi.rendering_mode, Some(0));
    assert_eq!(aspi.padding_secs, Some(2));
    assert_eq!(aspi.mob_id.unwrap().data1, 0xCAFE);
    assert_eq!(
        aspi.preset_path.as_deref(),
        Some(&b"Plug-In Settings/lead vox.txt"[..])
    );
}

#[test]
fn test_time_warp_chunks() {
    let mask = match decode("MASK", "mask_01.chunk") {
        AvbObject::CaptureMask(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(mask.warp.phase_offset, 0);
    assert!(!mask.is_double);
    assert_eq!(mask.mask_bits, 0b10100);

    let sped = match decode("SPED", "sped_01.chunk") {
        AvbObject::MotionEffect(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!((sped.rate.num, sped.rate.den), (2, 1));
    assert_eq!(sped.offset_adjust, Some(0.5));
    assert_eq!(sped.source_param_list.map(|r| r.index()), Some(2));
    assert_eq!(sped.new_source_calculation, Some(true));

    // Repeat adds nothing over the retiming base.
    let rept = match decode("REPT", "rept_01.chunk") {
        AvbObject::Repeat(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(rept.warp.phase_offset, 3);
}

#[test]
fn test_rep_set_chunks() {
    let rset = match decode("RSET", "rset_01.chunk") {
        AvbObject::RepSet(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(rset.rep_set_type, Some(2));

    let rset2 = match decode("RSET", "rset_02.chunk") {
        AvbObject::RepSet(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(rset2.rep_set_type, None);
}

#[test]
fn test_transition_chunk() {
    let tnfx = match decode("TNFX", "tnfx_01.chunk") {
        AvbObject::TransitionEffect(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(tnfx.cutpoint, 12);
    assert_eq!(tnfx.group.tracks.len(), 2);

    // The sentinel record keeps only its flags word.
    let sentinel = &tnfx.group.tracks[0];
    assert_eq!(sentinel.flags, 0);
    assert_eq!(sentinel.index, None);
    assert!(sentinel.refs.is_empty());
    assert_eq!(sentinel.lock_number, Some(0));

    assert_eq!(tnfx.group.tracks[1].index, Some(2));
    assert_eq!(tnfx.trackman.map(|r| r.index()), Some(4));
}

#[test]
fn test_selector_chunk() {
    let slct = match decode("SLCT", "slct_01.chunk") {
        AvbObject::Selector(x) => x,
        _ => panic!("wrong class"),
    };
    assert!(slct.is_ganged);
    assert_eq!(slct.selected, 1);
    assert!((slct.selected as usize) < slct.group.tracks.len());
}

#[test]
fn test_composition_chunk() {
    let cmpo = match decode("CMPO", "cmpo_01.chunk") {
        AvbObject::Composition(x) => x,
        _ => panic!("wrong class"),
    };
    assert_eq!(cmpo.last_modified, 0x5F000000);
    assert_eq!(cmpo.mob_type().unwrap(), avb_core::MobType::MasterMob);
    assert_eq!(cmpo.usage(), avb_core::Usage::MasterMob);
    assert_eq!(cmpo.creation_time, Some(Datetime(0x5F000100)));
    assert_eq!(cmpo.mob_id.unwrap().data1, 0xBEEF);
}

#[test]
fn test_pool_resolves_track_references() {
    let chunks = vec![
        fixture("FILL", "fill_01.chunk"),
        fixture("FILL", "fill_01.chunk"),
        fixture("FILL", "fill_01.chunk"),
        fixture("SLCT", "slct_01.chunk"),
    ];
    let root = read_pool(chunks, ReadSettings::default()).unwrap();
    assert_eq!(root.len(), 5);
    assert!(!root.reading());

    let slct = match root.resolve(root.make_ref(4)).unwrap() {
        AvbObject::Selector(x) => x,
        _ => panic!("wrong class"),
    };

    // With the pool in place the track references classify as components.
    for (i, track) in slct.group.tracks.iter().enumerate() {
        assert_eq!(track.component.map(|r| r.index()), Some(i as u32 + 1));
        assert!(matches!(track.segment(&root), Some(AvbObject::Filler(_))));
    }
    let segments: Vec<_> = slct.components(&root).collect();
    assert_eq!(segments.len(), 3);
    assert!(segments.iter().all(|s| s.is_some()));

    // Every stored reference resolves within the pool or is null.
    for (_, object) in root.iter() {
        if let AvbObject::Selector(s) = object {
            for track in s.group.tracks.iter() {
                for r in track.refs.iter() {
                    assert!(r.is_null() || root.resolve(*r).is_some());
                }
            }
        }
    }
}

#[test]
fn test_unknown_class_is_an_error_for_single_objects() {
    let chunk = fixture("CDCI", "cdci_01.chunk");
    let root = Root::new();
    let err = read_object(&root, chunk.class_id, &chunk.data).unwrap_err();
    assert!(matches!(
        err,
        AvbError::UnknownClass { class_id } if class_id == ClassId(*b"CDCI")
    ));
}

#[test]
fn test_pool_preserves_unknown_media_descriptors() {
    // CDCI and RGBA have no registered decoder; the pool keeps their raw
    // bodies under their class id.
    for (dir, name) in [("CDCI", "cdci_01.chunk"), ("RGBA", "rgba_01.chunk")] {
        let chunk = fixture(dir, name);
        let root = read_pool(vec![chunk.clone()], ReadSettings::default()).unwrap();
        let object = root.resolve(root.make_ref(1)).unwrap();
        let mut id = [0u8; 4];
        id.copy_from_slice(dir.as_bytes());
        assert_eq!(object.class_id(), ClassId(id));
        match object {
            AvbObject::Unknown(u) => assert_eq!(u.data, chunk.data),
            _ => panic!("expected an opaque chunk"),
        }
    }
}

#[test]
fn test_pool_can_refuse_unknown_classes() {
    let mut settings = ReadSettings::default();
    settings.set_skip_unknown_classes(false);
    let err = read_pool(vec![fixture("CDCI", "cdci_01.chunk")], settings).unwrap_err();
    assert!(matches!(err, AvbError::UnknownClass { .. }));
}

#[test]
fn test_unknown_track_flag_is_fatal() {
    let mut track = 7u16.to_le_bytes().to_vec();
    track.extend_from_slice(&1i16.to_le_bytes()); // label
    let body = track_group_bytes(&track);

    let root = Root::new();
    let err = read_object(&root, ClassId::TRACK_GROUP, &body).unwrap_err();
    assert!(matches!(
        err,
        AvbError::UnknownTrackFlag { flags: 7, .. }
    ));
}

#[test]
fn test_unknown_extension_is_fatal() {
    // RSET only claims extension slot 1.
    let mut body = track_group_bytes(&flags4_track());
    body.extend_from_slice(&[0x02, 0x01]);
    body.extend_from_slice(&[0x01, 0x02, 71]);
    body.extend_from_slice(&0i32.to_le_bytes());
    body.push(0x03);

    let root = Root::new();
    let err = read_object(&root, ClassId::REP_SET, &body).unwrap_err();
    assert!(matches!(
        err,
        AvbError::UnknownExtension { tag: 0x02, class_id } if class_id == ClassId::REP_SET
    ));
}

#[test]
fn test_selector_bound_is_checked() {
    let mut body = track_group_bytes(&flags4_track());
    body.extend_from_slice(&[0x02, 0x01, 0x00]); // envelope + is_ganged
    body.extend_from_slice(&1u16.to_le_bytes()); // selected == track count
    body.push(0x03);

    let root = Root::new();
    let err = read_object(&root, ClassId::SELECTOR, &body).unwrap_err();
    assert!(matches!(err, AvbError::InvariantViolation { .. }));
}

#[test]
fn test_missing_close_byte_is_fatal() {
    let mut body = component_header_bytes();
    body.extend_from_slice(&[0x02, 0x01]);
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&[0x02, 0x01, 0x04]); // 0x04 where 0x03 must sit

    let root = Root::new();
    let err = read_object(&root, ClassId::FILLER, &body).unwrap_err();
    assert!(matches!(
        err,
        AvbError::StructuralMismatch {
            expected: 0x03,
            found: 0x04
        }
    ));
}

#[test]
fn test_truncated_body_is_fatal() {
    let chunk = fixture("SEQU", "sequ_01.chunk");
    let root = Root::new();
    let err = read_object(&root, chunk.class_id, &chunk.data[..chunk.data.len() - 6]).unwrap_err();
    assert!(matches!(err, AvbError::EndOfStream { .. }));
}

#[test]
fn test_trailing_bytes_are_refused_by_default() {
    let chunk = fixture("FILL", "fill_01.chunk");
    let mut body = chunk.data.clone();
    body.push(0x00);

    let root = Root::new();
    let err = read_object(&root, chunk.class_id, &body).unwrap_err();
    assert!(matches!(err, AvbError::TrailingBytes { count: 1, .. }));

    let mut settings = ReadSettings::default();
    settings.set_allow_trailing_bytes(true);
    let root = Root::with_settings(settings);
    assert!(read_object(&root, chunk.class_id, &body).is_ok());
}

#[test]
fn test_check_refs_bounds_indices() {
    let mut body = vec![0x02, 0x01];
    body.extend_from_slice(&1i32.to_le_bytes());
    body.extend_from_slice(&9u32.to_le_bytes()); // index outside the pool
    body.push(0x03);

    let mut settings = ReadSettings::default();
    settings.set_check_refs(true);
    let root = Root::with_settings(settings);
    let err = read_object(&root, ClassId::PARAMETER_LIST, &body).unwrap_err();
    assert!(matches!(err, AvbError::BadReference { index: 9, .. }));

    // The permissive default keeps the dangling index as-is.
    let root = Root::new();
    assert!(read_object(&root, ClassId::PARAMETER_LIST, &body).is_ok());
}
