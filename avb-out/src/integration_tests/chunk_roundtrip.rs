use super::{assert_roundtrip, decode_fixture, fixture};
use crate::{encode_modified, encode_object, write_chunk_file};

use avb_core::{
    AttrValue, Attributes, AvbError, AvbObject, ClassId, ObjectRef, ReadSettings, Root, Selector,
    Timecode, TimeCrumbList, Track, TrackGroup,
};
use avb_in::chunk_file::MappedChunk;
use avb_in::{read_object, read_pool};

#[test]
fn attribute_chunks_roundtrip() {
    assert_roundtrip("ATTR", "attr_01.chunk");
    assert_roundtrip("PRLS", "prls_01.chunk");
    assert_roundtrip("TMCS", "tmcs_01.chunk");
}

#[test]
fn component_chunks_roundtrip() {
    assert_roundtrip("SEQU", "sequ_01.chunk");
    assert_roundtrip("SCLP", "sclp_01.chunk");
    assert_roundtrip("SCLP", "sclp_02.chunk");
    assert_roundtrip("TCCP", "tccp_01.chunk");
    assert_roundtrip("FILL", "fill_01.chunk");
    assert_roundtrip("ECCP", "eccp_01.chunk");
    assert_roundtrip("TRKR", "trkr_01.chunk");
    assert_roundtrip("PRCL", "prcl_01.chunk");
}

#[test]
fn track_group_chunks_roundtrip() {
    assert_roundtrip("TRKG", "trkg_01.chunk");
    assert_roundtrip("TKFX", "tkfx_01.chunk");
    assert_roundtrip("PVOL", "pvol_01.chunk");
    assert_roundtrip("PVOL", "pvol_02.chunk");
    assert_roundtrip("EQMB", "eqmb_01.chunk");
    assert_roundtrip("ASPI", "aspi_01.chunk");
    assert_roundtrip("MASK", "mask_01.chunk");
    assert_roundtrip("SPED", "sped_01.chunk");
    assert_roundtrip("REPT", "rept_01.chunk");
    assert_roundtrip("RSET", "rset_01.chunk");
    assert_roundtrip("RSET", "rset_02.chunk");
    assert_roundtrip("TNFX", "tnfx_01.chunk");
    assert_roundtrip("SLCT", "slct_01.chunk");
    assert_roundtrip("CMPO", "cmpo_01.chunk");
}

#[test]
fn unknown_chunks_roundtrip_opaquely() {
    for (dir, name) in [("CDCI", "cdci_01.chunk"), ("RGBA", "rgba_01.chunk")] {
        let chunk = fixture(dir, name);
        let root = read_pool(vec![chunk.clone()], ReadSettings::default()).unwrap();
        let object = root.resolve(root.make_ref(1)).unwrap();
        assert_eq!(encode_object(object).unwrap(), chunk.data);
    }
}

#[test]
fn chunk_file_write_and_reload() {
    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let (chunk, object) = decode_fixture("CMPO", "cmpo_01.chunk");

    let path = dir.path().join("cmpo_rewrite.chunk");
    write_chunk_file(&path, &object).unwrap();

    let reloaded = MappedChunk::open(path.to_str().unwrap()).unwrap();
    assert_eq!(reloaded.class_id(), ClassId::COMPOSITION);
    assert_eq!(reloaded.body(), &chunk.data[..]);
}

#[test]
fn built_objects_survive_a_write_reload_cycle() {
    let mut attrs = Attributes::new();
    attrs.insert("_VERSION", AttrValue::Int(2));
    attrs.insert("_LABEL", AttrValue::from("bin A"));
    attrs.insert("_STATE", AttrValue::Bytes(vec![0xAA, 0xBB]));
    let object = AvbObject::Attributes(attrs);

    let dir = tempfile::tempdir().expect("Couldn't get tempfile.");
    let path = dir.path().join("attrs.chunk");
    write_chunk_file(&path, &object).unwrap();

    let chunk = MappedChunk::open(path.to_str().unwrap()).unwrap().to_chunk();
    let root = Root::new();
    let decoded = read_object(&root, chunk.class_id, &chunk.data).unwrap();
    assert_eq!(decoded, object);
}

#[test]
fn timecode_roundtrips_through_the_model() {
    let mut tc = Timecode::default();
    tc.header.media_kind_id = 3;
    tc.header.edit_rate = avb_core::Exp10 {
        mantissa: 30,
        exponent: 0,
    };
    tc.header.length = 1800;
    tc.fps = 30;
    tc.start = 108000;
    let object = AvbObject::Timecode(tc);

    let body = encode_object(&object).unwrap();
    let root = Root::new();
    assert_eq!(read_object(&root, ClassId::TIMECODE, &body).unwrap(), object);
}

#[test]
fn modified_attributes_are_drained_for_persistence() {
    let chunks = vec![fixture("ATTR", "attr_01.chunk")];
    let mut root = read_pool(chunks, ReadSettings::default()).unwrap();

    // Nothing is dirty right after a bulk decode.
    assert!(encode_modified(&mut root).unwrap().is_empty());

    let r = root.make_ref(1);
    root.attributes_mut(r)
        .unwrap()
        .insert("_TOUCHED", AttrValue::Int(1));

    let drained = encode_modified(&mut root).unwrap();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].0, r);

    // The drained body decodes back with the mutation in place.
    let decoded = read_object(&root, ClassId::ATTRIBUTES, &drained[0].1).unwrap();
    assert_eq!(
        decoded.as_attributes().unwrap().get("_TOUCHED"),
        Some(&AttrValue::Int(1))
    );

    // Draining is idempotent until the next mutation.
    assert!(encode_modified(&mut root).unwrap().is_empty());
}

#[test]
fn selector_bound_is_checked_on_encode() {
    let mut slct = Selector::default();
    slct.selected = 0; // no tracks at all
    let err = encode_object(&AvbObject::Selector(slct)).unwrap_err();
    assert!(matches!(err, AvbError::InvariantViolation { .. }));
}

#[test]
fn track_flags_are_checked_on_encode() {
    let mut group = TrackGroup::default();
    let mut track = Track::default();
    track.flags = 7;
    track.index = Some(1);
    group.tracks.push(track);
    let err = encode_object(&AvbObject::TrackGroup(group.clone())).unwrap_err();
    assert!(matches!(err, AvbError::UnknownTrackFlag { flags: 7, .. }));

    // A known flags value still needs the matching number of refs.
    group.tracks[0].flags = 4;
    group.tracks[0].refs = vec![ObjectRef::NULL, ObjectRef::NULL];
    let err = encode_object(&AvbObject::TrackGroup(group)).unwrap_err();
    assert!(matches!(err, AvbError::InvariantViolation { .. }));
}

#[test]
fn oversized_crumb_lists_are_refused() {
    let list = TimeCrumbList {
        refs: vec![ObjectRef::NULL; i16::MAX as usize + 1],
    };
    let err = encode_object(&AvbObject::TimeCrumbList(list)).unwrap_err();
    assert!(matches!(err, AvbError::InvariantViolation { .. }));
}
