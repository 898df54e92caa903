//! This module uses `avb-in` and `avb-out` together to make roundtrip
//! tests and observe whether the crates stay wire-compatible: every
//! fixture chunk must re-encode to the exact bytes it was decoded from,
//! and objects built in memory must survive a write-reload cycle.
use crate::encode_object;

use avb_core::{AvbObject, Root};
use avb_in::{read_chunk_file, read_object, Chunk};

mod chunk_roundtrip;

const CHUNK_DIR: &str = "../testdata/chunks";

fn fixture(class_dir: &str, name: &str) -> Chunk {
    read_chunk_file(&format!("{}/{}/{}", CHUNK_DIR, class_dir, name)).expect("missing fixture")
}

fn decode_fixture(class_dir: &str, name: &str) -> (Chunk, AvbObject) {
    let chunk = fixture(class_dir, name);
    let root = Root::new();
    let object = read_object(&root, chunk.class_id, &chunk.data).expect("decode failed");
    (chunk, object)
}

/// Decode a fixture and check that re-encoding reproduces its bytes.
fn assert_roundtrip(class_dir: &str, name: &str) {
    let (chunk, object) = decode_fixture(class_dir, name);
    let encoded = encode_object(&object).expect("encode failed");
    assert_eq!(
        encoded, chunk.data,
        "{}/{} did not roundtrip byte-exactly",
        class_dir, name
    );
}
