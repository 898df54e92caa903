//! This submodule loads single-object chunk files as memory maps.
//!
//! The outer bin container is out of scope for this workspace; what the
//! decoders need is a `(class id, body)` pair per object. For fixtures and
//! tooling those pairs are kept in `.chunk` files with a minimal framing:
//! four ASCII class-id bytes, a `u32` little-endian body length, then the
//! body itself.
use avb_core::errors::*;
use avb_core::ClassId;

use memmap2::{Mmap, MmapOptions};

use crate::Chunk;

/// Framing bytes in front of the body: class id plus declared length.
pub const CHUNK_HEADER_LEN: usize = 8;

/// One chunk file mapped into memory.
pub struct MappedChunk {
    pub(crate) map: Mmap,
    _file: std::fs::File,
}

impl MappedChunk {
    /// Map a chunk file and check its framing.
    ///
    /// ```
    /// use std::env::var;
    /// use std::path::PathBuf;
    /// use avb_in::chunk_file::MappedChunk;
    /// use avb_core::ClassId;
    ///
    /// let mut root = var("CARGO_MANIFEST_DIR").map(PathBuf::from).unwrap();
    /// root.pop();
    /// let name = root.join("testdata").join("chunks").join("FILL").join("fill_01.chunk");
    /// let chunk = MappedChunk::open(name.to_str().unwrap()).unwrap();
    /// assert_eq!(chunk.class_id(), ClassId::FILLER);
    /// ```
    pub fn open(file_name: &str) -> Result<MappedChunk, AvbError> {
        let (map, file) = map_file_to_memory(file_name)?;

        if map.len() < CHUNK_HEADER_LEN {
            return Err(AvbError::ShortChunk {
                have: map.len(),
                need: CHUNK_HEADER_LEN,
            });
        }

        let declared = declared_len(&map) as usize;
        if map.len() < CHUNK_HEADER_LEN + declared {
            return Err(AvbError::ShortChunk {
                have: map.len(),
                need: CHUNK_HEADER_LEN + declared,
            });
        }

        Ok(MappedChunk { map, _file: file })
    }

    /// The class identifier from the framing.
    pub fn class_id(&self) -> ClassId {
        let mut id = [0u8; 4];
        id.copy_from_slice(&self.map[0..4]);
        ClassId(id)
    }

    /// The object body, exactly as many bytes as the framing declares.
    pub fn body(&self) -> &[u8] {
        let declared = declared_len(&self.map) as usize;
        &self.map[CHUNK_HEADER_LEN..CHUNK_HEADER_LEN + declared]
    }

    /// Copy out of the map into an owned [`Chunk`].
    pub fn to_chunk(&self) -> Chunk {
        Chunk {
            class_id: self.class_id(),
            data: self.body().to_vec(),
        }
    }
}

/// Load a chunk file without keeping the mapping around.
pub fn read_chunk_file(file_name: &str) -> Result<Chunk, AvbError> {
    Ok(MappedChunk::open(file_name)?.to_chunk())
}

/// This function creates a memory map from a file.
pub(crate) fn map_file_to_memory(file_name: &str) -> Result<(Mmap, std::fs::File), AvbError> {
    let file = std::fs::File::open(file_name)?;
    let map = unsafe { MmapOptions::new().map(&file)? };
    Ok((map, file))
}

fn declared_len(map: &Mmap) -> u32 {
    let mut a = [0u8; 4];
    a.copy_from_slice(&map[4..8]);
    u32::from_le_bytes(a)
}
