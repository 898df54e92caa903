//! This submodule deals with reading the framed primitives that every
//! object body is built from.
//!
//! Bodies are parsed from an in-memory byte slice with a moving cursor; no
//! buffering happens beyond the primitive currently being read. All
//! multi-byte integers and floats are little-endian.
use avb_core::errors::*;
use avb_core::{AvbString, Datetime, Exp10, MobId, ObjectRef, Root};

/// A cursor over one object body.
pub struct BodyReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        BodyReader { buf, pos: 0 }
    }

    /// The current byte offset into the body.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// How many body bytes are left unread.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AvbError> {
        if self.remaining() < n {
            return Err(AvbError::EndOfStream {
                pos: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, AvbError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_s8(&mut self) -> Result<i8, AvbError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, AvbError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn read_u16le(&mut self) -> Result<u16, AvbError> {
        let b = self.take(2)?;
        let mut a = [0u8; 2];
        a.copy_from_slice(b);
        Ok(u16::from_le_bytes(a))
    }

    pub fn read_s16le(&mut self) -> Result<i16, AvbError> {
        Ok(self.read_u16le()? as i16)
    }

    pub fn read_u32le(&mut self) -> Result<u32, AvbError> {
        let b = self.take(4)?;
        let mut a = [0u8; 4];
        a.copy_from_slice(b);
        Ok(u32::from_le_bytes(a))
    }

    pub fn read_s32le(&mut self) -> Result<i32, AvbError> {
        Ok(self.read_u32le()? as i32)
    }

    pub fn read_s64le(&mut self) -> Result<i64, AvbError> {
        let b = self.take(8)?;
        let mut a = [0u8; 8];
        a.copy_from_slice(b);
        Ok(i64::from_le_bytes(a))
    }

    pub fn read_f64le(&mut self) -> Result<f64, AvbError> {
        let b = self.take(8)?;
        let mut a = [0u8; 8];
        a.copy_from_slice(b);
        Ok(f64::from_le_bytes(a))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, AvbError> {
        Ok(self.take(n)?.to_vec())
    }

    /// A length-prefixed string: `u16` byte length, then raw bytes.
    pub fn read_string(&mut self) -> Result<AvbString, AvbError> {
        let len = self.read_u16le()? as usize;
        Ok(AvbString(self.take(len)?.to_vec()))
    }

    /// The base-ten encoded edit-rate float: mantissa then exponent.
    pub fn read_exp10(&mut self) -> Result<Exp10, AvbError> {
        let mantissa = self.read_s32le()?;
        let exponent = self.read_s32le()?;
        Ok(Exp10 { mantissa, exponent })
    }

    /// A raw epoch-seconds timestamp.
    pub fn read_datetime(&mut self) -> Result<Datetime, AvbError> {
        Ok(Datetime(self.read_u32le()?))
    }

    pub fn peek_u8(&self) -> Result<u8, AvbError> {
        if self.remaining() == 0 {
            return Err(AvbError::EndOfStream {
                pos: self.pos,
                needed: 1,
            });
        }
        Ok(self.buf[self.pos])
    }

    /// Read one byte and error unless it matches. This is the structural
    /// sanity check used throughout the format.
    pub fn read_assert_tag(&mut self, expected: u8) -> Result<(), AvbError> {
        let found = self.read_u8()?;
        if found != expected {
            return Err(AvbError::StructuralMismatch { expected, found });
        }
        Ok(())
    }

    /// Step the extension-block iterator.
    ///
    /// Extension blocks trail the main body as `0x01 <slot tag> <payload>`
    /// runs. Returns the slot tag of the next block, or `None` when the
    /// next byte is not a continuation marker (the class's close byte, or
    /// a subclass envelope opener). The non-marker byte is not consumed.
    pub fn next_extension(&mut self) -> Result<Option<u8>, AvbError> {
        if self.peek_u8()? != 0x01 {
            return Ok(None);
        }
        self.pos += 1;
        Ok(Some(self.read_u8()?))
    }
}

/// Read a `u32` pool index and hand back a reference carrying the class id
/// the root knows for it.
pub fn read_object_ref(root: &Root, r: &mut BodyReader<'_>) -> Result<ObjectRef, AvbError> {
    let index = r.read_u32le()?;
    if root.get_settings().get_check_refs() && index as usize >= root.len() {
        return Err(AvbError::BadReference {
            index,
            len: root.len(),
        });
    }
    Ok(root.make_ref(index))
}

/// Read an untagged SMPTE MobID in its on-disk layout.
pub fn read_mob_id(r: &mut BodyReader<'_>) -> Result<MobId, AvbError> {
    let mut mob_id = MobId::default();
    let label = r.take(12)?;
    mob_id.smpte_label.copy_from_slice(label);
    mob_id.length = r.read_u8()?;
    mob_id.instance_high = r.read_u8()?;
    mob_id.instance_mid = r.read_u8()?;
    mob_id.instance_low = r.read_u8()?;
    mob_id.data1 = r.read_u32le()?;
    mob_id.data2 = r.read_u16le()?;
    mob_id.data3 = r.read_u16le()?;
    let data4 = r.take(8)?;
    mob_id.data4.copy_from_slice(data4);
    Ok(mob_id)
}
