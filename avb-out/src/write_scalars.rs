//! This submodule accumulates the framed primitives of an object body into
//! an owned byte buffer, mirroring the readers in `avb-in` one for one.
use avb_core::errors::*;
use avb_core::{AvbString, Datetime, Exp10, MobId, ObjectRef};

/// A growing buffer for one object body.
#[derive(Debug, Default)]
pub struct BodyWriter {
    buf: Vec<u8>,
}

impl BodyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_s8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_u16le(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_s16le(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32le(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_s32le(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_s64le(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f64le(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// A length-prefixed string: `u16` byte length, then the raw bytes.
    pub fn write_string(&mut self, v: &AvbString) -> Result<(), AvbError> {
        if v.len() > u16::MAX as usize {
            return Err(AvbError::InvariantViolation {
                msg: format!("string of {} bytes does not fit a u16 length", v.len()),
            });
        }
        self.write_u16le(v.len() as u16);
        self.buf.extend_from_slice(v.as_bytes());
        Ok(())
    }

    pub fn write_exp10(&mut self, v: Exp10) {
        self.write_s32le(v.mantissa);
        self.write_s32le(v.exponent);
    }

    pub fn write_datetime(&mut self, v: Datetime) {
        self.write_u32le(v.0);
    }

    /// An object reference is its pool index; the null sentinel is index 0.
    pub fn write_object_ref(&mut self, v: ObjectRef) {
        self.write_u32le(v.index());
    }

    /// An untagged SMPTE MobID in its on-disk layout.
    pub fn write_mob_id(&mut self, v: &MobId) {
        self.write_bytes(&v.smpte_label);
        self.write_u8(v.length);
        self.write_u8(v.instance_high);
        self.write_u8(v.instance_mid);
        self.write_u8(v.instance_low);
        self.write_u32le(v.data1);
        self.write_u16le(v.data2);
        self.write_u16le(v.data3);
        self.write_bytes(&v.data4);
    }
}
