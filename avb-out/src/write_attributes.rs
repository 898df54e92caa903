//! Encoders for the attribute dictionary and the reference-list classes.
use avb_core::errors::*;
use avb_core::{AttrType, AttrValue, Attributes, AvbString, ParameterList, TimeCrumbList};
use num::ToPrimitive;

use crate::write_scalars::BodyWriter;

pub fn write_attributes(w: &mut BodyWriter, attrs: &Attributes) -> Result<(), AvbError> {
    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_u32le(attrs.len() as u32);
    for (key, value) in attrs.iter() {
        let attr_type = match value {
            AttrValue::Int(_) => AttrType::Int,
            AttrValue::Str(_) => AttrType::Str,
            AttrValue::Obj(_) => AttrType::Obj,
            AttrValue::Bytes(_) => AttrType::Bob,
        };

        w.write_u32le(attr_type.to_u32().unwrap());
        w.write_string(&AvbString::from(key))?;

        match value {
            AttrValue::Int(v) => w.write_s32le(*v),
            AttrValue::Str(v) => w.write_string(v)?,
            AttrValue::Obj(v) => w.write_object_ref(*v),
            AttrValue::Bytes(v) => {
                w.write_u32le(v.len() as u32);
                w.write_bytes(v);
            }
        }
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_parameter_list(
    w: &mut BodyWriter,
    list: &ParameterList,
) -> Result<(), AvbError> {
    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_s32le(list.refs.len() as i32);
    for r in list.refs.iter() {
        w.write_object_ref(*r);
    }

    w.write_u8(0x03);
    Ok(())
}

pub fn write_time_crumb_list(
    w: &mut BodyWriter,
    list: &TimeCrumbList,
) -> Result<(), AvbError> {
    if list.refs.len() > i16::MAX as usize {
        return Err(AvbError::InvariantViolation {
            msg: format!("TMCS: {} refs do not fit a s16 count", list.refs.len()),
        });
    }

    w.write_u8(0x02);
    w.write_u8(0x01);

    w.write_s16le(list.refs.len() as i16);
    for r in list.refs.iter() {
        w.write_object_ref(*r);
    }

    w.write_u8(0x03);
    Ok(())
}
