//! Decoders for the attribute dictionary and the reference-list classes.
use avb_core::errors::*;
use avb_core::{AttrType, AttrValue, Attributes, AvbObject, ParameterList, TimeCrumbList, Root};

use crate::read_scalars::{read_object_ref, BodyReader};

pub fn read_attributes(r: &mut BodyReader<'_>, root: &Root) -> Result<AvbObject, AvbError> {
    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let count = r.read_u32le()?;
    let mut attrs = Attributes::new();

    for _ in 0..count {
        let attr_type = r.read_u32le()?;
        let attr_name = r.read_string()?.to_string_lossy().into_owned();

        let value = match AttrType::new(attr_type) {
            Some(AttrType::Int) => AttrValue::Int(r.read_s32le()?),
            Some(AttrType::Str) => AttrValue::Str(r.read_string()?),
            Some(AttrType::Obj) => AttrValue::Obj(read_object_ref(root, r)?),
            Some(AttrType::Bob) => {
                let size = r.read_u32le()? as usize;
                AttrValue::Bytes(r.read_bytes(size)?)
            }
            None => return Err(AvbError::AmbiguousAttributeValue { key: attr_name }),
        };
        attrs.insert(&attr_name, value);
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::Attributes(attrs))
}

pub fn read_parameter_list(
    r: &mut BodyReader<'_>,
    root: &Root,
) -> Result<AvbObject, AvbError> {
    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let count = r.read_s32le()?;
    let mut refs = Vec::new();
    for _ in 0..count.max(0) {
        refs.push(read_object_ref(root, r)?);
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::ParameterList(ParameterList { refs }))
}

pub fn read_time_crumb_list(
    r: &mut BodyReader<'_>,
    root: &Root,
) -> Result<AvbObject, AvbError> {
    r.read_assert_tag(0x02)?;
    r.read_assert_tag(0x01)?;

    let count = r.read_s16le()?;
    let mut refs = Vec::new();
    for _ in 0..count.max(0) {
        refs.push(read_object_ref(root, r)?);
    }

    r.read_assert_tag(0x03)?;
    Ok(AvbObject::TimeCrumbList(TimeCrumbList { refs }))
}
