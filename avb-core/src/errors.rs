use crate::ClassId;

/// Basic Error types.
#[derive(Debug)]
pub enum AvbError {
    /// IoError from the std library.
    StdIoError(std::io::Error),
    /// Ran out of body bytes while reading a primitive.
    EndOfStream { pos: usize, needed: usize },
    /// An expected tag or version byte did not match the schema.
    StructuralMismatch { expected: u8, found: u8 },
    /// Class identifier with no registered decoder.
    UnknownClass { class_id: ClassId },
    /// Track `flags` value outside the reference-count table.
    UnknownTrackFlag { class_id: ClassId, flags: u16 },
    /// Extension-block slot tag not claimed by the class being read.
    UnknownExtension { class_id: ClassId, tag: u8 },
    /// A declared count, bound or length did not hold.
    InvariantViolation { msg: String },
    /// Attribute entry whose type code does not select one of the four
    /// value encodings.
    AmbiguousAttributeValue { key: String },
    /// A chunk file is shorter than its framing declares.
    ShortChunk { have: usize, need: usize },
    /// An object reference points outside the pool.
    BadReference { index: u32, len: usize },
    /// A decoder finished with body bytes left over.
    TrailingBytes { class_id: ClassId, count: usize },
    /// Enum creation error.
    ParseEnum { f: String, code: i64 },
}

impl From<std::io::Error> for AvbError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl std::fmt::Display for AvbError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::AvbError::*;
        match self {
            StdIoError(x) => write!(fmt, "{}", x),
            EndOfStream { pos, needed } => write!(fmt, "Body ended at byte {} while reading {} more byte(s)", pos, needed),
            StructuralMismatch { expected, found } => write!(fmt, "Expected tag 0x{:02X} but found 0x{:02X}", expected, found),
            UnknownClass { class_id } => write!(fmt, "No decoder registered for class {}", class_id),
            UnknownTrackFlag { class_id, flags } => write!(fmt, "{}: unknown track flag {}", class_id, flags),
            UnknownExtension { class_id, tag } => write!(fmt, "{}: unknown ext tag 0x{:02X} {}", class_id, tag, tag),
            InvariantViolation { msg } => write!(fmt, "Invariant violated: {}", msg),
            AmbiguousAttributeValue { key } => write!(fmt, "{}: attribute value type is ambiguous", key),
            ShortChunk { have, need } => write!(fmt, "Chunk file is {}-bytes, needs to be at least {}-bytes", have, need),
            BadReference { index, len } => write!(fmt, "Object reference {} is outside the pool of {} object(s)", index, len),
            TrailingBytes { class_id, count } => write!(fmt, "{}: {} body byte(s) left over after decode", class_id, count),
            ParseEnum { f, code } => write!(fmt, "Could not parse source ({}) to {}.", code, f),
        }
    }
}

impl From<AvbError> for String {
    fn from(e: AvbError) -> String {
        e.to_string()
    }
}

impl std::error::Error for AvbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::AvbError::*;
        match self {
            StdIoError(x) => x.source(),
            _ => None,
        }
    }
}
