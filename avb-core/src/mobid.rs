//! The SMPTE unique material identifier carried by source clips,
//! compositions and audio-suite effects.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A SMPTE UMID as stored on disk: a 12-byte label, a length byte, three
/// instance bytes and the four GUID-style data words.
///
/// The all-zero value doubles as the "no material" marker that the legacy
/// two-word Avid ids collapse to.
/// ```
/// use avb_core::MobId;
///
/// assert!(MobId::default().is_zero());
///
/// let mut id = MobId::default();
/// id.data1 = 42;
/// assert!(!id.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MobId {
    pub smpte_label: [u8; 12],
    pub length: u8,
    pub instance_high: u8,
    pub instance_mid: u8,
    pub instance_low: u8,
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl MobId {
    /// Whether every stored byte is zero. A zeroed id means "no material",
    /// which is distinct from a reference that is simply absent.
    pub fn is_zero(&self) -> bool {
        *self == MobId::default()
    }
}

impl std::fmt::Display for MobId {
    /// Renders the id in the SMPTE URN form used by other material-exchange
    /// tooling.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "urn:smpte:umid:")?;
        for (i, b) in self.smpte_label.iter().enumerate() {
            if i > 0 && i % 4 == 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", b)?;
        }
        write!(
            f,
            ".{:02x}{:02x}{:02x}{:02x}",
            self.length, self.instance_high, self.instance_mid, self.instance_low
        )?;
        write!(f, ".{:08x}.{:04x}{:04x}.", self.data1, self.data2, self.data3)?;
        for (i, b) in self.data4.iter().enumerate() {
            if i > 0 && i % 4 == 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
