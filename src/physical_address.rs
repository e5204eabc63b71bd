use crate::error::FormatError;
use std::{fmt, str::FromStr};

/**
 * Position of a device in the HDMI tree.
 *
 * The address is a 16-bit number where each group of 4 bits represent a digit of the
 * physical address a.b.c.d where the most significant 4 bits represent ‘a’.
 * The root device (usually the TV) has address 0.0.0.0, devices on its inputs have a.0.0.0
 * and so on. If nothing is connected the address is `0xffff`, see [PhysicalAddress::UNREGISTERED].
 *
 * All constructors end up with the same four segments, so equality and formatting do not
 * depend on how an address was created:
 * ```
 * # use hdmi_cec::PhysicalAddress;
 * let a = PhysicalAddress::from(0x12cd);
 * assert_eq!(a, "12:cd".parse().unwrap());
 * assert_eq!(a, PhysicalAddress::from_bytes(&[0x12, 0xcd]).unwrap());
 * assert_eq!(a, PhysicalAddress::from_nibbles(&[1, 2, 12, 13]).unwrap());
 * assert_eq!(a.to_string(), "12:cd");
 * ```
 */
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct PhysicalAddress([u8; 4]);

impl PhysicalAddress {
    /// 0.0.0.0
    pub const ROOT: PhysicalAddress = PhysicalAddress([0; 4]);
    /// f.f.f.f, used when the address is not (yet) known
    pub const UNREGISTERED: PhysicalAddress = PhysicalAddress([0xf; 4]);

    /// Build from exactly two bytes, high byte first
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        match bytes {
            [hi, lo] => Ok(Self::from(u16::from_be_bytes([*hi, *lo]))),
            _ => Err(FormatError::InvalidLength {
                expected: 2,
                actual: bytes.len(),
            }),
        }
    }
    /// Build from exactly four segments in `0..=15`
    pub fn from_nibbles(nibbles: &[u8]) -> Result<Self, FormatError> {
        let segments: [u8; 4] = nibbles
            .try_into()
            .map_err(|_| FormatError::InvalidLength {
                expected: 4,
                actual: nibbles.len(),
            })?;
        if let Some(n) = segments.iter().find(|n| **n > 0xf) {
            return Err(FormatError::NibbleOutOfRange(*n));
        }
        Ok(Self(segments))
    }
    /// the four segments a, b, c, d
    #[inline]
    pub fn segments(&self) -> [u8; 4] {
        self.0
    }
    /// wire value, e.g. `0x3300` for 3.3.0.0
    #[inline]
    pub fn to_u16(&self) -> u16 {
        let [a, b, c, d] = self.0.map(u16::from);
        a << 12 | b << 8 | c << 4 | d
    }
    /// the two bytes as they appear in a CEC operand
    #[inline]
    pub fn to_bytes(&self) -> [u8; 2] {
        self.to_u16().to_be_bytes()
    }
    #[inline]
    pub fn is_unregistered(&self) -> bool {
        *self == Self::UNREGISTERED
    }
    /// number of leading non-zero segments. 0 for the root.
    pub fn depth(&self) -> usize {
        self.0.iter().take_while(|s| **s != 0).count()
    }
    /// true if `other` sits somewhere below `self` in the HDMI tree
    pub fn is_ancestor_of(&self, other: &PhysicalAddress) -> bool {
        let depth = self.depth();
        depth < other.depth() && self.0[..depth] == other.0[..depth]
    }
}

impl Default for PhysicalAddress {
    fn default() -> Self {
        Self::UNREGISTERED
    }
}

impl From<u16> for PhysicalAddress {
    fn from(value: u16) -> Self {
        Self([
            (value >> 12) as u8 & 0xf,
            (value >> 8) as u8 & 0xf,
            (value >> 4) as u8 & 0xf,
            value as u8 & 0xf,
        ])
    }
}

impl From<PhysicalAddress> for u16 {
    fn from(value: PhysicalAddress) -> Self {
        value.to_u16()
    }
}

/// 2 elements are read as bytes, 4 as nibbles
impl TryFrom<&[u8]> for PhysicalAddress {
    type Error = FormatError;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.len() {
            2 => Self::from_bytes(value),
            4 => Self::from_nibbles(value),
            actual => Err(FormatError::InvalidLength {
                expected: 2,
                actual,
            }),
        }
    }
}

impl FromStr for PhysicalAddress {
    type Err = FormatError;
    /// `"12:cd"`: exactly two colon separated 2-digit hex bytes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FormatError::InvalidString(s.to_string());
        let mut bytes = [0u8; 2];
        let mut tokens = s.split(':');
        for byte in bytes.iter_mut() {
            let token = tokens.next().ok_or_else(invalid)?;
            if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(token, 16).map_err(|_| invalid())?;
        }
        if tokens.next().is_some() {
            return Err(invalid());
        }
        Self::from_bytes(&bytes)
    }
}

impl TryFrom<String> for PhysicalAddress {
    type Error = FormatError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PhysicalAddress> for String {
    fn from(value: PhysicalAddress) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [hi, lo] = self.to_bytes();
        write!(f, "{hi:02x}:{lo:02x}")
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a:x}.{b:x}.{c:x}.{d:x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn all_representations_agree() {
        let from_int = PhysicalAddress::from(0x12cd);
        let from_str: PhysicalAddress = "12:cd".parse().unwrap();
        let from_bytes = PhysicalAddress::try_from(&[0x12u8, 0xcd][..]).unwrap();
        let from_nibbles = PhysicalAddress::try_from(&[1u8, 2, 12, 13][..]).unwrap();

        assert_eq!(from_int, from_str);
        assert_eq!(from_int, from_bytes);
        assert_eq!(from_int, from_nibbles);
        assert_eq!(from_nibbles.to_string(), "12:cd");
        assert_eq!(from_nibbles.segments(), [1, 2, 12, 13]);
    }

    #[test]
    fn default_is_unregistered() {
        let pa = PhysicalAddress::default();
        assert!(pa.is_unregistered());
        assert_eq!(pa.to_u16(), 0xffff);
        assert_eq!(pa.to_string(), "ff:ff");
    }

    #[test]
    fn rejects_bad_strings() {
        for s in ["", "12", "12:c", "12:cd:00", "1:2cd", "12cd", "g2:cd", "12:+d", " 12:cd"] {
            assert_eq!(
                s.parse::<PhysicalAddress>(),
                Err(FormatError::InvalidString(s.to_string())),
                "{s:?}"
            );
        }
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        assert_eq!("AB:CD".parse::<PhysicalAddress>().unwrap().to_string(), "ab:cd");
    }

    #[test]
    fn rejects_bad_sequences() {
        assert_eq!(
            PhysicalAddress::from_bytes(&[1, 2, 3]),
            Err(FormatError::InvalidLength {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            PhysicalAddress::from_nibbles(&[1, 2, 3]),
            Err(FormatError::InvalidLength {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            PhysicalAddress::from_nibbles(&[1, 2, 16, 0]),
            Err(FormatError::NibbleOutOfRange(16))
        );
        assert!(PhysicalAddress::try_from(&[0u8; 0][..]).is_err());
    }

    #[test]
    fn topology() {
        let root = PhysicalAddress::ROOT;
        let hdmi1 = PhysicalAddress::from(0x1000);
        let switch_port = PhysicalAddress::from(0x1200);
        let hdmi2 = PhysicalAddress::from(0x2000);

        assert!(root.is_ancestor_of(&hdmi1));
        assert!(hdmi1.is_ancestor_of(&switch_port));
        assert!(!hdmi2.is_ancestor_of(&switch_port));
        assert!(!hdmi1.is_ancestor_of(&hdmi1));
        assert!(!switch_port.is_ancestor_of(&hdmi1));
        assert_eq!(format!("{switch_port:?}"), "1.2.0.0");
    }

    proptest! {
        #[test]
        fn string_round_trip(value: u16) {
            let text = PhysicalAddress::from(value).to_string();
            let parsed: PhysicalAddress = text.parse().unwrap();
            prop_assert_eq!(parsed.to_string(), text);
            prop_assert_eq!(parsed.to_u16(), value);
        }
    }
}
