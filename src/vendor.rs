use std::{borrow::Cow, collections::BTreeMap};

/// Label for vendor ids missing from the table
pub const UNKNOWN_VENDOR: &str = "Unknown";

const BUILTIN: &[(u32, &str)] = &[
    (0x000039, "Toshiba"),
    (0x0000f0, "Samsung"),
    (0x0005cd, "Denon"),
    (0x000678, "Marantz"),
    (0x000982, "Loewe"),
    (0x0009b0, "Onkyo"),
    (0x000cb8, "Medion"),
    (0x000ce7, "Toshiba"),
    (0x001582, "Pulse Eight"),
    (0x001950, "Harman Kardon"),
    (0x001a11, "Google"),
    (0x0020c7, "Akai"),
    (0x002467, "AOC"),
    (0x008045, "Panasonic"),
    (0x00903e, "Philips"),
    (0x009053, "Daewoo"),
    (0x00a0de, "Yamaha"),
    (0x00d0d5, "Grundig"),
    (0x00e036, "Pioneer"),
    (0x00e091, "LG"),
    (0x08001f, "Sharp"),
    (0x080046, "Sony"),
    (0x18c086, "Broadcom"),
    (0x534850, "Sharp"),
    (0x6b746d, "Vizio"),
    (0x8065e9, "Benq"),
    (0x9c645e, "Harman Kardon"),
];

/**
 * Maps 24-bit vendor ids (IEEE OUI) to display names.
 *
 * Built once and only read afterwards. [VendorTable::default] holds the well known CEC vendors.
 * ```
 * # use hdmi_cec::VendorTable;
 * let vendors = VendorTable::default();
 * assert_eq!(vendors.name(0x008045), "Panasonic");
 * assert_eq!(vendors.name(0x123456), hdmi_cec::UNKNOWN_VENDOR);
 * ```
 */
#[derive(Debug, Clone)]
pub struct VendorTable(BTreeMap<u32, Cow<'static, str>>);

impl VendorTable {
    /// a table without any entries
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }
    /// add or replace an entry
    pub fn with(mut self, id: u32, name: impl Into<Cow<'static, str>>) -> Self {
        self.0.insert(id & 0x00ff_ffff, name.into());
        self
    }
    pub fn get(&self, id: u32) -> Option<&str> {
        self.0.get(&id).map(AsRef::as_ref)
    }
    /// name of the vendor or [UNKNOWN_VENDOR]
    pub fn name(&self, id: u32) -> &str {
        self.get(id).unwrap_or(UNKNOWN_VENDOR)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for VendorTable {
    fn default() -> Self {
        Self(
            BUILTIN
                .iter()
                .map(|(id, name)| (*id, Cow::Borrowed(*name)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let vendors = VendorTable::default();
        assert_eq!(vendors.len(), BUILTIN.len());
        assert_eq!(vendors.name(0x0000f0), "Samsung");
        assert_eq!(vendors.name(0x00e091), "LG");
        assert_eq!(vendors.get(0), None);
        assert_eq!(vendors.name(0), UNKNOWN_VENDOR);
    }

    #[test]
    fn custom_entries() {
        let vendors = VendorTable::empty()
            .with(0xabcdef, "Acme")
            .with(0x01_000001, "masked");
        assert_eq!(vendors.name(0xabcdef), "Acme");
        assert_eq!(vendors.name(0x000001), "masked");
        assert!(VendorTable::empty().is_empty());
    }
}
