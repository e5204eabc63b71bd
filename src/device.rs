use crate::command::{CecCommand, LogicalAddress, Opcode};
use crate::physical_address::PhysicalAddress;
use crate::vendor::VendorTable;
use num_enum::{IntoPrimitive, TryFromPrimitive};

// ---  Power Status Operand (pwr_state)  ---
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum PowerStatus {
    On = 0,
    Standby = 1,
    InTransitionStandbyToOn = 2,
    InTransitionOnToStandby = 3,
}

/// Primary Device Type Operand, third byte of [Opcode::ReportPhysicalAddr]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum DeviceType {
    Tv = 0,
    Recording = 1,
    Tuner = 3,
    Playback = 4,
    AudioSystem = 5,
    Switch = 6,
    Processor = 7,
}

/// Big endian integer from any number of bytes: `acc * 256 + byte`, left to right.
///
/// `None` if the value does not fit into a `u64`.
/// ```
/// # use hdmi_cec::bytes_to_uint;
/// assert_eq!(bytes_to_uint(&[0x00, 0x80, 0x45]), Some(0x008045));
/// assert_eq!(bytes_to_uint(&[]), Some(0));
/// assert_eq!(bytes_to_uint(&[1, 0, 0, 0, 0, 0, 0, 0, 0]), None);
/// ```
pub fn bytes_to_uint(bytes: &[u8]) -> Option<u64> {
    bytes.iter().try_fold(0u64, |acc, b| {
        acc.checked_mul(256)?.checked_add(u64::from(*b))
    })
}

/// Latin-1: one char per byte
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// vendor ids are IEEE OUIs
const MAX_VENDOR_ID: u64 = 0xff_ffff;

/// Decodes operands into attributes. Returns false if the operands had the wrong shape.
type Decoder = fn(&mut HdmiDevice, &[u8]) -> bool;

const DECODERS: &[(Opcode, Decoder)] = &[
    (Opcode::ReportPhysicalAddr, |dev, ops| {
        let (address, device_type) = match ops {
            [hi, lo] => ([*hi, *lo], None),
            [hi, lo, t] => ([*hi, *lo], Some(*t)),
            _ => return false,
        };
        dev.physical_address = PhysicalAddress::from(u16::from_be_bytes(address));
        if device_type.is_some() {
            dev.device_type = device_type;
        }
        true
    }),
    (Opcode::ReportPowerStatus, |dev, ops| {
        first(ops, &mut dev.power_status)
    }),
    (Opcode::DeviceVendorId, |dev, ops| {
        if ops.is_empty() {
            return false;
        }
        match bytes_to_uint(ops).filter(|id| *id <= MAX_VENDOR_ID) {
            Some(id) => {
                dev.vendor_id = id as u32;
                true
            }
            None => false,
        }
    }),
    (Opcode::SetOsdName, |dev, ops| {
        dev.osd_name = latin1(ops);
        true
    }),
    (Opcode::SetMenuLanguage, |dev, ops| {
        if ops.is_empty() {
            return false;
        }
        dev.menu_language = latin1(ops);
        true
    }),
    (Opcode::ReportAudioStatus, |dev, ops| {
        first(ops, &mut dev.audio_status)
    }),
    (Opcode::SystemAudioModeStatus, |dev, ops| {
        first(ops, &mut dev.audio_mode_status)
    }),
    (Opcode::DeckStatus, |dev, ops| first(ops, &mut dev.deck_status)),
    (Opcode::TunerDeviceStatus, |dev, ops| {
        first(ops, &mut dev.tuner_status)
    }),
    (Opcode::MenuStatus, |dev, ops| first(ops, &mut dev.menu_status)),
    (Opcode::RecordStatus, |dev, ops| {
        first(ops, &mut dev.record_status)
    }),
    (Opcode::TimerStatus, |dev, ops| first(ops, &mut dev.timer_status)),
    (Opcode::TimerClearedStatus, |dev, ops| {
        first(ops, &mut dev.timer_cleared_status)
    }),
    (Opcode::ActiveSource, |dev, _| {
        dev.is_active_source = true;
        true
    }),
    (Opcode::InactiveSource, |dev, _| {
        dev.is_active_source = false;
        true
    }),
];

fn first(ops: &[u8], field: &mut u8) -> bool {
    match ops.first() {
        Some(b) => {
            *field = *b;
            true
        }
        None => false,
    }
}

/**
 * Last known state of one device on the bus.
 *
 * Fields start out as unknown (zero, empty, [PhysicalAddress::UNREGISTERED]) and are
 * overwritten by every matching frame passed to [HdmiDevice::update].
 * ```
 * # use hdmi_cec::{CecCommand, HdmiDevice, LogicalAddress, Opcode};
 * let mut tv = HdmiDevice::new(LogicalAddress::Tv);
 * tv.update(&CecCommand::new(LogicalAddress::Tv, LogicalAddress::Playback1, Opcode::SetOsdName, *b"TV"));
 * assert_eq!(tv.osd_name(), "TV");
 * ```
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdmiDevice {
    logical_address: LogicalAddress,
    physical_address: PhysicalAddress,
    device_type: Option<u8>,
    power_status: u8,
    vendor_id: u32,
    osd_name: String,
    menu_language: String,
    is_active_source: bool,
    audio_status: u8,
    audio_mode_status: u8,
    deck_status: u8,
    tuner_status: u8,
    menu_status: u8,
    record_status: u8,
    timer_cleared_status: u8,
    timer_status: u8,
}

impl HdmiDevice {
    pub fn new(logical_address: LogicalAddress) -> Self {
        Self {
            logical_address,
            physical_address: PhysicalAddress::UNREGISTERED,
            device_type: None,
            power_status: 0,
            vendor_id: 0,
            osd_name: String::new(),
            menu_language: String::new(),
            is_active_source: false,
            audio_status: 0,
            audio_mode_status: 0,
            deck_status: 0,
            tuner_status: 0,
            menu_status: 0,
            record_status: 0,
            timer_cleared_status: 0,
            timer_status: 0,
        }
    }
    /// Apply a received frame.
    ///
    /// Unknown opcodes and known ones with unusable operands leave the device untouched.
    /// Returns true if an attribute was written.
    pub fn update(&mut self, command: &CecCommand) -> bool {
        let Some(Ok(opcode)) = command.opcode() else {
            return false;
        };
        let Some((_, decode)) = DECODERS.iter().find(|(op, _)| *op == opcode) else {
            return false;
        };
        let applied = decode(self, command.operands());
        if !applied {
            tracing::debug!(
                address = %self.logical_address,
                opcode = opcode.name(),
                frame = %command,
                "dropping malformed operands"
            );
        }
        applied
    }
    #[inline]
    pub fn logical_address(&self) -> LogicalAddress {
        self.logical_address
    }
    #[inline]
    pub fn physical_address(&self) -> PhysicalAddress {
        self.physical_address
    }
    /// raw primary device type, if a 3 byte physical address report was seen
    #[inline]
    pub fn device_type_raw(&self) -> Option<u8> {
        self.device_type
    }
    pub fn device_type(&self) -> Option<DeviceType> {
        self.device_type.and_then(|t| DeviceType::try_from(t).ok())
    }
    #[inline]
    pub fn power_status(&self) -> u8 {
        self.power_status
    }
    pub fn power(&self) -> Option<PowerStatus> {
        PowerStatus::try_from(self.power_status).ok()
    }
    #[inline]
    pub fn is_on(&self) -> bool {
        self.power_status == PowerStatus::On as u8
    }
    #[inline]
    pub fn is_off(&self) -> bool {
        self.power_status == PowerStatus::Standby as u8
    }
    #[inline]
    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }
    /// vendor name from `vendors`, or [UNKNOWN_VENDOR](crate::UNKNOWN_VENDOR)
    pub fn vendor<'t>(&self, vendors: &'t VendorTable) -> &'t str {
        vendors.name(self.vendor_id)
    }
    #[inline]
    pub fn osd_name(&self) -> &str {
        &self.osd_name
    }
    #[inline]
    pub fn menu_language(&self) -> &str {
        &self.menu_language
    }
    #[inline]
    pub fn is_active_source(&self) -> bool {
        self.is_active_source
    }
    pub(crate) fn set_active_source(&mut self, active: bool) {
        self.is_active_source = active;
    }
    #[inline]
    pub fn audio_status(&self) -> u8 {
        self.audio_status
    }
    pub fn is_muted(&self) -> bool {
        self.audio_status & 0x80 == 0x80
    }
    /// volume in percent, None if unknown
    pub fn audio_volume(&self) -> Option<u8> {
        let v = self.audio_status & 0x7f;
        //0x65 ..= 0x7E Reserved
        if v > 100 {
            return None;
        }
        Some(v)
    }
    #[inline]
    pub fn audio_mode_status(&self) -> u8 {
        self.audio_mode_status
    }
    #[inline]
    pub fn deck_status(&self) -> u8 {
        self.deck_status
    }
    #[inline]
    pub fn tuner_status(&self) -> u8 {
        self.tuner_status
    }
    #[inline]
    pub fn menu_status(&self) -> u8 {
        self.menu_status
    }
    #[inline]
    pub fn record_status(&self) -> u8 {
        self.record_status
    }
    #[inline]
    pub fn timer_cleared_status(&self) -> u8 {
        self.timer_cleared_status
    }
    #[inline]
    pub fn timer_status(&self) -> u8 {
        self.timer_status
    }
}
