use crate::error::MalformedFrameError;
use num_enum::{IntoPrimitive, TryFromPrimitive, TryFromPrimitiveError};
use std::{fmt, str::FromStr};

/**
 * The logical addresses defined by CEC.
 *
 * Every nibble value has a variant, so a frame header can always be split into two addresses.
 */
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LogicalAddress {
    Tv = 0,
    Record1 = 1,
    Record2 = 2,
    Tuner1 = 3,
    Playback1 = 4,
    Audiosystem = 5,
    Tuner2 = 6,
    Tuner3 = 7,
    Playback2 = 8,
    Record3 = 9,
    Tuner4 = 10,
    Playback3 = 11,
    Backup1 = 12,
    Backup2 = 13,
    Specific = 14,
    /// as initiator: unregistered. as destination: broadcast
    UnregisteredBroadcast = 15,
}

impl LogicalAddress {
    /// Addresses a device can hold, i.e. everything except broadcast
    pub const DEVICES: [LogicalAddress; 15] = [
        Self::Tv,
        Self::Record1,
        Self::Record2,
        Self::Tuner1,
        Self::Playback1,
        Self::Audiosystem,
        Self::Tuner2,
        Self::Tuner3,
        Self::Playback2,
        Self::Record3,
        Self::Tuner4,
        Self::Playback3,
        Self::Backup1,
        Self::Backup2,
        Self::Specific,
    ];
    /// use the low 4 bits of `n`
    #[inline]
    pub fn from_nibble(n: u8) -> Self {
        // all values have a variant
        Self::try_from(n & 0xf).unwrap_or(Self::UnregisteredBroadcast)
    }
    #[inline]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::UnregisteredBroadcast
    }
}

impl fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", u8::from(*self))
    }
}

/// Opcodes this crate knows by name.
///
/// A [CecCommand] keeps the raw byte, so frames with opcodes missing here still parse.
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum Opcode {
    FeatureAbort = 0x00,
    ImageViewOn = 0x04,
    TunerStepIncrement = 0x05,
    TunerStepDecrement = 0x06,
    /// __Parameters:__ tuner device info, first byte is the recording flag / display info
    TunerDeviceStatus = 0x07,
    GiveTunerDeviceStatus = 0x08,
    RecordOn = 0x09,
    /// __Parameters:__ 1 byte record status info
    RecordStatus = 0x0a,
    RecordOff = 0x0b,
    TextViewOn = 0x0d,
    RecordTvScreen = 0x0f,
    GiveDeckStatus = 0x1a,
    /// __Parameters:__ 1 byte deck info
    DeckStatus = 0x1b,
    /// __Parameters:__ 3 byte ISO 639-2 language code
    SetMenuLanguage = 0x32,
    ClearAnalogueTimer = 0x33,
    SetAnalogueTimer = 0x34,
    /// __Parameters:__ timer status data
    TimerStatus = 0x35,
    Standby = 0x36,
    Play = 0x41,
    DeckControl = 0x42,
    /// __Parameters:__ 1 byte timer cleared status
    TimerClearedStatus = 0x43,
    UserControlPressed = 0x44,
    UserControlReleased = 0x45,
    GiveOsdName = 0x46,
    /// __Parameters:__ up to 14 ASCII characters, not terminated
    SetOsdName = 0x47,
    SetOsdString = 0x64,
    SystemAudioModeRequest = 0x70,
    GiveAudioStatus = 0x71,
    SetSystemAudioMode = 0x72,
    /// __Parameters:__ 1 byte, `&0x80` is mute, `&0x7f` the volume
    ReportAudioStatus = 0x7a,
    GiveSystemAudioModeStatus = 0x7d,
    /// __Parameters:__ 1 byte On(1)/Off(0)
    SystemAudioModeStatus = 0x7e,
    RoutingChange = 0x80,
    RoutingInformation = 0x81,
    /// __Parameters:__ 2 byte physical address of the active source
    ActiveSource = 0x82,
    GivePhysicalAddr = 0x83,
    /// __Parameters:__ 2 byte physical address, 1 byte primary device type
    ReportPhysicalAddr = 0x84,
    RequestActiveSource = 0x85,
    SetStreamPath = 0x86,
    /// __Parameters:__ 3 byte IEEE OUI
    DeviceVendorId = 0x87,
    VendorCommand = 0x89,
    VendorRemoteButtonDown = 0x8a,
    VendorRemoteButtonUp = 0x8b,
    GiveDeviceVendorId = 0x8c,
    MenuRequest = 0x8d,
    /// __Parameters:__ 1 byte Activated(0)/Deactivated(1)
    MenuStatus = 0x8e,
    GiveDevicePowerStatus = 0x8f,
    /// __Parameters:__ 1 byte, see [PowerStatus](crate::PowerStatus)
    ReportPowerStatus = 0x90,
    GetMenuLanguage = 0x91,
    SelectAnalogueService = 0x92,
    SelectDigitalService = 0x93,
    SetDigitalTimer = 0x97,
    ClearDigitalTimer = 0x99,
    SetAudioRate = 0x9a,
    InactiveSource = 0x9d,
    CecVersion = 0x9e,
    GetCecVersion = 0x9f,
    VendorCommandWithId = 0xa0,
    ClearExtTimer = 0xa1,
    SetExtTimer = 0xa2,
    InitiateArc = 0xc0,
    ReportArcInitiated = 0xc1,
    ReportArcTerminated = 0xc2,
    RequestArcInitiation = 0xc3,
    RequestArcTermination = 0xc4,
    TerminateArc = 0xc5,
    CdcMessage = 0xf8,
    Abort = 0xff,
}

impl Opcode {
    /// Name used in diagnostics, e.g. `REPORT_POWER_STATUS`
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::FeatureAbort => "FEATURE_ABORT",
            Opcode::ImageViewOn => "IMAGE_VIEW_ON",
            Opcode::TunerStepIncrement => "TUNER_STEP_INCREMENT",
            Opcode::TunerStepDecrement => "TUNER_STEP_DECREMENT",
            Opcode::TunerDeviceStatus => "TUNER_DEVICE_STATUS",
            Opcode::GiveTunerDeviceStatus => "GIVE_TUNER_DEVICE_STATUS",
            Opcode::RecordOn => "RECORD_ON",
            Opcode::RecordStatus => "RECORD_STATUS",
            Opcode::RecordOff => "RECORD_OFF",
            Opcode::TextViewOn => "TEXT_VIEW_ON",
            Opcode::RecordTvScreen => "RECORD_TV_SCREEN",
            Opcode::GiveDeckStatus => "GIVE_DECK_STATUS",
            Opcode::DeckStatus => "DECK_STATUS",
            Opcode::SetMenuLanguage => "SET_MENU_LANGUAGE",
            Opcode::ClearAnalogueTimer => "CLEAR_ANALOGUE_TIMER",
            Opcode::SetAnalogueTimer => "SET_ANALOGUE_TIMER",
            Opcode::TimerStatus => "TIMER_STATUS",
            Opcode::Standby => "STANDBY",
            Opcode::Play => "PLAY",
            Opcode::DeckControl => "DECK_CONTROL",
            Opcode::TimerClearedStatus => "TIMER_CLEARED_STATUS",
            Opcode::UserControlPressed => "USER_CONTROL_PRESSED",
            Opcode::UserControlReleased => "USER_CONTROL_RELEASED",
            Opcode::GiveOsdName => "GIVE_OSD_NAME",
            Opcode::SetOsdName => "SET_OSD_NAME",
            Opcode::SetOsdString => "SET_OSD_STRING",
            Opcode::SystemAudioModeRequest => "SYSTEM_AUDIO_MODE_REQUEST",
            Opcode::GiveAudioStatus => "GIVE_AUDIO_STATUS",
            Opcode::SetSystemAudioMode => "SET_SYSTEM_AUDIO_MODE",
            Opcode::ReportAudioStatus => "REPORT_AUDIO_STATUS",
            Opcode::GiveSystemAudioModeStatus => "GIVE_SYSTEM_AUDIO_MODE_STATUS",
            Opcode::SystemAudioModeStatus => "SYSTEM_AUDIO_MODE_STATUS",
            Opcode::RoutingChange => "ROUTING_CHANGE",
            Opcode::RoutingInformation => "ROUTING_INFORMATION",
            Opcode::ActiveSource => "ACTIVE_SOURCE",
            Opcode::GivePhysicalAddr => "GIVE_PHYSICAL_ADDRESS",
            Opcode::ReportPhysicalAddr => "REPORT_PHYSICAL_ADDRESS",
            Opcode::RequestActiveSource => "REQUEST_ACTIVE_SOURCE",
            Opcode::SetStreamPath => "SET_STREAM_PATH",
            Opcode::DeviceVendorId => "DEVICE_VENDOR_ID",
            Opcode::VendorCommand => "VENDOR_COMMAND",
            Opcode::VendorRemoteButtonDown => "VENDOR_REMOTE_BUTTON_DOWN",
            Opcode::VendorRemoteButtonUp => "VENDOR_REMOTE_BUTTON_UP",
            Opcode::GiveDeviceVendorId => "GIVE_DEVICE_VENDOR_ID",
            Opcode::MenuRequest => "MENU_REQUEST",
            Opcode::MenuStatus => "MENU_STATUS",
            Opcode::GiveDevicePowerStatus => "GIVE_DEVICE_POWER_STATUS",
            Opcode::ReportPowerStatus => "REPORT_POWER_STATUS",
            Opcode::GetMenuLanguage => "GET_MENU_LANGUAGE",
            Opcode::SelectAnalogueService => "SELECT_ANALOGUE_SERVICE",
            Opcode::SelectDigitalService => "SELECT_DIGITAL_SERVICE",
            Opcode::SetDigitalTimer => "SET_DIGITAL_TIMER",
            Opcode::ClearDigitalTimer => "CLEAR_DIGITAL_TIMER",
            Opcode::SetAudioRate => "SET_AUDIO_RATE",
            Opcode::InactiveSource => "INACTIVE_SOURCE",
            Opcode::CecVersion => "CEC_VERSION",
            Opcode::GetCecVersion => "GET_CEC_VERSION",
            Opcode::VendorCommandWithId => "VENDOR_COMMAND_WITH_ID",
            Opcode::ClearExtTimer => "CLEAR_EXT_TIMER",
            Opcode::SetExtTimer => "SET_EXT_TIMER",
            Opcode::InitiateArc => "INITIATE_ARC",
            Opcode::ReportArcInitiated => "REPORT_ARC_INITIATED",
            Opcode::ReportArcTerminated => "REPORT_ARC_TERMINATED",
            Opcode::RequestArcInitiation => "REQUEST_ARC_INITIATION",
            Opcode::RequestArcTermination => "REQUEST_ARC_TERMINATION",
            Opcode::TerminateArc => "TERMINATE_ARC",
            Opcode::CdcMessage => "CDC_MESSAGE",
            Opcode::Abort => "ABORT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/**
 * One CEC frame: header, optional opcode and operands.
 *
 * Its text form is the wire form: colon separated 2-digit hex bytes.
 * The high nibble of the first byte is the source, the low nibble the destination.
 * ```
 * # use hdmi_cec::{CecCommand, LogicalAddress};
 * let cmd: CecCommand = "12:8f:01:ab".parse().unwrap();
 * assert_eq!(cmd.source(), LogicalAddress::Record1);
 * assert_eq!(cmd.destination(), LogicalAddress::Record2);
 * assert_eq!(cmd.raw_opcode(), Some(0x8f));
 * assert_eq!(cmd.operands(), &[0x01, 0xab]);
 * assert_eq!(cmd.to_string(), "12:8f:01:ab");
 * ```
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CecCommand {
    source: LogicalAddress,
    destination: LogicalAddress,
    opcode: Option<u8>,
    operands: Vec<u8>,
}

impl CecCommand {
    /// a frame with an opcode. `opcode` is an [Opcode] or a raw byte.
    pub fn new<O: Into<u8>>(
        source: LogicalAddress,
        destination: LogicalAddress,
        opcode: O,
        operands: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            source,
            destination,
            opcode: Some(opcode.into()),
            operands: operands.into(),
        }
    }
    /// header only frame. Used to find out if someone is at `destination`
    pub fn poll(source: LogicalAddress, destination: LogicalAddress) -> Self {
        Self {
            source,
            destination,
            opcode: None,
            operands: Vec::new(),
        }
    }
    /// decode a raw frame as it is found on the wire
    pub fn from_bytes(frame: &[u8]) -> Result<Self, MalformedFrameError> {
        let (header, rest) = frame.split_first().ok_or(MalformedFrameError::Empty)?;
        let (opcode, operands) = match rest.split_first() {
            Some((opcode, operands)) => (Some(*opcode), operands.to_vec()),
            None => (None, Vec::new()),
        };
        Ok(Self {
            source: LogicalAddress::from_nibble(header >> 4),
            destination: LogicalAddress::from_nibble(*header),
            opcode,
            operands,
        })
    }
    /// the wire bytes: header, opcode, operands
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.operands.len());
        bytes.push(u8::from(self.source) << 4 | u8::from(self.destination));
        bytes.extend(self.opcode);
        bytes.extend_from_slice(&self.operands);
        bytes
    }
    /// return the initiator's logical address
    #[inline]
    pub fn source(&self) -> LogicalAddress {
        self.source
    }
    #[inline]
    pub fn destination(&self) -> LogicalAddress {
        self.destination
    }
    /// return the opcode of the message, None for poll
    pub fn opcode(&self) -> Option<Result<Opcode, TryFromPrimitiveError<Opcode>>> {
        self.opcode.map(Opcode::try_from)
    }
    #[inline]
    pub fn raw_opcode(&self) -> Option<u8> {
        self.opcode
    }
    #[inline]
    pub fn operands(&self) -> &[u8] {
        &self.operands
    }
    #[inline]
    pub fn is_poll(&self) -> bool {
        self.opcode.is_none()
    }
    /// return true if this is a broadcast message
    #[inline]
    pub fn is_broadcast(&self) -> bool {
        self.destination.is_broadcast()
    }
}

impl FromStr for CecCommand {
    type Err = MalformedFrameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(MalformedFrameError::Empty);
        }
        let bytes = s
            .split(':')
            .map(|token| {
                if token.len() == 2 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
                    u8::from_str_radix(token, 16)
                        .map_err(|_| MalformedFrameError::InvalidToken(token.to_string()))
                } else {
                    Err(MalformedFrameError::InvalidToken(token.to_string()))
                }
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for CecCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        let mut iter = bytes.iter();
        if let Some(header) = iter.next() {
            write!(f, "{header:02x}")?;
        }
        for b in iter {
            write!(f, ":{b:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_frame() {
        let cmd: CecCommand = "12:8f:01:ab".parse().unwrap();
        assert_eq!(u8::from(cmd.source()), 1);
        assert_eq!(u8::from(cmd.destination()), 2);
        assert_eq!(
            cmd.opcode().and_then(Result::ok),
            Some(Opcode::GiveDevicePowerStatus)
        );
        assert_eq!(cmd.operands(), &[0x01, 0xab]);
        assert_eq!(cmd.to_string(), "12:8f:01:ab");
    }

    #[test]
    fn numeric_and_text_construction_agree() {
        let built = CecCommand::new(
            LogicalAddress::Record1,
            LogicalAddress::Record2,
            0x8fu8,
            vec![0x01, 0xab],
        );
        assert_eq!(built, "12:8f:01:ab".parse().unwrap());
        assert_eq!(built.to_string(), "12:8f:01:ab");
    }

    #[test]
    fn poll_frame_is_single_byte() {
        let poll = CecCommand::poll(LogicalAddress::UnregisteredBroadcast, LogicalAddress::Tv);
        assert!(poll.is_poll());
        assert!(poll.opcode().is_none());
        assert_eq!(poll.to_string(), "f0");
        assert_eq!(poll.to_bytes(), vec![0xf0]);

        let parsed: CecCommand = "f0".parse().unwrap();
        assert_eq!(parsed, poll);
        assert!(parsed.operands().is_empty());
    }

    #[test]
    fn rejects_malformed_frames() {
        assert_eq!("".parse::<CecCommand>(), Err(MalformedFrameError::Empty));
        assert_eq!(
            "   ".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken("   ".into()))
        );
        assert_eq!(
            " 12:8f\n".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken(" 12".into()))
        );
        assert_eq!(
            "1".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken("1".into()))
        );
        assert_eq!(
            "12:8".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken("8".into()))
        );
        assert_eq!(
            "12::8f".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken("".into()))
        );
        assert_eq!(
            "12:zz".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken("zz".into()))
        );
        assert_eq!(
            "12:8f:".parse::<CecCommand>(),
            Err(MalformedFrameError::InvalidToken("".into()))
        );
        assert_eq!(CecCommand::from_bytes(&[]), Err(MalformedFrameError::Empty));
    }

    #[test]
    fn output_is_lowercase() {
        let cmd: CecCommand = "4F:87:00:E0:91".parse().unwrap();
        assert_eq!(cmd.to_string(), "4f:87:00:e0:91");
        assert!(cmd.is_broadcast());
        assert_eq!(cmd.source(), LogicalAddress::Playback1);
    }

    #[test]
    fn unknown_opcode_is_kept() {
        let cmd: CecCommand = "10:fe:01".parse().unwrap();
        assert_eq!(cmd.raw_opcode(), Some(0xfe));
        assert!(matches!(cmd.opcode(), Some(Err(_))));
        assert_eq!(cmd.to_string(), "10:fe:01");
    }

    #[test]
    fn opcode_names() {
        assert_eq!(Opcode::ReportPhysicalAddr.name(), "REPORT_PHYSICAL_ADDRESS");
        assert_eq!(Opcode::DeviceVendorId.to_string(), "DEVICE_VENDOR_ID");
        assert_eq!(u8::from(Opcode::SetOsdName), 0x47);
    }

    #[test]
    fn logical_address_from_nibble() {
        assert_eq!(LogicalAddress::from_nibble(0x05), LogicalAddress::Audiosystem);
        assert_eq!(LogicalAddress::from_nibble(0xf4), LogicalAddress::Playback1);
        assert!(LogicalAddress::from_nibble(0xf).is_broadcast());
        assert!(!LogicalAddress::DEVICES.contains(&LogicalAddress::UnregisteredBroadcast));
    }

    proptest! {
        #[test]
        fn wire_round_trip(frame in proptest::collection::vec(any::<u8>(), 1..16)) {
            let text = CecCommand::from_bytes(&frame).unwrap().to_string();
            let parsed: CecCommand = text.parse().unwrap();
            prop_assert_eq!(parsed.to_bytes(), frame);
            prop_assert_eq!(parsed.to_string(), text);
        }
    }
}
