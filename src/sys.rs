//https://www.kernel.org/doc/html/latest/userspace-api/media/cec/cec-api.html

use crate::command::CecCommand;
use crate::error::AdapterError;
use bitflags::bitflags;
use nix::{ioctl_read, ioctl_readwrite, ioctl_write_ptr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

//#define CEC_ADAP_G_PHYS_ADDR    _IOR('a',  1, __u16)
ioctl_read! {
    /// Query physical addresses
    /// Filled by the driver.
    get_phys, b'a',  1, u16
}

//#define CEC_G_MODE              _IOR('a',  8, __u32)
ioctl_read! {
    /// Query mode
    /// Filled by the driver.
    get_mode, b'a',  8, u32
}
//#define CEC_S_MODE              _IOW('a',  9, __u32)
ioctl_write_ptr! {
    /// Select how this filehandle initiates and which messages it follows.
    /// If there is an exclusive initiator then only that initiator can call CEC_RECEIVE and CEC_TRANSMIT.
    set_mode, b'a',  9, u32
}

// ---  The message handling modes  ---
/// Modes for initiator
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u32)]
pub enum CecModeInitiator {
    /// Transmiting not possible (but others can)
    None = 0,
    /// **Default** Shared access
    Send = 1,
    /// Do not allow other senders
    Exclusive = 2,
}
pub const CEC_MODE_INITIATOR_MSK: u32 = 0x0f;
/// Modes for follower
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u32)]
pub enum CecModeFollower {
    /// **Default**: Only retrieve replies to own (this handles) messages
    RepliesOnly = 0x0 << 4,
    /// Retrieve all messages for this device.
    All = 0x1 << 4,
    /// Retrieve all messages and lock this device.
    Exclusive = 0x2 << 4,
    /// The core passes on most messages without processing them.
    ExclusivePassthru = 0x3 << 4,
    /// Get all messages sent or received by this device. Needs `CAP_NET_ADMIN`.
    Monitor = 0xe << 4,
    /// As above but for all messages on the bus.
    MonitorAll = 0xf << 4,
}
pub const CEC_MODE_FOLLOWER_MSK: u32 = 0xf0;

// ---  Transmit/receive a CEC command  ---
//#define CEC_TRANSMIT            _IOWR('a',  5, struct cec_msg)
ioctl_readwrite! {
    /// In blocking mode this returns after the transmit finished, tx_status holds the outcome.
    /// If there is no more room in the transmit queue it fails with EBUSY.
    transmit, b'a',  5, CecMsg
}
//#define CEC_RECEIVE             _IOWR('a',  6, struct cec_msg)
ioctl_readwrite! {
    /// Blocking mode waits `timeout` ms (0 = forever), non-blocking mode fails with EAGAIN if nothing is pending.
    /// A received message is either from another device (sequence 0) or the result of an earlier non-blocking transmit.
    receive, b'a',  6, CecMsg
}

pub const CEC_MAX_MSG_SIZE: usize = 16;

/// `struct cec_msg`
#[derive(Debug)]
#[repr(C)]
pub struct CecMsg {
    /// Timestamp in nanoseconds using CLOCK_MONOTONIC. Set by the driver when the message transmission has finished.
    tx_ts: u64,
    /// Timestamp in nanoseconds using CLOCK_MONOTONIC. Set by the driver when the message was received.
    rx_ts: u64,
    /// Length in bytes of the message.
    len: u32,
    /// The timeout (in ms) that is used to timeout CEC_RECEIVE.
    /// Set to 0 if you want to wait forever.
    pub timeout: u32,
    /// The framework assigns a sequence number to messages that are sent.
    pub sequence: u32,
    /// No flags are defined yet, so set this to 0.
    flags: u32,
    /// Includes initiator, destination and opcode.
    msg: [u8; CEC_MAX_MSG_SIZE],
    /// If non-zero, wait for a reply with this opcode. Unused here.
    reply: u8,
    /// The message receive status bits. Set by the driver.
    pub rx_status: RxStatus,
    /// The message transmit status bits. Set by the driver.
    pub tx_status: TxStatus,
    tx_arb_lost_cnt: u8,
    tx_nack_cnt: u8,
    tx_low_drive_cnt: u8,
    tx_error_cnt: u8,
}

impl CecMsg {
    /// a message that is ready for CEC_RECEIVE
    pub fn empty(timeout: u32) -> CecMsg {
        Self {
            tx_ts: 0,
            rx_ts: 0,
            len: 0,
            timeout,
            sequence: 0,
            flags: 0,
            msg: [0; CEC_MAX_MSG_SIZE],
            reply: 0,
            rx_status: RxStatus::empty(),
            tx_status: TxStatus::empty(),
            tx_arb_lost_cnt: 0,
            tx_nack_cnt: 0,
            tx_low_drive_cnt: 0,
            tx_error_cnt: 0,
        }
    }
    /// the wire bytes received or to be sent
    pub fn bytes(&self) -> &[u8] {
        let len = (self.len as usize).min(CEC_MAX_MSG_SIZE);
        &self.msg[..len]
    }
    /// true for the outcome of a transmit, as seen in monitor mode or after a non-blocking transmit
    pub fn is_transmit_result(&self) -> bool {
        !self.tx_status.is_empty()
    }
    /// Turn the transmit status into a result
    pub fn tx_result(&self) -> Result<(), AdapterError> {
        if self.tx_status.contains(TxStatus::OK) {
            Ok(())
        } else if self.tx_status.contains(TxStatus::NACK) {
            Err(AdapterError::NotAcknowledged)
        } else {
            Err(AdapterError::Transmit(format!(
                "{:?} (arb lost {}, nack {}, low drive {}, error {})",
                self.tx_status,
                self.tx_arb_lost_cnt,
                self.tx_nack_cnt,
                self.tx_low_drive_cnt,
                self.tx_error_cnt
            )))
        }
    }
}

impl TryFrom<&CecCommand> for CecMsg {
    type Error = AdapterError;
    fn try_from(command: &CecCommand) -> Result<Self, Self::Error> {
        let bytes = command.to_bytes();
        if bytes.len() > CEC_MAX_MSG_SIZE {
            return Err(AdapterError::FrameTooLong(bytes.len()));
        }
        let mut msg = Self::empty(0);
        msg.msg[..bytes.len()].copy_from_slice(&bytes);
        msg.len = bytes.len() as u32;
        Ok(msg)
    }
}

// ---  cec status field  ---
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TxStatus: u8 {
        const OK          = (1 << 0);
        const ARB_LOST    = (1 << 1);
        const NACK        = (1 << 2);
        const LOW_DRIVE   = (1 << 3);
        const ERROR       = (1 << 4);
        const MAX_RETRIES = (1 << 5);
    }
}
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RxStatus: u8 {
        const OK            = (1 << 0);
        const TIMEOUT       = (1 << 1);
        const FEATURE_ABORT = (1 << 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_kernel() {
        assert_eq!(std::mem::size_of::<CecMsg>(), 56);
    }

    #[test]
    fn command_to_msg() {
        let cmd: CecCommand = "4f:84:10:00:04".parse().unwrap();
        let msg = CecMsg::try_from(&cmd).unwrap();
        assert_eq!(msg.bytes(), &[0x4f, 0x84, 0x10, 0x00, 0x04]);
        assert_eq!(CecCommand::from_bytes(msg.bytes()).unwrap(), cmd);
    }

    #[test]
    fn oversized_command() {
        let cmd = CecCommand::from_bytes(&[0x40; 17]).unwrap();
        assert!(matches!(
            CecMsg::try_from(&cmd),
            Err(AdapterError::FrameTooLong(17))
        ));
    }

    #[test]
    fn tx_status_mapping() {
        let mut msg = CecMsg::empty(0);
        msg.tx_status = TxStatus::OK;
        assert!(msg.tx_result().is_ok());
        msg.tx_status = TxStatus::NACK | TxStatus::MAX_RETRIES;
        assert!(matches!(msg.tx_result(), Err(AdapterError::NotAcknowledged)));
        msg.tx_status = TxStatus::ARB_LOST | TxStatus::MAX_RETRIES;
        assert!(matches!(msg.tx_result(), Err(AdapterError::Transmit(_))));
    }
}
