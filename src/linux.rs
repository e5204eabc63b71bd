use crate::command::CecCommand;
use crate::error::AdapterError;
use crate::physical_address::PhysicalAddress;
use crate::sys::{
    get_mode, get_phys, receive, set_mode, transmit, CecModeFollower, CecModeInitiator, CecMsg,
    RxStatus, CEC_MODE_FOLLOWER_MSK, CEC_MODE_INITIATOR_MSK,
};
use std::{
    io::Result,
    os::fd::{AsRawFd, RawFd},
    path::Path,
};

/// A blocking handle on a linux CEC device.
pub struct CecDevice(pub(crate) std::fs::File);

impl CecDevice {
    /**
     * Open a CEC device. Typically `/dev/cecX`
     * ```no_run
     * # use hdmi_cec::{CecDevice, CecModeInitiator, CecModeFollower};
     * # fn main() -> std::io::Result<()> {
     * let cec = CecDevice::open("/dev/cec0")?;
     * cec.set_mode(CecModeInitiator::Send, CecModeFollower::All)?;
     * # Ok(())
     * # }
     * ```
     */
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map(Self)
    }
    /// Change this handles mode.
    ///
    /// The initiator is the filehandle that is used to initiate messages.
    /// The follower is the filehandle that receives messages sent to the CEC adapter.
    /// Use [CecModeFollower::Monitor] or [CecModeFollower::MonitorAll] to see frames between other devices.
    pub fn set_mode(&self, initiator: CecModeInitiator, follower: CecModeFollower) -> Result<()> {
        let mode = u32::from(initiator) | u32::from(follower);
        unsafe { set_mode(self.0.as_raw_fd(), &mode) }?;
        Ok(())
    }
    pub fn get_mode(&self) -> Result<(CecModeInitiator, CecModeFollower)> {
        let mut mode = 0;
        unsafe { get_mode(self.0.as_raw_fd(), &mut mode) }?;
        let i = CecModeInitiator::try_from(mode & CEC_MODE_INITIATOR_MSK);
        let e = CecModeFollower::try_from(mode & CEC_MODE_FOLLOWER_MSK);
        match (i, e) {
            (Ok(i), Ok(e)) => Ok((i, e)),
            _ => Err(std::io::ErrorKind::Other.into()),
        }
    }
    /// Physical address of the adapter itself
    pub fn get_phys(&self) -> Result<PhysicalAddress> {
        let mut addr = 0;
        unsafe { get_phys(self.0.as_raw_fd(), &mut addr) }?;
        Ok(PhysicalAddress::from(addr))
    }
    /// Send a frame and wait for the bus to acknowledge it.
    ///
    /// Polls to empty addresses fail with [AdapterError::NotAcknowledged].
    pub fn transmit(&self, command: &CecCommand) -> std::result::Result<(), AdapterError> {
        let mut msg = CecMsg::try_from(command)?;
        unsafe { transmit(self.0.as_raw_fd(), &mut msg) }.map_err(std::io::Error::from)?;
        msg.tx_result()
    }
    /// receive a single frame.
    /// block forever
    #[inline]
    pub fn rec(&self) -> std::result::Result<CecCommand, AdapterError> {
        self.rec_for(0)
    }
    /// receive a single frame.
    /// block for at most `timeout` ms.
    /// the available frames depend on [CecModeFollower]
    pub fn rec_for(&self, timeout: u32) -> std::result::Result<CecCommand, AdapterError> {
        let msg = self.rec_msg(timeout)?;
        msg_to_command(&msg)
    }
    pub(crate) fn rec_msg(&self, timeout: u32) -> Result<CecMsg> {
        let mut msg = CecMsg::empty(timeout);
        unsafe { receive(self.0.as_raw_fd(), &mut msg) }?;
        Ok(msg)
    }
}

impl AsRawFd for CecDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

/// Received message to frame
pub(crate) fn msg_to_command(msg: &CecMsg) -> std::result::Result<CecCommand, AdapterError> {
    if msg.rx_status.contains(RxStatus::TIMEOUT) {
        return Err(AdapterError::Timeout(u64::from(msg.timeout)));
    }
    CecCommand::from_bytes(msg.bytes())
        .map_err(|e| AdapterError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
