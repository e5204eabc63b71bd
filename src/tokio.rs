use crate::linux::{msg_to_command, CecDevice};
use crate::{
    Adapter, AdapterError, CecCommand, CecModeFollower, CecModeInitiator, HdmiNetwork,
    PhysicalAddress,
};
use nix::libc::O_NONBLOCK;
use std::fs::OpenOptions;
use std::io::Result;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{unix::AsyncFd, Interest};

/**
 * Async [Adapter] on a linux CEC device.
 *
 * Frames are received on a non-blocking handle. Transmits run on a second, blocking
 * handle on the blocking thread pool, so the outcome (ACK or NACK) is known when they return.
 * ```no_run
 * # use hdmi_cec::{tokio::AsyncCec, CecModeInitiator, CecModeFollower, HdmiNetwork};
 * # use std::sync::Arc;
 * # async fn run() -> Result<(), hdmi_cec::AdapterError> {
 * let cec = Arc::new(AsyncCec::open("/dev/cec0")?);
 * cec.set_mode(CecModeInitiator::Send, CecModeFollower::All)?;
 * let network = HdmiNetwork::new(cec.clone());
 * tokio::try_join!(cec.feed(&network), network.scan())?;
 * # Ok(())
 * # }
 * ```
 */
pub struct AsyncCec {
    rx: AsyncFd<CecDevice>,
    tx: Arc<CecDevice>,
}

impl AsyncCec {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        /* When the O_NONBLOCK flag is given, the CEC_RECEIVE ioctl
         * will return the EAGAIN error code when no message is available.
         */
        let f = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(O_NONBLOCK)
            .open(path.as_ref())?;
        let rx = AsyncFd::with_interest(CecDevice(f), Interest::READABLE)?;
        let tx = Arc::new(CecDevice::open(path)?);
        Ok(Self { rx, tx })
    }
    /// mode of the receiving handle. An exclusive initiator would lock out the transmitting handle.
    pub fn set_mode(&self, initiator: CecModeInitiator, follower: CecModeFollower) -> Result<()> {
        self.rx.get_ref().set_mode(initiator, follower)
    }
    pub fn get_mode(&self) -> Result<(CecModeInitiator, CecModeFollower)> {
        self.rx.get_ref().get_mode()
    }
    pub fn get_phys(&self) -> Result<PhysicalAddress> {
        self.rx.get_ref().get_phys()
    }
    /// receive a single frame
    pub async fn rec(&self) -> std::result::Result<CecCommand, AdapterError> {
        let msg = self
            .rx
            .async_io(Interest::READABLE, |inner| inner.rec_msg(0))
            .await?;
        msg_to_command(&msg)
    }
    /// Dispatch every received frame to `network` until the device fails
    pub async fn feed<A: Adapter>(
        &self,
        network: &HdmiNetwork<A>,
    ) -> std::result::Result<(), AdapterError> {
        loop {
            let msg = self
                .rx
                .async_io(Interest::READABLE, |inner| inner.rec_msg(0))
                .await?;
            if msg.is_transmit_result() {
                continue;
            }
            match msg_to_command(&msg) {
                Ok(command) => network.dispatch(&command),
                Err(e) => tracing::warn!(error = %e, "dropping received message"),
            }
        }
    }
}

impl Adapter for AsyncCec {
    async fn transmit(&self, frame: &CecCommand) -> std::result::Result<(), AdapterError> {
        let tx = self.tx.clone();
        let frame = frame.clone();
        tokio::task::spawn_blocking(move || tx.transmit(&frame))
            .await
            .map_err(|e| AdapterError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}
