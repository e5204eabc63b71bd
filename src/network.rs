use crate::command::{CecCommand, LogicalAddress, Opcode};
use crate::device::HdmiDevice;
use crate::error::{AdapterError, MalformedFrameError};
use crate::vendor::VendorTable;
use parking_lot::Mutex;
use std::{collections::BTreeMap, future::Future, sync::Arc, time::Duration};
use tokio::sync::mpsc;

/// Frames sent to every device found by [HdmiNetwork::scan]
const ATTRIBUTE_REQUESTS: [Opcode; 4] = [
    Opcode::GivePhysicalAddr,
    Opcode::GiveDevicePowerStatus,
    Opcode::GiveDeviceVendorId,
    Opcode::GiveOsdName,
];

/**
 * Something that puts frames on the bus.
 *
 * `transmit` resolves once the frame was sent. A frame nobody acknowledged
 * has to be reported as [AdapterError::NotAcknowledged], this is how
 * [HdmiNetwork::scan] tells empty addresses apart.
 *
 * Received frames are handed to [HdmiNetwork::dispatch] (or [HdmiNetwork::listen]) by the adapter.
 */
pub trait Adapter: Send + Sync {
    fn transmit(
        &self,
        frame: &CecCommand,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;
}

impl<A: Adapter> Adapter for Arc<A> {
    fn transmit(
        &self,
        frame: &CecCommand,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        (**self).transmit(frame)
    }
}

/// Settings of a [HdmiNetwork]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NetworkConfig {
    /// source address of every frame the network sends.
    /// This address is skipped by [HdmiNetwork::scan].
    pub initiator: LogicalAddress,
    /// how long to wait for a poll to be acknowledged
    pub scan_timeout: Duration,
    /// how long to wait for an attribute request to be sent
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            initiator: LogicalAddress::UnregisteredBroadcast,
            scan_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_millis(1000),
        }
    }
}

/**
 * All devices seen on one bus.
 *
 * Devices are created the first time a frame from their logical address arrives
 * (or when [scan](HdmiNetwork::scan) finds them) and live as long as the network.
 * The registry is behind a single lock, so frames may be dispatched from any thread.
 *
 * ```no_run
 * # use hdmi_cec::{HdmiNetwork, Adapter, CecCommand, AdapterError};
 * # struct Bus;
 * # impl Adapter for Bus {
 * #     async fn transmit(&self, _: &CecCommand) -> Result<(), AdapterError> { Ok(()) }
 * # }
 * # async fn run() -> Result<(), AdapterError> {
 * let network = HdmiNetwork::new(Bus);
 * network.scan().await?;
 * // replies come in through the adapter
 * network.dispatch_raw("0f:87:00:e0:91").ok();
 * for dev in network.devices() {
 *     println!("{} {} {}", dev.logical_address(), dev.osd_name(), network.vendor_of(&dev));
 * }
 * # Ok(())
 * # }
 * ```
 */
pub struct HdmiNetwork<A> {
    adapter: A,
    config: NetworkConfig,
    vendors: VendorTable,
    devices: Mutex<BTreeMap<LogicalAddress, HdmiDevice>>,
}

impl<A: Adapter> HdmiNetwork<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, NetworkConfig::default())
    }
    pub fn with_config(adapter: A, config: NetworkConfig) -> Self {
        Self {
            adapter,
            config,
            vendors: VendorTable::default(),
            devices: Mutex::new(BTreeMap::new()),
        }
    }
    /// replace the built-in vendor names
    pub fn with_vendors(mut self, vendors: VendorTable) -> Self {
        self.vendors = vendors;
        self
    }
    #[inline]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }
    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
    #[inline]
    pub fn vendors(&self) -> &VendorTable {
        &self.vendors
    }
    pub fn vendor_of(&self, device: &HdmiDevice) -> &str {
        device.vendor(&self.vendors)
    }

    /// Snapshot of all known devices, ordered by logical address
    pub fn devices(&self) -> Vec<HdmiDevice> {
        self.devices.lock().values().cloned().collect()
    }
    /// Snapshot of a single device
    pub fn device(&self, address: LogicalAddress) -> Option<HdmiDevice> {
        self.devices.lock().get(&address).cloned()
    }

    /// Route a received frame to the device it came from.
    ///
    /// Creates the device if its address was not seen before.
    pub fn dispatch(&self, command: &CecCommand) {
        tracing::trace!(frame = %command, "rx");
        let source = command.source();
        let mut devices = self.devices.lock();
        let applied = devices
            .entry(source)
            .or_insert_with(|| {
                tracing::debug!(address = %source, "new device");
                HdmiDevice::new(source)
            })
            .update(command);

        if applied && matches!(command.opcode(), Some(Ok(Opcode::ActiveSource))) {
            // there is only one active source on the bus
            for device in devices.values_mut() {
                if device.logical_address() != source {
                    device.set_active_source(false);
                }
            }
        }
    }
    /// [dispatch](HdmiNetwork::dispatch) a frame in its text form.
    ///
    /// Surrounding whitespace, such as the line ending of a log or serial line, is ignored.
    pub fn dispatch_raw(&self, frame: &str) -> Result<(), MalformedFrameError> {
        match frame.trim().parse::<CecCommand>() {
            Ok(command) => {
                self.dispatch(&command);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(frame, error = %e, "unparsable frame");
                Err(e)
            }
        }
    }
    /// Dispatch frames in the order they arrive until all senders are gone.
    ///
    /// Replies to [scan](HdmiNetwork::scan) only reach their devices while this runs,
    /// so run both concurrently (e.g. `tokio::join!`) instead of one after the other.
    pub async fn listen(&self, mut frames: mpsc::Receiver<CecCommand>) {
        while let Some(command) = frames.recv().await {
            self.dispatch(&command);
        }
        tracing::debug!("frame source closed");
    }

    /// Send a frame from [NetworkConfig::initiator] to `destination`
    pub async fn send(
        &self,
        destination: LogicalAddress,
        opcode: Opcode,
        operands: &[u8],
    ) -> Result<(), AdapterError> {
        let frame = CecCommand::new(self.config.initiator, destination, opcode, operands);
        self.transmit(&frame, self.config.request_timeout).await
    }
    async fn transmit(&self, frame: &CecCommand, timeout: Duration) -> Result<(), AdapterError> {
        tracing::trace!(frame = %frame, "tx");
        match tokio::time::timeout(timeout, self.adapter.transmit(frame)).await {
            Ok(res) => res,
            Err(_) => Err(AdapterError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }

    /// Is there a device at `address`?
    ///
    /// No acknowledgment within [NetworkConfig::scan_timeout] means no.
    pub async fn poll(&self, address: LogicalAddress) -> Result<bool, AdapterError> {
        let frame = CecCommand::poll(self.config.initiator, address);
        match self.transmit(&frame, self.config.scan_timeout).await {
            Ok(()) => Ok(true),
            Err(AdapterError::NotAcknowledged) => Ok(false),
            Err(AdapterError::Timeout(ms)) => {
                tracing::debug!(%address, ms, "poll timed out");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /**
     * Poll every logical address except broadcast and ask whoever answers
     * for its physical address, power status, vendor id and OSD name.
     *
     * The answers arrive later through [dispatch](HdmiNetwork::dispatch).
     * Returns the addresses that acknowledged the poll.
     *
     * Dropping the returned future aborts the scan after the current frame.
     * Devices created up to then stay, possibly without any attributes.
     */
    pub async fn scan(&self) -> Result<Vec<LogicalAddress>, AdapterError> {
        let mut found = Vec::new();
        for address in LogicalAddress::DEVICES {
            if address == self.config.initiator {
                continue;
            }
            if !self.poll(address).await? {
                continue;
            }
            self.devices.lock().entry(address).or_insert_with(|| {
                tracing::debug!(%address, "new device");
                HdmiDevice::new(address)
            });
            found.push(address);

            for opcode in ATTRIBUTE_REQUESTS {
                match self.send(address, opcode, &[]).await {
                    Ok(()) => {}
                    Err(AdapterError::NotAcknowledged) => {
                        tracing::debug!(%address, opcode = opcode.name(), "device stopped answering");
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        tracing::debug!(?found, "scan done");
        Ok(found)
    }
}
