#![cfg_attr(docsrs, feature(doc_cfg))]
/*!
 * Model of the [HDMI-CEC](https://en.wikipedia.org/wiki/Consumer_Electronics_Control) bus.
 *
 * - [PhysicalAddress] and [CecCommand] are the values found on the wire.
 *   A frame's text form is its bytes as lowercase hex, separated by colons: `"12:8f:01:ab"`.
 * - [HdmiDevice] keeps the last known state of one device and updates it from frames.
 * - [HdmiNetwork] finds devices on the bus and routes received frames to them.
 *   It talks to the bus through an [Adapter], e.g. `tokio::AsyncCec` (feature `async-device`) or your own.
 *
 * ```
 * # use hdmi_cec::{HdmiNetwork, Adapter, AdapterError, CecCommand, LogicalAddress};
 * # struct Bus;
 * # impl Adapter for Bus {
 * #     async fn transmit(&self, _: &CecCommand) -> Result<(), AdapterError> { Ok(()) }
 * # }
 * let network = HdmiNetwork::new(Bus);
 * network.dispatch(&"0f:87:00:e0:91".parse().unwrap());
 * network.dispatch(&"0f:47:54:56".parse().unwrap());
 *
 * let tv = network.device(LogicalAddress::Tv).unwrap();
 * assert_eq!(tv.osd_name(), "TV");
 * assert_eq!(network.vendor_of(&tv), "LG");
 * ```
 */
mod command;
mod device;
mod error;
mod linux;
mod network;
mod physical_address;
mod sys;
mod vendor;

pub use command::{CecCommand, LogicalAddress, Opcode};
pub use device::{bytes_to_uint, DeviceType, HdmiDevice, PowerStatus};
pub use error::{AdapterError, FormatError, MalformedFrameError};
pub use linux::CecDevice;
pub use network::{Adapter, HdmiNetwork, NetworkConfig};
pub use physical_address::PhysicalAddress;
pub use sys::{CecModeFollower, CecModeInitiator};
pub use vendor::{VendorTable, UNKNOWN_VENDOR};

#[cfg(feature = "async-device")]
#[cfg_attr(docsrs, doc(cfg(feature = "async-device")))]
pub mod tokio;
