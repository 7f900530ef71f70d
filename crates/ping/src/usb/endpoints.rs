//! Endpoint descriptor enumeration

use common::{Error, Result};
use rusb::{Context, Device, Direction, EndpointDescriptor, TransferType};
use std::fmt;
use std::num::NonZeroUsize;

/// Bits 0..=10 of wMaxPacketSize; bits 11..=12 count extra high-bandwidth
/// transactions per microframe and are not part of the packet size
const PACKET_SIZE_MASK: u16 = 0x07ff;

/// Endpoint descriptor fields relevant to the echo exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: u8,
    pub direction: Direction,
    pub transfer_type: TransferType,
    /// Raw wMaxPacketSize
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointInfo {
    /// Largest single transfer this endpoint carries
    pub fn transfer_unit(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(usize::from(self.max_packet_size & PACKET_SIZE_MASK)).ok_or(
            Error::ZeroPacketSize {
                address: self.address,
            },
        )
    }
}

impl From<&EndpointDescriptor<'_>> for EndpointInfo {
    fn from(descriptor: &EndpointDescriptor<'_>) -> Self {
        Self {
            address: descriptor.address(),
            direction: descriptor.direction(),
            transfer_type: descriptor.transfer_type(),
            max_packet_size: descriptor.max_packet_size(),
            interval: descriptor.interval(),
        }
    }
}

impl fmt::Display for EndpointInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "> Endpoint {:#04x}", self.address)?;
        writeln!(f, " Type:            {:?}", self.transfer_type)?;
        writeln!(f, " Max Packet Size: {}", self.max_packet_size)?;
        write!(f, " Interval:        {}", self.interval)
    }
}

/// Endpoints of alternate setting 0 of `interface` in the active configuration
///
/// An interface missing from the configuration yields an empty list.
pub fn interface_endpoints(device: &Device<Context>, interface: u8) -> Result<Vec<EndpointInfo>> {
    let config = device.active_config_descriptor()?;

    let mut endpoints = Vec::new();
    for iface in config.interfaces() {
        if iface.number() != interface {
            continue;
        }
        for desc in iface.descriptors() {
            if desc.setting_number() != 0 {
                continue;
            }
            for ep in desc.endpoint_descriptors() {
                endpoints.push(EndpointInfo::from(&ep));
            }
        }
    }

    Ok(endpoints)
}

pub fn find_endpoint(endpoints: &[EndpointInfo], address: u8) -> Option<&EndpointInfo> {
    endpoints.iter().find(|ep| ep.address == address)
}

/// Transfer unit of the endpoint at `address`
pub fn max_packet_size(
    endpoints: &[EndpointInfo],
    address: u8,
    interface: u8,
) -> Result<NonZeroUsize> {
    find_endpoint(endpoints, address)
        .ok_or(Error::EndpointNotFound { address, interface })?
        .transfer_unit()
}
