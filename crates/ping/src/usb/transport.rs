//! rusb-backed echo transport
//!
//! Chooses bulk or interrupt transfers from each endpoint's descriptor, the
//! same way a write to the endpoint address would be dispatched by the host
//! stack. Every transfer is synchronous and bounded by [`TRANSFER_TIMEOUT`].

use crate::tester::EchoTransport;
use crate::usb::EndpointInfo;
use common::{Error, Result};
use rusb::{Context, DeviceHandle, Direction, TransferType};
use std::time::Duration;
use tracing::trace;

/// Timeout applied to every write and read
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

/// Echo transport over one OUT and one IN endpoint of a claimed interface
pub struct UsbTransport<'a> {
    handle: &'a DeviceHandle<Context>,
    outbound: EndpointInfo,
    inbound: EndpointInfo,
}

impl<'a> UsbTransport<'a> {
    pub fn new(
        handle: &'a DeviceHandle<Context>,
        outbound: EndpointInfo,
        inbound: EndpointInfo,
    ) -> Result<Self> {
        check_endpoint(&outbound, Direction::Out)?;
        check_endpoint(&inbound, Direction::In)?;
        Ok(Self {
            handle,
            outbound,
            inbound,
        })
    }
}

/// Only bulk and interrupt endpoints in the expected direction are usable
fn check_endpoint(endpoint: &EndpointInfo, direction: Direction) -> Result<()> {
    if endpoint.direction != direction {
        return Err(Error::EndpointDirection {
            address: endpoint.address,
            expected: match direction {
                Direction::In => "IN",
                Direction::Out => "OUT",
            }
            .to_string(),
        });
    }
    match endpoint.transfer_type {
        TransferType::Bulk | TransferType::Interrupt => Ok(()),
        other => Err(Error::UnsupportedEndpoint {
            address: endpoint.address,
            transfer_type: format!("{:?}", other),
        }),
    }
}

impl EchoTransport for UsbTransport<'_> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let address = self.outbound.address;
        let written = match self.outbound.transfer_type {
            TransferType::Interrupt => {
                self.handle.write_interrupt(address, data, TRANSFER_TIMEOUT)?
            }
            _ => self.handle.write_bulk(address, data, TRANSFER_TIMEOUT)?,
        };
        trace!("OUT {:#04x}: {} of {} bytes", address, written, data.len());
        Ok(written)
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let address = self.inbound.address;
        let mut buffer = vec![0u8; max_len];
        let len = match self.inbound.transfer_type {
            TransferType::Interrupt => {
                self.handle
                    .read_interrupt(address, &mut buffer, TRANSFER_TIMEOUT)?
            }
            _ => self.handle.read_bulk(address, &mut buffer, TRANSFER_TIMEOUT)?,
        };
        buffer.truncate(len);
        trace!("IN {:#04x}: {} bytes", address, len);
        Ok(buffer)
    }
}
