//! One ping run against a real device
//!
//! Opening a session finds the device, claims the configured interface and
//! reads its endpoint descriptors. The interface stays claimed until the
//! session is dropped.

use crate::config::DeviceSettings;
use crate::tester::{EchoTester, TestResult, TestVector};
use crate::usb::{
    ClaimedInterface, EndpointInfo, UsbTransport, find_endpoint, interface_endpoints,
    max_packet_size, open_device,
};
use common::{Error, Result};
use rusb::Context;
use std::num::NonZeroUsize;

pub struct PingSession {
    claimed: ClaimedInterface,
    endpoints: Vec<EndpointInfo>,
    settings: DeviceSettings,
}

impl PingSession {
    /// Find the device, claim the interface and enumerate its endpoints
    pub fn open(context: &Context, settings: &DeviceSettings) -> Result<Self> {
        let handle = open_device(context, settings.vendor_id, settings.product_id)?;
        let claimed = ClaimedInterface::claim(handle, settings.interface)?;
        let endpoints = interface_endpoints(&claimed.handle().device(), settings.interface)?;

        Ok(Self {
            claimed,
            endpoints,
            settings: settings.clone(),
        })
    }

    /// Endpoints of the claimed interface
    pub fn endpoints(&self) -> &[EndpointInfo] {
        &self.endpoints
    }

    /// Max packet size of the IN endpoint
    pub fn transfer_unit(&self) -> Result<NonZeroUsize> {
        max_packet_size(
            &self.endpoints,
            self.settings.endpoint_in,
            self.settings.interface,
        )
    }

    /// Bounce every vector off the peer, reporting each result as it lands
    pub fn run<F>(&self, vectors: &[TestVector], on_result: F) -> Result<Vec<TestResult>>
    where
        F: FnMut(&TestResult),
    {
        let outbound = *self.endpoint(self.settings.endpoint_out)?;
        let inbound = *self.endpoint(self.settings.endpoint_in)?;
        let transfer_unit = self.transfer_unit()?;

        let transport = UsbTransport::new(self.claimed.handle(), outbound, inbound)?;
        EchoTester::new(transport, transfer_unit).run_all_with(vectors, on_result)
    }

    fn endpoint(&self, address: u8) -> Result<&EndpointInfo> {
        find_endpoint(&self.endpoints, address).ok_or(Error::EndpointNotFound {
            address,
            interface: self.settings.interface,
        })
    }
}
