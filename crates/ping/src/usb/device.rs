//! Device lookup and interface ownership
//!
//! [`ClaimedInterface`] owns the device handle while the interface is
//! claimed. Dropping it releases the interface and hands the interface back
//! to the kernel driver if one was detached, so every exit path (including a
//! transport fault mid-run) leaves the device as it was found.

use common::{Error, Result};
use rusb::{Context, DeviceHandle, UsbContext};
use tracing::{debug, info, warn};

/// Open the first attached device matching `vendor_id:product_id`
pub fn open_device(
    context: &Context,
    vendor_id: u16,
    product_id: u16,
) -> Result<DeviceHandle<Context>> {
    for device in context.devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!(
                    "Skipping device on bus {:03} address {:03}: {}",
                    device.bus_number(),
                    device.address(),
                    e
                );
                continue;
            }
        };

        if descriptor.vendor_id() != vendor_id || descriptor.product_id() != product_id {
            continue;
        }

        let handle = device.open().map_err(|e| {
            warn!(
                "Failed to open device {:04x}:{:04x}: {}",
                vendor_id, product_id, e
            );
            match e {
                rusb::Error::NotFound | rusb::Error::NoDevice => Error::DeviceNotFound {
                    vendor_id,
                    product_id,
                },
                other => Error::Transport(other),
            }
        })?;

        info!(
            "Opened device {:04x}:{:04x} (bus {:03} address {:03})",
            vendor_id,
            product_id,
            device.bus_number(),
            device.address()
        );
        return Ok(handle);
    }

    Err(Error::DeviceNotFound {
        vendor_id,
        product_id,
    })
}

/// Interface ownership operations of a device handle
///
/// Implemented by `DeviceHandle<Context>`; the claim guard only needs these
/// five calls.
pub trait InterfaceControl {
    fn kernel_driver_bound(&self, interface: u8) -> rusb::Result<bool>;
    fn detach_driver(&mut self, interface: u8) -> rusb::Result<()>;
    fn attach_driver(&mut self, interface: u8) -> rusb::Result<()>;
    fn claim(&mut self, interface: u8) -> rusb::Result<()>;
    fn release(&mut self, interface: u8) -> rusb::Result<()>;
}

impl InterfaceControl for DeviceHandle<Context> {
    fn kernel_driver_bound(&self, interface: u8) -> rusb::Result<bool> {
        self.kernel_driver_active(interface)
    }

    fn detach_driver(&mut self, interface: u8) -> rusb::Result<()> {
        self.detach_kernel_driver(interface)
    }

    fn attach_driver(&mut self, interface: u8) -> rusb::Result<()> {
        self.attach_kernel_driver(interface)
    }

    fn claim(&mut self, interface: u8) -> rusb::Result<()> {
        self.claim_interface(interface)
    }

    fn release(&mut self, interface: u8) -> rusb::Result<()> {
        self.release_interface(interface)
    }
}

/// Detach the kernel driver from `interface` if one is bound
///
/// Best effort: any USB error from this step is logged and the claim goes
/// ahead. Returns whether a driver was detached.
fn detach_kernel_driver<H: InterfaceControl>(handle: &mut H, interface: u8) -> bool {
    let result = match handle.kernel_driver_bound(interface) {
        Ok(true) => handle.detach_driver(interface).map(|()| true),
        Ok(false) => Ok(false),
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => {
            debug!("Detached kernel driver from interface {}", interface);
            true
        }
        Ok(false) => {
            debug!("No kernel driver active on interface {}", interface);
            false
        }
        Err(e) => {
            warn!(
                "Could not detach kernel driver from interface {}: {}",
                interface, e
            );
            false
        }
    }
}

/// An interface claimed for exclusive use, released on drop
pub struct ClaimedInterface<H: InterfaceControl = DeviceHandle<Context>> {
    handle: H,
    interface: u8,
    /// Kernel driver was detached by us and should be re-attached
    reattach: bool,
}

impl<H: InterfaceControl> ClaimedInterface<H> {
    /// Detach any kernel driver (best effort) and claim `interface`
    ///
    /// A failed claim is never tolerated.
    pub fn claim(mut handle: H, interface: u8) -> Result<Self> {
        let reattach = detach_kernel_driver(&mut handle, interface);

        if let Err(e) = handle.claim(interface) {
            warn!("Failed to claim interface {}: {}", interface, e);
            if reattach {
                let _ = handle.attach_driver(interface);
            }
            return Err(Error::Transport(e));
        }

        info!("Claimed interface {}", interface);
        Ok(Self {
            handle,
            interface,
            reattach,
        })
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn interface(&self) -> u8 {
        self.interface
    }
}

impl<H: InterfaceControl> Drop for ClaimedInterface<H> {
    fn drop(&mut self) {
        match self.handle.release(self.interface) {
            Ok(()) => info!("Released interface {}", self.interface),
            Err(e) => warn!("Failed to release interface {}: {}", self.interface, e),
        }

        if self.reattach {
            if let Err(e) = self.handle.attach_driver(self.interface) {
                debug!(
                    "Could not reattach kernel driver to interface {}: {}",
                    self.interface, e
                );
            } else {
                debug!("Reattached kernel driver to interface {}", self.interface);
            }
        }
    }
}
