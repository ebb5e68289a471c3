// src/sensor/transport.rs

use std::time::Duration;

use crate::error::ValidationResult;

/// Bulk endpoint access used by the poller.
///
/// Implementations report an expired transfer as `ValidationError::TransportTimeout`
/// so the poller can tell it apart from a vanished device.
pub trait UsbTransport {
    fn write_bulk(&mut self, endpoint: u8, data: &[u8], timeout: Duration)
        -> ValidationResult<usize>;

    fn read_bulk(&mut self, endpoint: u8, buf: &mut [u8], timeout: Duration)
        -> ValidationResult<usize>;
}

#[cfg(feature = "usb")]
pub use self::rusb_transport::RusbTransport;

#[cfg(feature = "usb")]
mod rusb_transport {
    use std::time::Duration;

    use rusb::{DeviceHandle, GlobalContext};
    use tracing::{debug, info};

    use super::UsbTransport;
    use crate::error::{ValidationError, ValidationResult};

    /// libusb transport holding the claimed interface for its whole lifetime.
    pub struct RusbTransport {
        handle: DeviceHandle<GlobalContext>,
        interface: u8,
    }

    fn map_usb_error(error: rusb::Error, context: &'static str) -> ValidationError {
        match error {
            rusb::Error::Timeout => ValidationError::TransportTimeout(context),
            other => ValidationError::Transport(format!("{context}: {other}")),
        }
    }

    impl RusbTransport {
        pub fn open(
            vendor_id: u16,
            product_id: u16,
            configuration: u8,
            interface: u8,
        ) -> ValidationResult<Self> {
            let mut handle = rusb::open_device_with_vid_pid(vendor_id, product_id).ok_or(
                ValidationError::DeviceNotFound {
                    vendor_id,
                    product_id,
                },
            )?;

            if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
                debug!("Kernel driver auto-detach unavailable: {e}");
            }
            if let Err(e) = handle.set_active_configuration(configuration) {
                debug!("Could not select configuration {configuration}: {e}");
            }
            handle
                .claim_interface(interface)
                .map_err(|e| map_usb_error(e, "claiming the tracker interface"))?;

            info!("Opened USB device {vendor_id:04x}:{product_id:04x}");
            Ok(Self { handle, interface })
        }
    }

    impl UsbTransport for RusbTransport {
        fn write_bulk(
            &mut self,
            endpoint: u8,
            data: &[u8],
            timeout: Duration,
        ) -> ValidationResult<usize> {
            self.handle
                .write_bulk(endpoint, data, timeout)
                .map_err(|e| map_usb_error(e, "sending the frame request"))
        }

        fn read_bulk(
            &mut self,
            endpoint: u8,
            buf: &mut [u8],
            timeout: Duration,
        ) -> ValidationResult<usize> {
            self.handle
                .read_bulk(endpoint, buf, timeout)
                .map_err(|e| map_usb_error(e, "waiting for frame data"))
        }
    }

    impl Drop for RusbTransport {
        fn drop(&mut self) {
            if let Err(e) = self.handle.release_interface(self.interface) {
                debug!("Releasing interface {} failed: {e}", self.interface);
            }
        }
    }
}
