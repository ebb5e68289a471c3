// src/sensor/polhemus.rs

use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::constants::{
    POLHEMUS_IN_ENDPOINT, POLHEMUS_MAX_SENSORS, POLHEMUS_OUTPUT_COMMAND, POLHEMUS_OUT_ENDPOINT,
    POLHEMUS_POLL_COMMAND, POLHEMUS_PRODUCT_ID, POLHEMUS_READ_BUFFER_LEN, POLHEMUS_TIMEOUT,
    POLHEMUS_UNITS_COMMAND, POLHEMUS_VENDOR_ID,
};
use crate::error::{ValidationError, ValidationResult};
use crate::sensor::frame::{calibrate_position, parse_frame, split_frames};
use crate::sensor::transport::UsbTransport;
use crate::types::{Quaternion, Vec3};

#[cfg(feature = "usb")]
use crate::constants::{POLHEMUS_CONFIGURATION, POLHEMUS_INTERFACE};
#[cfg(feature = "usb")]
use crate::sensor::transport::RusbTransport;

/// Last known state of one tracker sensor. Overwritten in place by each fresh frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSample {
    position: Vec3,
    quaternion: Quaternion,
    last_update: Option<SystemTime>,
}

impl SensorSample {
    /// Calibrated position in mm.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    /// Local time of the last fresh frame; `None` if never updated.
    pub fn last_update(&self) -> Option<SystemTime> {
        self.last_update
    }
}

/// Polhemus motion tracker polled over USB bulk transfers.
///
/// A poller without a device is still usable: it reports `DeviceNotFound` from
/// `poll` and keeps its zeroed samples, so callers may poll speculatively.
pub struct PolhemusUsb<T: UsbTransport> {
    transport: Option<T>,
    sensors: [SensorSample; POLHEMUS_MAX_SENSORS],
}

#[cfg(feature = "usb")]
impl PolhemusUsb<RusbTransport> {
    /// Opens and configures the tracker, failing on a missing device or a
    /// configuration timeout.
    pub fn try_connect() -> ValidationResult<Self> {
        let transport = RusbTransport::open(
            POLHEMUS_VENDOR_ID,
            POLHEMUS_PRODUCT_ID,
            POLHEMUS_CONFIGURATION,
            POLHEMUS_INTERFACE,
        )?;
        Self::with_transport(transport)
    }

    /// Like `try_connect`, but reports a failure once and returns an invalid
    /// poller instead.
    pub fn connect() -> Self {
        match Self::try_connect() {
            Ok(poller) => poller,
            Err(e) => {
                warn!("Polhemus unavailable ({e}); sensor polling disabled");
                Self::invalid()
            }
        }
    }
}

impl<T: UsbTransport> PolhemusUsb<T> {
    /// Configures the tracker on `transport`: units in cm, then the output list
    /// (position, quaternion, CRLF).
    pub fn with_transport(mut transport: T) -> ValidationResult<Self> {
        for command in [POLHEMUS_UNITS_COMMAND, POLHEMUS_OUTPUT_COMMAND] {
            transport.write_bulk(POLHEMUS_OUT_ENDPOINT, command, POLHEMUS_TIMEOUT)?;
        }
        info!("Polhemus configured");
        Ok(Self {
            transport: Some(transport),
            sensors: Default::default(),
        })
    }

    /// A poller with no device behind it.
    pub fn invalid() -> Self {
        Self {
            transport: None,
            sensors: Default::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.transport.is_some()
    }

    pub fn sensors(&self) -> &[SensorSample] {
        &self.sensors
    }

    pub fn sensor(&self, index: usize) -> Option<&SensorSample> {
        self.sensors.get(index)
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Requests one frame per sensor and refreshes the samples.
    ///
    /// Returns the number of sensors refreshed. Transport errors leave every
    /// sample untouched; the caller should treat them as "no new data" for this
    /// tick. Unparseable lines are skipped and their sensor keeps its sample.
    pub fn poll(&mut self) -> ValidationResult<usize> {
        let Some(transport) = self.transport.as_mut() else {
            debug!("Poll skipped: no device");
            return Err(ValidationError::DeviceNotFound {
                vendor_id: POLHEMUS_VENDOR_ID,
                product_id: POLHEMUS_PRODUCT_ID,
            });
        };

        if let Err(e) =
            transport.write_bulk(POLHEMUS_OUT_ENDPOINT, POLHEMUS_POLL_COMMAND, POLHEMUS_TIMEOUT)
        {
            warn!("Frame request failed: {e}");
            return Err(e);
        }

        let mut buf = [0u8; POLHEMUS_READ_BUFFER_LEN];
        let received = match transport.read_bulk(POLHEMUS_IN_ENDPOINT, &mut buf, POLHEMUS_TIMEOUT)
        {
            Ok(n) => n,
            Err(e) => {
                warn!("Frame read failed: {e}");
                return Err(e);
            }
        };

        let now = SystemTime::now();
        let mut refreshed = 0;
        for (index, line) in split_frames(&buf[..received]).into_iter().enumerate() {
            match parse_frame(line) {
                Ok(frame) => {
                    self.sensors[index] = SensorSample {
                        position: calibrate_position(&frame.position),
                        quaternion: frame.quaternion,
                        last_update: Some(now),
                    };
                    refreshed += 1;
                }
                Err(reason) => warn!("Skipping frame of sensor {index}: {reason}"),
            }
        }
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::frame::RawFrame;
    use crate::sensor::mock::{MockReply, MockTransport};

    fn frame(position: Vec3) -> RawFrame {
        RawFrame {
            position,
            quaternion: [1.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_configuration_commands_sent() {
        let poller = PolhemusUsb::with_transport(MockTransport::new()).unwrap();
        let writes = poller.transport().unwrap().writes();
        assert_eq!(writes[0], b"U1\r");
        assert_eq!(writes[1], b"O*,2,7,1\r");
        assert!(poller.is_valid());
    }

    #[test]
    fn test_configuration_timeout_fails() {
        let mut transport = MockTransport::new();
        transport.push(MockReply::WriteTimeout);
        assert!(matches!(
            PolhemusUsb::with_transport(transport),
            Err(ValidationError::TransportTimeout(_))
        ));
    }

    #[test]
    fn test_poll_updates_calibrated_samples() {
        let mut transport = MockTransport::new();
        transport.push_frames(&[frame([16.55, 0.45, -22.75]), frame([17.55, 0.45, -22.75])]);
        let mut poller = PolhemusUsb::with_transport(transport).unwrap();

        assert_eq!(poller.poll().unwrap(), 2);
        let first = poller.sensor(0).unwrap();
        assert!(first.last_update().is_some());
        assert_eq!(first.quaternion(), [1.0, 0.0, 0.0, 0.0]);
        for value in first.position() {
            assert!(value.abs() < 1e-9);
        }
        assert!((poller.sensor(1).unwrap().position()[0] - 10.0).abs() < 1e-9);
        assert!(poller.sensor(2).unwrap().last_update().is_none());
        assert_eq!(poller.transport().unwrap().writes().last().unwrap(), b"p");
    }

    #[test]
    fn test_timeouts_keep_previous_sample() {
        let mut transport = MockTransport::new();
        transport.push_frames(&[frame([20.0, 1.0, -20.0])]);
        transport.push(MockReply::ReadTimeout);
        transport.push(MockReply::WriteTimeout);
        transport.push(MockReply::ReadTimeout);
        let mut poller = PolhemusUsb::with_transport(transport).unwrap();

        poller.poll().unwrap();
        let before = *poller.sensor(0).unwrap();
        for _ in 0..3 {
            assert!(matches!(poller.poll(), Err(ValidationError::TransportTimeout(_))));
            assert_eq!(*poller.sensor(0).unwrap(), before);
        }
    }

    #[test]
    fn test_malformed_line_skipped() {
        let mut transport = MockTransport::new();
        transport.push_frames(&[frame([20.0, 1.0, -20.0])]);
        let mut bytes = b"01 garbage\r\n".to_vec();
        bytes.extend_from_slice(b"02 1 2 3 1 0 0 0\r\n");
        transport.push(MockReply::Response(bytes));
        let mut poller = PolhemusUsb::with_transport(transport).unwrap();

        poller.poll().unwrap();
        let before = *poller.sensor(0).unwrap();
        assert_eq!(poller.poll().unwrap(), 1);
        assert_eq!(*poller.sensor(0).unwrap(), before);
        assert!(poller.sensor(1).unwrap().last_update().is_some());
    }

    #[test]
    fn test_invalid_poller_polls_without_panicking() {
        let mut poller = PolhemusUsb::<MockTransport>::invalid();
        assert!(!poller.is_valid());
        for _ in 0..3 {
            assert!(matches!(
                poller.poll(),
                Err(ValidationError::DeviceNotFound { .. })
            ));
        }
        assert_eq!(poller.sensor(0).unwrap().position(), [0.0; 3]);
    }
}
