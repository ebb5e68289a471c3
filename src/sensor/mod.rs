// src/sensor/mod.rs
//! Polhemus motion tracker access: frame layout, calibration and USB polling.

pub mod frame;
pub mod mock;
pub mod polhemus;
pub mod transport;

pub use polhemus::{PolhemusUsb, SensorSample};
pub use transport::UsbTransport;

// src/sensor/mod.rs
