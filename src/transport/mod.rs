pub mod traits;
pub mod udp;

pub use traits::DeviceLink;
pub use udp::UdpDeviceLink;
