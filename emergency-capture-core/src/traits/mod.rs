pub mod capture_device;
pub mod platform;
