pub mod config;
pub mod gathering;
pub mod kiosk;
