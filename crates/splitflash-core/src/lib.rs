pub mod builder;
pub mod command_runner;
pub mod config;
pub mod device;
pub mod doctor;
pub mod firmware;
pub mod flasher;
pub mod format;
#[cfg(test)]
pub(crate) mod test_support;
