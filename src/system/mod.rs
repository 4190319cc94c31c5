pub(crate) mod bluetooth;
pub(crate) mod config;
