//! nRF52832 peripheral configuration

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::Priority,
};

/// Embassy HAL configuration compatible with the S113 SoftDevice.
pub fn hal_config() -> Config {
    // Config is `non_exhaustive`, start from the default
    let mut config = Config::default();

    // Both clocks from the external crystals
    config.hfclk_source = HfclkSource::ExternalXtal;
    config.lfclk_source = LfclkSource::ExternalXtal;

    // DC/DC regulator cuts runtime current considerably
    config.dcdc.reg1 = true;

    // Priorities 0, 1 and 4 belong to the SoftDevice
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;

    config.debug = Debug::Allowed;

    config
}
