#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Core
use core::cell::RefCell;

// Device
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    interrupt::{self, InterruptExt, Priority},
    peripherals::{SPI2, TWISPI1},
    spim,
    twim::{self, Twim},
};
use embassy_sync::{
    blocking_mutex::{
        raw::{NoopRawMutex, ThreadModeRawMutex},
        Mutex,
    },
    signal::Signal,
};
use embassy_time::{Duration, Instant, Ticker, Timer};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<TWISPI1>;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{
    backlight::{Backlight, AMBIENT_LEVEL, INTERACTIVE_LEVEL},
    button::Button,
    display::Display,
    touch::{tap_kind, TouchController, TouchGesture},
};
use system::{
    bluetooth::{self, Server, DOCUMENT, TIME_SET, TIME_ZONE_SET},
    config::hal_config,
};

// Library
use sunshine_face::{
    config::{AMBIENT_AFTER_SECS, BACKGROUND_AMBIENT, DEFAULT_UTC_OFFSET_SECS},
    face::{HostEvent, WatchFaceService},
    power::{screen_mode, ScreenMode},
    sync::{MemoryChannel, SYNC_PATH},
    time::{TimeReference, WallClock},
};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

/// Face main loop period
const FACE_POLL_MS: u64 = 50;

// Communication channels
static BUTTON_PRESSED: Signal<ThreadModeRawMutex, ()> = Signal::new();
static TOUCH_EVENT: Signal<ThreadModeRawMutex, TouchGesture> = Signal::new();

static I2C_BUS: StaticCell<Mutex<NoopRawMutex, RefCell<Twim<'static, TWISPI1>>>> =
    StaticCell::new();

/// Polls the button state every 10ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_button(mut button: Button) {
    loop {
        if button.pressed().await {
            BUTTON_PRESSED.signal(());
        }

        // Re-schedule the timer interrupt in 10ms
        Timer::after(Duration::from_millis(10)).await;
    }
}

/// Polls the touch controller every 2ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_touch(mut touch: TouchController<TWISPI1>) {
    loop {
        if let Some(gesture) = touch.try_event_detected() {
            TOUCH_EVENT.signal(gesture);
        }

        // Re-schedule the timer interrupt in 2ms
        Timer::after(Duration::from_millis(2)).await;
    }
}

/// Drives the watch face: screen policy, incoming documents, clock, redraws.
#[embassy_executor::task(pool_size = 1)]
async fn run_face(mut display: Display<SPI2>, mut backlight: Backlight) {
    let mut face = WatchFaceService::new(MemoryChannel::new(), DEFAULT_UTC_OFFSET_SECS);
    let mut clock = WallClock::new(TimeReference::new(BUILD_UTC_SECS * 1_000, 0));

    let mut display_on = true;
    let mut mode = ScreenMode::Off;
    let mut last_activity = Instant::now();
    let mut last_minute = i64::MIN;
    // Offset last written by the phone, re-applied whenever the face shows
    let mut utc_offset = None;

    let mut tick = Ticker::every(Duration::from_millis(FACE_POLL_MS));
    loop {
        let uptime = Instant::now();
        let now_ms = clock.now_ms(uptime.as_millis());

        // Button toggles the screen
        if BUTTON_PRESSED.try_take().is_some() {
            display_on = !display_on;
            last_activity = uptime;
        }

        if let Some(reference) = TIME_SET.try_take() {
            clock.set_time(reference);
            face.dispatch(HostEvent::TimeTick, now_ms);
        }

        if let Some(offset) = TIME_ZONE_SET.try_take() {
            defmt::info!("UTC offset set to {} s", offset);
            utc_offset = Some(offset);
            face.dispatch(HostEvent::TimeZoneChanged(offset), now_ms);
        }

        if let Some(bytes) = DOCUMENT.try_take() {
            if let Err(e) = face.channel_mut().receive(SYNC_PATH, &bytes) {
                defmt::warn!("Rejected weather document: {}", e);
            }
        }

        // Touch wakes the face, taps only count while interactive
        if let Some(gesture) = TOUCH_EVENT.try_take() {
            last_activity = uptime;
            if mode == ScreenMode::Interactive {
                face.dispatch(HostEvent::Tap(tap_kind(gesture)), now_ms);
            }
        }

        let idle_secs = uptime.duration_since(last_activity).as_secs();
        let next = screen_mode(display_on, idle_secs, AMBIENT_AFTER_SECS);
        if next != mode {
            defmt::info!("Screen {} -> {}", mode, next);
            for event in mode.transition_events(next) {
                face.dispatch(event, now_ms);
            }
            if let (ScreenMode::Off, Some(offset)) = (mode, utc_offset) {
                face.dispatch(HostEvent::TimeZoneChanged(offset), now_ms);
            }
            match next {
                ScreenMode::Off => {
                    backlight.off();
                    if let Err(e) = display.clear(BACKGROUND_AMBIENT) {
                        defmt::error!("Clearing failed: {}", e);
                    }
                }
                ScreenMode::Interactive => backlight.set(INTERACTIVE_LEVEL),
                ScreenMode::Ambient => backlight.set(AMBIENT_LEVEL),
            }
            defmt::debug!("Backlight level {}", backlight.get_brightness());
            mode = next;
        }

        // Host-driven minute tick in ambient mode
        let minute = now_ms / 60_000;
        if mode == ScreenMode::Ambient && minute != last_minute {
            face.dispatch(HostEvent::TimeTick, now_ms);
        }
        last_minute = minute;

        face.poll(now_ms);

        if face.take_redraw() && mode != ScreenMode::Off {
            if let Err(e) = display.draw_face(&face, now_ms) {
                defmt::error!("Drawing failed: {}", e);
            }
        }

        tick.next().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(hal_config());
    defmt::info!("Initializing");

    // Keep peripheral interrupts clear of the SoftDevice priorities
    interrupt::SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1.set_priority(Priority::P3);
    interrupt::SPIM2_SPIS2_SPI2.set_priority(Priority::P3);

    // Initialize Backlight
    let backlight = Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        0,
    );

    // Initialize Button
    let button = Button::init(
        Input::new(p.P0_13.degrade(), Pull::None),
        Output::new(p.P0_15.degrade(), Level::Low, OutputDrive::Standard),
    );

    // Initialize I2C
    let mut i2c_config = twim::Config::default();
    // Use I2C at 400KHz (the fastest clock available on the nRF52832)
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(p.TWISPI1, Irqs, p.P0_06, p.P0_07, i2c_config);
    let i2c_bus = I2C_BUS.init(Mutex::new(RefCell::new(i2c)));

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26.degrade(), Level::Low, OutputDrive::Standard),
    ));

    // Initialize touch controller
    let touch = TouchController::init(
        I2cDevice::new(i2c_bus),
        // Touchpad external interrupt pin: P0.28/AIN4 (TP_INT)
        Input::new(p.P0_28.degrade(), Pull::Up),
        // Touchpad reset pin: P0.10/NFC2 (TP_RESET)
        Output::new(p.P0_10.degrade(), Level::High, OutputDrive::Standard),
    );

    // Initialize Bluetooth
    let sd = Softdevice::enable(&bluetooth::generate_config());
    let server = unwrap!(Server::new(sd));
    let sd: &'static Softdevice = sd;

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(bluetooth::softdevice_task(sd)));
    unwrap!(spawner.spawn(bluetooth::gatt_task(sd, server)));
    unwrap!(spawner.spawn(poll_button(button)));
    unwrap!(spawner.spawn(poll_touch(touch)));
    unwrap!(spawner.spawn(run_face(display, backlight)));
}
