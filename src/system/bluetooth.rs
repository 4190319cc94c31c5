//! Bluetooth module
//!
//! GATT server through which the phone replicates the weather document and
//! sets the clock.

// Core
use core::mem;

// BLE
use nrf_softdevice::{
    self,
    ble::{
        advertisement_builder::{
            Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
            ServiceUuid16,
        },
        gatt_server, peripheral, Connection,
    },
    raw, Config, Softdevice,
};

use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use embassy_time::Instant;
use heapless::Vec;

use sunshine_face::{
    sync::codec::MAX_DOCUMENT_SIZE,
    time::{utc_offset_from_lti, TimeReference},
};

/// Encoded weather document written by the phone.
pub type DocumentBytes = Vec<u8, MAX_DOCUMENT_SIZE>;

/// Length of a Current Time Service value.
const CTS_LEN: usize = 10;

/// Length of a Local Time Information value.
const LTI_LEN: usize = 2;

pub static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::CURRENT_TIME])
    .full_name("Sunshine")
    .build();

pub static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::CURRENT_TIME])
    .build();

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub sunshine: SunshineService,
    pub cts: CurrentTimeService,
}

/// Weather document at `/sunshine`, in the sync codec's wire format.
#[nrf_softdevice::gatt_service(uuid = "8e2b0001-5d5c-4f38-9a65-2c1bbf6ad3e1")]
pub struct SunshineService {
    #[characteristic(uuid = "8e2b0002-5d5c-4f38-9a65-2c1bbf6ad3e1", read, write)]
    pub document: DocumentBytes,
}

#[nrf_softdevice::gatt_service(uuid = "1805")]
pub struct CurrentTimeService {
    #[characteristic(uuid = "2a2b", read, write)]
    pub current_time: [u8; CTS_LEN],
    #[characteristic(uuid = "2a0f", read, write)]
    pub local_time_info: [u8; LTI_LEN],
}

pub fn generate_config() -> Config {
    Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 256 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        // S113 is peripheral only
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: b"Sunshine" as *const u8 as _,
            current_len: 8,
            max_len: 8,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Documents received from the phone
pub static DOCUMENT: Signal<ThreadModeRawMutex, DocumentBytes> = Signal::new();

/// Clock updates received from the phone
pub static TIME_SET: Signal<ThreadModeRawMutex, TimeReference> = Signal::new();

/// UTC offset updates received from the phone, in seconds
pub static TIME_ZONE_SET: Signal<ThreadModeRawMutex, i32> = Signal::new();

/// Run the SoftDevice event loop
#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Advertise, then serve one connection at a time
#[embassy_executor::task]
pub async fn gatt_task(sd: &'static Softdevice, server: Server) {
    loop {
        let config = peripheral::Config::default();
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                defmt::warn!("Advertising failed: {:?}", e);
                continue;
            }
        };
        defmt::info!("Phone connected");

        let reason = serve(&conn, &server).await;
        defmt::info!("Phone disconnected: {:?}", reason);
    }
}

async fn serve(conn: &Connection, server: &Server) -> gatt_server::DisconnectedError {
    gatt_server::run(conn, server, |e| match e {
        ServerEvent::Sunshine(SunshineServiceEvent::DocumentWrite(bytes)) => {
            defmt::debug!("Document written ({} bytes)", bytes.len());
            DOCUMENT.signal(bytes);
        }
        ServerEvent::Cts(CurrentTimeServiceEvent::CurrentTimeWrite(bytes)) => {
            let uptime_ms = Instant::now().as_millis();
            match TimeReference::from_cts_bytes(&bytes, uptime_ms) {
                Some(reference) => TIME_SET.signal(reference),
                None => defmt::warn!("Invalid current time written"),
            }
        }
        ServerEvent::Cts(CurrentTimeServiceEvent::LocalTimeInfoWrite(bytes)) => {
            match utc_offset_from_lti(&bytes) {
                Some(offset) => TIME_ZONE_SET.signal(offset),
                None => defmt::warn!("Invalid local time information written"),
            }
        }
    })
    .await
}
