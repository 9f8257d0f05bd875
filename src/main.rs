//! proxalert firmware: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                        │
//! │                                                                   │
//! │  HardwareAdapter     IndicatorLeds    TcpConnector   LinkStatus   │
//! │  (Analog+Trigger)    (IndicatorPort)  (Connector)    (LinkPort)   │
//! │                                                                   │
//! │  ─────────────────── Port Trait Boundary ──────────────────────   │
//! │                                                                   │
//! │  RangingDriver ─┐                                                 │
//! │  LightSampler ──┴▶ ReadingStore ─▶ ThresholdEvaluator             │
//! │                                         │                         │
//! │                                     Mailbox ─▶ NotificationClient │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bring-up order: peripherals, LED self-test (error LED left on), WiFi,
//! echo ISR, tasks.  The notifier task, spawned last, clears the error LED
//! when it starts; an error LED that stays on means the board never
//! finished starting.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use proxalert::adapters::hardware::HardwareAdapter;
use proxalert::adapters::link::LinkStatus;
use proxalert::adapters::tcp::TcpConnector;
use proxalert::adapters::wifi::{self, WifiCredentials};
use proxalert::app::evaluator::ThresholdEvaluator;
use proxalert::app::notifier::NotificationClient;
use proxalert::app::ports::{Indicator, IndicatorPort};
use proxalert::config::{self, SELF_TEST_BLINKS, SELF_TEST_BLINK_MS};
use proxalert::drivers::heartbeat::Heartbeat;
use proxalert::drivers::hw_init::{self, GpioOut};
use proxalert::drivers::indicators::{self, IndicatorLeds};
use proxalert::fault;
use proxalert::mailbox::Mailbox;
use proxalert::pins;
use proxalert::scheduler::{self, Tasks};
use proxalert::sensors::ReadingStore;
use proxalert::sensors::light::LightSampler;
use proxalert::sensors::ranging::{EchoCapture, RangingDriver};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("proxalert v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let (config, endpoint) = config::load()?;
    info!("config: {}", serde_json::to_string(&config)?);
    info!("collector: {endpoint}");

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {e}; halting");
        fault::halt();
    }
    fault::install_panic_handler();

    let mut leds = IndicatorLeds::new()
        .with(Indicator::Proximity, GpioOut(pins::LED_PROXIMITY_GPIO))
        .with(Indicator::Warning, GpioOut(pins::LED_WARNING_GPIO))
        .with(Indicator::Error, GpioOut(pins::LED_ERROR_GPIO));
    indicators::self_test(
        &mut leds,
        SELF_TEST_BLINKS,
        Duration::from_millis(u64::from(SELF_TEST_BLINK_MS)),
    );
    leds.set(Indicator::Error, true);

    // ── 4. WiFi ───────────────────────────────────────────────
    let link = Arc::new(LinkStatus::new());
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // Held for the life of the firmware; dropping it tears the link down.
    let _wifi = match WifiCredentials::from_build_env() {
        Ok(creds) => match wifi::connect(peripherals.modem, sysloop, nvs, &creds, &link) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("WiFi: bring-up failed ({e}); alerts will not be sent");
                None
            }
        },
        Err(e) => {
            warn!("WiFi: {e}; alerts will not be sent");
            None
        }
    };

    // ── 5. Shared state + echo ISR ────────────────────────────
    let store = Arc::new(ReadingStore::new());
    let mailbox = Arc::new(Mailbox::new());
    let capture = Arc::new(EchoCapture::new());
    hw_init::install_echo_isr(&capture)?;

    // ── 6. Tasks ──────────────────────────────────────────────
    let (error_led, evaluator_leds) = leds.split(&[Indicator::Error]);
    let hw = HardwareAdapter::new();

    let tasks = Tasks {
        ranging: RangingDriver::new(hw, capture, Arc::clone(&store), &config),
        light: LightSampler::new(hw, Arc::clone(&store), &config),
        evaluator: ThresholdEvaluator::new(
            evaluator_leds,
            Arc::clone(&store),
            Arc::clone(&mailbox),
            &config,
        ),
        notifier: NotificationClient::new(
            TcpConnector::new(&endpoint, config.transport_timeout()),
            Arc::clone(&link),
            error_led,
            mailbox,
            &endpoint,
            &config,
        ),
        heartbeat: Heartbeat::new(GpioOut(pins::STATUS_LED_GPIO), Arc::clone(&link)),
        store,
        config,
    };
    // The notifier is spawned last and clears the error LED as it starts.
    scheduler::launch(tasks)?;
    info!("System ready.");

    loop {
        std::thread::park();
    }
}
