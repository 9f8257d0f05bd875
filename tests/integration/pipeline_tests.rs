//! Whole firmware on the host: every task launched through the scheduler,
//! alerts delivered over loopback TCP to a local collector.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use proxalert::adapters::hardware::HardwareAdapter;
use proxalert::adapters::link::LinkStatus;
use proxalert::adapters::tcp::TcpConnector;
use proxalert::app::evaluator::ThresholdEvaluator;
use proxalert::app::notifier::NotificationClient;
use proxalert::app::ports::Indicator;
use proxalert::config::MonitorConfig;
use proxalert::drivers::heartbeat::Heartbeat;
use proxalert::drivers::hw_init::{self, GpioOut};
use proxalert::drivers::indicators::IndicatorLeds;
use proxalert::mailbox::Mailbox;
use proxalert::pins;
use proxalert::scheduler::{self, Tasks};
use proxalert::sensors::ReadingStore;
use proxalert::sensors::light::LightSampler;
use proxalert::sensors::ranging::{EchoCapture, RangingDriver};

use crate::collector::{self, Collector, Reply};
use crate::mock_hw::{Echo, FixedAdc, MockLink, RecordingIndicators, ScriptedTrigger};

/// Short periods so the tests see several evaluation rounds quickly.
fn brisk_config() -> MonitorConfig {
    MonitorConfig {
        sample_period_ms: 10,
        evaluate_period_ms: 10,
        alert_cooldown_ms: 100,
        console_period_ms: 100,
        ranging_timeout_ms: 50,
        connect_fail_flash_ms: 20,
        io_fail_flash_ms: 20,
        transport_timeout_ms: 1000,
        ..MonitorConfig::default()
    }
}

fn wait_until(within: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// The only test in this binary that drives the simulated board pins.
#[test]
fn simulated_board_reports_dark_close_object_then_goes_quiet_in_light() {
    let collector = Collector::spawn(Reply::Ok);
    let config = brisk_config();

    // 2234 codes ≈ 1.80 V; 2030 µs echo = 35 cm.
    hw_init::sim_set_ldr_adc(2234);
    hw_init::sim_set_echo_us(2030);
    hw_init::init_peripherals().unwrap();

    let store = Arc::new(ReadingStore::new());
    let mailbox = Arc::new(Mailbox::new());
    let capture = Arc::new(EchoCapture::new());
    hw_init::install_echo_isr(&capture).unwrap();

    let link = Arc::new(LinkStatus::new());
    link.set_up(true);

    let leds = IndicatorLeds::new()
        .with(Indicator::Proximity, GpioOut(pins::LED_PROXIMITY_GPIO))
        .with(Indicator::Warning, GpioOut(pins::LED_WARNING_GPIO))
        .with(Indicator::Error, GpioOut(pins::LED_ERROR_GPIO));
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
            TcpConnector::new(&collector.endpoint, config.transport_timeout()),
            Arc::clone(&link),
            error_led,
            mailbox,
            &collector.endpoint,
            &config,
        ),
        heartbeat: Heartbeat::new(GpioOut(pins::STATUS_LED_GPIO), Arc::clone(&link)),
        store: Arc::clone(&store),
        config,
    };
    let handles = scheduler::launch(tasks).unwrap();
    assert_eq!(handles.len(), scheduler::ALL.len());

    let request = collector
        .next_request(Duration::from_secs(5))
        .expect("alert delivered");
    let (head, body) = collector::split_request(&request);
    assert!(head.starts_with("POST / HTTP/1.1\r\n"));
    assert_eq!(body, r#"{"Info": "Voltage 1.80 --- Distance 035.00"}"#);
    assert!(hw_init::sim_gpio_level(pins::LED_PROXIMITY_GPIO));
    assert!(hw_init::sim_gpio_level(pins::LED_WARNING_GPIO));
    assert!(!hw_init::sim_gpio_level(pins::LED_ERROR_GPIO));

    // Lights on: proximity stays, warning and alerts stop.
    hw_init::sim_set_ldr_adc(4095);
    assert!(wait_until(Duration::from_secs(2), || {
        !hw_init::sim_gpio_level(pins::LED_WARNING_GPIO)
    }));
    thread::sleep(Duration::from_millis(300));
    while collector.next_request(Duration::from_millis(10)).is_some() {}

    assert!(collector.next_request(Duration::from_millis(500)).is_none());
    assert!(hw_init::sim_gpio_level(pins::LED_PROXIMITY_GPIO));
    let reading = store.snapshot();
    assert_eq!(reading.distance, 35.0);
    assert!((reading.illuminance - 3.2992).abs() < 1e-3);
}

#[test]
fn close_object_in_bright_light_never_reaches_the_collector() {
    let collector = Collector::spawn(Reply::Ok);
    let config = brisk_config();
    let store = Arc::new(ReadingStore::new());
    let mailbox = Arc::new(Mailbox::new());
    let capture = Arc::new(EchoCapture::new());
    let leds = RecordingIndicators::new();
    let link = MockLink::up();

    let tasks = Tasks {
        ranging: RangingDriver::new(
            ScriptedTrigger::new(Arc::clone(&capture), Echo::Inline { width_us: 1_740 }),
            capture,
            Arc::clone(&store),
            &config,
        ),
        // ≈ 2.42 V, above the light threshold.
        light: LightSampler::new(FixedAdc(3000), Arc::clone(&store), &config),
        evaluator: ThresholdEvaluator::new(
            leds.clone(),
            Arc::clone(&store),
            Arc::clone(&mailbox),
            &config,
        ),
        notifier: NotificationClient::new(
            TcpConnector::new(&collector.endpoint, config.transport_timeout()),
            link.clone(),
            RecordingIndicators::new(),
            mailbox,
            &collector.endpoint,
            &config,
        ),
        heartbeat: Heartbeat::new(GpioOut(43), link),
        store: Arc::clone(&store),
        config,
    };
    scheduler::launch(tasks).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        leds.is_on(Indicator::Proximity)
    }));
    assert_eq!(store.snapshot().distance, 30.0);
    assert!(collector.next_request(Duration::from_millis(500)).is_none());
    assert!(!leds.is_on(Indicator::Warning));
}

#[test]
fn alerts_raised_while_the_link_is_down_are_discarded() {
    let collector = Collector::spawn(Reply::Ok);
    let config = brisk_config();
    let store = Arc::new(ReadingStore::new());
    let mailbox = Arc::new(Mailbox::new());
    let capture = Arc::new(EchoCapture::new());
    let leds = RecordingIndicators::new();
    let error_led = RecordingIndicators::new();
    let link = MockLink::down();

    let tasks = Tasks {
        ranging: RangingDriver::new(
            ScriptedTrigger::new(Arc::clone(&capture), Echo::Inline { width_us: 1_160 }),
            capture,
            Arc::clone(&store),
            &config,
        ),
        // ≈ 0.81 V: dark.
        light: LightSampler::new(FixedAdc(1000), Arc::clone(&store), &config),
        evaluator: ThresholdEvaluator::new(
            leds.clone(),
            Arc::clone(&store),
            Arc::clone(&mailbox),
            &config,
        ),
        notifier: NotificationClient::new(
            TcpConnector::new(&collector.endpoint, config.transport_timeout()),
            link.clone(),
            error_led.clone(),
            Arc::clone(&mailbox),
            &collector.endpoint,
            &config,
        ),
        heartbeat: Heartbeat::new(GpioOut(44), link.clone()),
        store: Arc::clone(&store),
        config,
    };
    scheduler::launch(tasks).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        leds.is_on(Indicator::Warning)
    }));
    assert!(collector.next_request(Duration::from_millis(400)).is_none());
    assert!(error_led.history().is_empty());

    // Once the link is back, the next alert goes out.
    link.set(true);
    let request = collector
        .next_request(Duration::from_secs(3))
        .expect("alert delivered after link came up");
    let (_, body) = collector::split_request(&request);
    assert_eq!(body, r#"{"Info": "Voltage 0.81 --- Distance 020.00"}"#);
}
