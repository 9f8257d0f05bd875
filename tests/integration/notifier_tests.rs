//! Notification client against scripted connections and a loopback
//! collector.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use proxalert::adapters::tcp::TcpConnector;
use proxalert::app::events::AlertEvent;
use proxalert::app::notifier::{Delivery, NotificationClient};
use proxalert::app::ports::{Connector, Indicator, LinkPort};
use proxalert::config::{ApiEndpoint, MonitorConfig};
use proxalert::error::TransportError;
use proxalert::mailbox::Mailbox;

use crate::collector::{self, Collector, Reply};
use crate::mock_hw::{MockConnector, MockLink, RecordingIndicators, Script};

fn fast_config() -> MonitorConfig {
    MonitorConfig {
        connect_fail_flash_ms: 30,
        io_fail_flash_ms: 10,
        transport_timeout_ms: 300,
        ..MonitorConfig::default()
    }
}

fn endpoint() -> ApiEndpoint {
    ApiEndpoint::parse("192.168.1.100:8080").unwrap()
}

fn client<C: Connector, L: LinkPort>(
    connector: C,
    link: L,
    endpoint: &ApiEndpoint,
) -> (NotificationClient<C, L, RecordingIndicators>, RecordingIndicators) {
    let leds = RecordingIndicators::new();
    let client = NotificationClient::new(
        connector,
        link,
        leds.clone(),
        Arc::new(Mailbox::new()),
        endpoint,
        &fast_config(),
    );
    (client, leds)
}

fn alert() -> AlertEvent {
    AlertEvent::new(1.8, 35.0).unwrap()
}

// ── Scripted connections ──────────────────────────────────────

#[test]
fn link_down_skips_without_connecting_or_flashing() {
    let connector = MockConnector::default();
    let (mut c, leds) = client(connector.clone(), MockLink::down(), &endpoint());

    assert_eq!(c.handle(&alert()), Delivery::SkippedLinkDown);
    assert_eq!(connector.attempts(), 0);
    assert!(leds.history().is_empty());
}

#[test]
fn successful_exchange_closes_and_leaves_error_off() {
    let connector = MockConnector::with_scripts([Script::Respond(12)]);
    let (mut c, leds) = client(connector.clone(), MockLink::up(), &endpoint());

    assert_eq!(c.handle(&alert()), Delivery::Sent);
    assert_eq!(connector.closed(), 1);
    assert!(leds.history().is_empty());

    let sent = connector.sent();
    assert_eq!(sent.len(), 1);
    let text = String::from_utf8(sent[0].clone()).unwrap();
    assert!(text.starts_with("POST / HTTP/1.1\r\nContent-Length: 44\r\n"));
    assert!(text.contains("Host: 192.168.1.100:8080\r\n"));
    assert!(text.ends_with(r#"{"Info": "Voltage 1.80 --- Distance 035.00"}"#));
}

#[test]
fn peer_closing_without_a_response_still_counts_as_sent() {
    let connector = MockConnector::with_scripts([Script::PeerCloses]);
    let (mut c, leds) = client(connector.clone(), MockLink::up(), &endpoint());

    assert_eq!(c.handle(&alert()), Delivery::Sent);
    assert!(leds.history().is_empty());
}

#[test]
fn refused_connection_flashes_error_for_the_connect_interval() {
    let connector = MockConnector::with_scripts([Script::Refuse]);
    let (mut c, leds) = client(connector.clone(), MockLink::up(), &endpoint());

    let started = Instant::now();
    let outcome = c.handle(&alert());

    assert_eq!(outcome, Delivery::Failed(TransportError::Refused));
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(leds.history_of(Indicator::Error), vec![true, false]);
    assert_eq!(connector.closed(), 0);
}

#[test]
fn send_and_receive_failures_flash_and_close() {
    for script in [
        Script::SendFails(TransportError::Closed),
        Script::ReceiveFails(TransportError::Reset),
        Script::ReceiveFails(TransportError::TimedOut),
    ] {
        let connector = MockConnector::with_scripts([script]);
        let (mut c, leds) = client(connector.clone(), MockLink::up(), &endpoint());

        assert!(matches!(c.handle(&alert()), Delivery::Failed(_)), "{script:?}");
        assert_eq!(connector.closed(), 1, "{script:?}");
        assert_eq!(leds.history_of(Indicator::Error), vec![true, false]);
    }
}

#[test]
fn failure_then_success_leaves_error_indicator_off() {
    let connector = MockConnector::with_scripts([Script::Refuse, Script::Respond(4)]);
    let (mut c, leds) = client(connector.clone(), MockLink::up(), &endpoint());

    assert!(matches!(c.handle(&alert()), Delivery::Failed(_)));
    assert_eq!(c.handle(&alert()), Delivery::Sent);
    assert!(!leds.is_on(Indicator::Error));
    assert_eq!(connector.attempts(), 2);
}

#[test]
fn link_coming_up_enables_delivery() {
    let link = MockLink::down();
    let connector = MockConnector::default();
    let (mut c, _) = client(connector.clone(), link.clone(), &endpoint());

    assert_eq!(c.handle(&alert()), Delivery::SkippedLinkDown);
    link.set(true);
    assert_eq!(c.handle(&alert()), Delivery::Sent);
    assert_eq!(connector.attempts(), 1);
}

#[test]
fn serve_one_blocks_until_an_alert_is_published() {
    let mailbox = Arc::new(Mailbox::new());
    let connector = MockConnector::default();
    let mut c = NotificationClient::new(
        connector.clone(),
        MockLink::up(),
        RecordingIndicators::new(),
        Arc::clone(&mailbox),
        &endpoint(),
        &fast_config(),
    );

    let publisher = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        mailbox.publish(AlertEvent::new(0.5, 12.0).unwrap());
    });

    assert_eq!(c.serve_one(), Delivery::Sent);
    publisher.join().unwrap();
    let body = String::from_utf8(connector.sent()[0].clone()).unwrap();
    assert!(body.ends_with(r#"{"Info": "Voltage 0.50 --- Distance 012.00"}"#));
}

#[test]
fn failed_delivery_then_next_published_alert_goes_out() {
    let mailbox = Arc::new(Mailbox::new());
    let connector = MockConnector::with_scripts([Script::Refuse]);
    let leds = RecordingIndicators::new();
    let mut c = NotificationClient::new(
        connector.clone(),
        MockLink::up(),
        leds.clone(),
        Arc::clone(&mailbox),
        &endpoint(),
        &fast_config(),
    );

    mailbox.publish(alert());
    assert_eq!(c.serve_one(), Delivery::Failed(TransportError::Refused));
    assert!(connector.sent().is_empty());

    let publisher = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        mailbox.publish(AlertEvent::new(0.5, 12.0).unwrap());
    });

    let started = Instant::now();
    assert_eq!(c.serve_one(), Delivery::Sent);
    assert!(started.elapsed() >= Duration::from_millis(20));
    publisher.join().unwrap();

    assert_eq!(connector.attempts(), 2);
    let sent = connector.sent();
    assert_eq!(sent.len(), 1);
    let body = String::from_utf8(sent[0].clone()).unwrap();
    assert!(body.ends_with(r#"{"Info": "Voltage 0.50 --- Distance 012.00"}"#));
    assert_eq!(leds.history_of(Indicator::Error), vec![true, false]);
}

#[test]
fn run_clears_the_bring_up_error_led_before_serving() {
    let mailbox = Arc::new(Mailbox::new());
    let connector = MockConnector::default();
    let leds = RecordingIndicators::new();
    let c = NotificationClient::new(
        connector.clone(),
        MockLink::up(),
        leds.clone(),
        Arc::clone(&mailbox),
        &endpoint(),
        &fast_config(),
    );

    // Detached: `run` never returns.
    let serve: Box<dyn FnOnce() + Send> = Box::new(move || c.run());
    thread::spawn(serve);

    let deadline = Instant::now() + Duration::from_secs(2);
    while leds.history_of(Indicator::Error).is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(leds.history_of(Indicator::Error), vec![false]);

    mailbox.publish(alert());
    let deadline = Instant::now() + Duration::from_secs(2);
    while connector.sent().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(connector.sent().len(), 1);
    assert_eq!(leds.history_of(Indicator::Error), vec![false]);
}

// ── Loopback TCP ──────────────────────────────────────────────

#[test]
fn tcp_request_reaches_collector_framed_exactly() {
    let collector = Collector::spawn(Reply::Ok);
    let ep = collector.endpoint;
    let connector = TcpConnector::new(&ep, Duration::from_secs(2));
    let (mut c, leds) = client(connector, MockLink::up(), &ep);

    assert_eq!(c.handle(&alert()), Delivery::Sent);
    assert!(leds.history().is_empty());

    let request = collector
        .next_request(Duration::from_secs(2))
        .expect("collector saw a request");
    let body = r#"{"Info": "Voltage 1.80 --- Distance 035.00"}"#;
    let expected = format!(
        "POST / HTTP/1.1\r\n\
         Content-Length: {}\r\n\
         Host: {ep}\r\n\
         Accept: application/json\r\n\
         Content-Type: application/json\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    );
    assert_eq!(request, expected);

    let (_, received_body) = collector::split_request(&request);
    let json: serde_json::Value = serde_json::from_str(received_body).unwrap();
    assert_eq!(json["Info"], "Voltage 1.80 --- Distance 035.00");
}

#[test]
fn tcp_collector_hanging_up_is_not_an_error() {
    let collector = Collector::spawn(Reply::Hangup);
    let ep = collector.endpoint;
    let connector = TcpConnector::new(&ep, Duration::from_secs(2));
    let (mut c, _) = client(connector, MockLink::up(), &ep);

    assert_eq!(c.handle(&alert()), Delivery::Sent);
    assert!(collector.next_request(Duration::from_secs(2)).is_some());
}

#[test]
fn tcp_nothing_listening_is_refused() {
    let ep = collector::closed_endpoint();
    let connector = TcpConnector::new(&ep, Duration::from_secs(2));
    let (mut c, leds) = client(connector, MockLink::up(), &ep);

    assert_eq!(
        c.handle(&alert()),
        Delivery::Failed(TransportError::Refused)
    );
    assert_eq!(leds.history_of(Indicator::Error), vec![true, false]);
}

#[test]
fn tcp_silent_collector_times_out() {
    let collector = Collector::spawn(Reply::Stall);
    let ep = collector.endpoint;
    let connector = TcpConnector::new(&ep, Duration::from_millis(200));
    let (mut c, leds) = client(connector, MockLink::up(), &ep);

    let started = Instant::now();
    assert_eq!(
        c.handle(&alert()),
        Delivery::Failed(TransportError::TimedOut)
    );
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(leds.history_of(Indicator::Error), vec![true, false]);
}
