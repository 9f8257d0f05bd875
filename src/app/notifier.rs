//! Notification client: delivers alerts to the remote collector.
//!
//! One request in flight at a time: take the latest alert from the
//! [`Mailbox`], POST it, wait for any response (or the peer closing), and
//! close.  Failures flash the error indicator and drop the event; there is
//! no retry and no requeue, since a fresher alert will follow if the
//! condition persists.

use core::time::Duration;
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};

use crate::app::events::AlertEvent;
use crate::app::ports::{Connection, Connector, Indicator, IndicatorPort, LinkPort};
use crate::app::request::RequestTemplate;
use crate::config::{ApiEndpoint, MonitorConfig};
use crate::error::TransportError;
use crate::mailbox::Mailbox;

/// Response bytes are only waited for, never parsed.
const RESPONSE_PEEK: usize = 64;

/// Result of handling one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Request written and the collector answered or closed.
    Sent,
    /// No network link; nothing was attempted.
    SkippedLinkDown,
    /// The exchange failed and the event was dropped.
    Failed(TransportError),
}

pub struct NotificationClient<C, L, I> {
    connector: C,
    link: L,
    indicators: I,
    mailbox: Arc<Mailbox>,
    template: RequestTemplate,
    connect_fail_flash: Duration,
    io_fail_flash: Duration,
}

impl<C, L, I> NotificationClient<C, L, I>
where
    C: Connector,
    L: LinkPort,
    I: IndicatorPort,
{
    pub fn new(
        connector: C,
        link: L,
        indicators: I,
        mailbox: Arc<Mailbox>,
        endpoint: &ApiEndpoint,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            connector,
            link,
            indicators,
            mailbox,
            template: RequestTemplate::new(endpoint),
            connect_fail_flash: Duration::from_millis(u64::from(config.connect_fail_flash_ms)),
            io_fail_flash: Duration::from_millis(u64::from(config.io_fail_flash_ms)),
        }
    }

    /// Deliver one event.
    pub fn handle(&mut self, event: &AlertEvent) -> Delivery {
        if !self.link.is_link_up() {
            debug!("notify: link down, discarding alert");
            return Delivery::SkippedLinkDown;
        }

        let request = match self.template.compose(event.payload_bytes()) {
            Ok(r) => r,
            Err(e) => return self.fail(e, self.io_fail_flash),
        };

        let mut conn = match self.connector.connect() {
            Ok(c) => c,
            Err(e) => return self.fail(e, self.connect_fail_flash),
        };

        let exchanged = conn.send(&request).and_then(|()| {
            let mut buf = [0u8; RESPONSE_PEEK];
            conn.receive(&mut buf)
        });
        conn.close();

        match exchanged {
            Ok(n) => {
                info!("notify: alert delivered ({n} response bytes)");
                Delivery::Sent
            }
            Err(e) => self.fail(e, self.io_fail_flash),
        }
    }

    /// Block for the next alert and deliver it.
    pub fn serve_one(&mut self) -> Delivery {
        let event = self.mailbox.take_blocking();
        self.handle(&event)
    }

    /// Clear the bring-up error LED, then serve alerts forever.
    pub fn run(mut self) -> ! {
        self.indicators.clear(Indicator::Error);
        info!("notify: waiting for alerts");
        loop {
            self.serve_one();
        }
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    fn fail(&mut self, err: TransportError, flash: Duration) -> Delivery {
        warn!("notify: delivery failed: {err}");
        self.indicators.set(Indicator::Error, true);
        thread::sleep(flash);
        self.indicators.clear(Indicator::Error);
        Delivery::Failed(err)
    }
}
