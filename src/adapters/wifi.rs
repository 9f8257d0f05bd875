//! WiFi station bring-up.
//!
//! Credentials are baked in at build time (`PROXALERT_WIFI_SSID`,
//! `PROXALERT_WIFI_PSK`) and validated before the radio is touched.
//! Association is attempted once at boot; the outcome is published through
//! [`LinkStatus`] and a failure is not fatal, since the monitor keeps
//! working locally and only notifications are skipped.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: the host network is assumed up.

use core::fmt;

use log::info;

use super::link::LinkStatus;
use crate::error::ConfigError;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

// Never print the passphrase.
impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConfigError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConfigError::InvalidCredentials(
            "SSID must be 1-32 printable ASCII bytes",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConfigError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConfigError::InvalidCredentials(
            "password must be 8-64 bytes, or empty for open networks",
        ));
    }
    Ok(())
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let invalid = |_| ConfigError::InvalidCredentials("credential too long");
        Ok(Self {
            ssid: heapless::String::try_from(ssid).map_err(invalid)?,
            password: heapless::String::try_from(password).map_err(invalid)?,
        })
    }

    /// Credentials compiled into the firmware.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let ssid = option_env!("PROXALERT_WIFI_SSID")
            .ok_or(ConfigError::InvalidCredentials("PROXALERT_WIFI_SSID not set at build time"))?;
        Self::new(ssid, option_env!("PROXALERT_WIFI_PSK").unwrap_or(""))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Bring-up
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub type WifiHandle = esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>;

/// Associate and wait for an IP.  The returned handle must be kept alive
/// for the link to stay up.
#[cfg(target_os = "espidf")]
pub fn connect(
    modem: esp_idf_svc::hal::modem::Modem,
    sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
    creds: &WifiCredentials,
    link: &LinkStatus,
) -> anyhow::Result<WifiHandle> {
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    let auth_method = if creds.is_open() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: creds
            .ssid()
            .try_into()
            .map_err(|()| anyhow::anyhow!("SSID too long"))?,
        password: creds
            .password()
            .try_into()
            .map_err(|()| anyhow::anyhow!("password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    info!("WiFi: connecting to '{}'", creds.ssid());
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;

    let ip = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi: up, ip {}", ip.ip);
    link.set_up(true);
    Ok(wifi)
}

/// Host builds use the host network stack directly.
#[cfg(not(target_os = "espidf"))]
pub fn connect(creds: &WifiCredentials, link: &LinkStatus) {
    info!("WiFi(sim): '{}' assumed associated", creds.ssid());
    link.set_up(true);
}
