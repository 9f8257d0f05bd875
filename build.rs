fn main() {
    println!("cargo:rerun-if-env-changed=PROXALERT_API_ADDR");
    println!("cargo:rerun-if-env-changed=PROXALERT_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=PROXALERT_WIFI_PSK");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
