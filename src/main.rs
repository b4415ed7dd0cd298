use blebox::polling::start_device_poll_loops;
use blebox::registry::setup_devices;
use color_eyre::Result;
use log::{info, warn};
use mqtt::events::start_mqtt_events_loop;
use protocols::http::mk_http_client;
use protocols::mqtt::mk_mqtt_client;

use crate::settings::read_settings;

mod blebox;
mod mqtt;
mod protocols;
mod settings;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let settings = read_settings()?;
    let http_client = mk_http_client();
    let mqtt_client = mk_mqtt_client(&settings)?;

    let registry = setup_devices(&settings, &http_client).await;
    if registry.is_empty() {
        warn!("No devices registered");
    } else {
        info!("Bridging {} device(s)", registry.len());
    }

    start_device_poll_loops(&settings, &registry, &mqtt_client);
    start_mqtt_events_loop(&mqtt_client, &settings, &registry);

    tokio::signal::ctrl_c().await?;

    Ok(())
}
