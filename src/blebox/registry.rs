use std::{collections::BTreeMap, sync::Arc};

use log::{error, info};
use tokio::sync::Mutex;

use super::device::{setup_device, BleboxDevice};
use crate::{protocols::http::HttpClient, settings::Settings};

/// Every successfully set up device, keyed by id.
///
/// Each device sits behind its own lock so that polling and commands never
/// have two requests in flight against the same device.
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    devices: Arc<BTreeMap<String, Arc<Mutex<BleboxDevice>>>>,
}

impl DeviceRegistry {
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<BleboxDevice>>> {
        self.devices.get(id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<Mutex<BleboxDevice>>)> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Sets up every configured device. Devices that fail setup are logged and
/// left out.
pub async fn setup_devices(settings: &Settings, client: &HttpClient) -> DeviceRegistry {
    let mut devices = BTreeMap::new();

    for device_settings in &settings.devices {
        let id = device_settings.id();

        match setup_device(client, device_settings).await {
            Ok(device) => {
                info!("Registered {} as {}", device.name(), id);
                devices.insert(id, Arc::new(Mutex::new(device)));
            }
            Err(e) => error!("Not registering {}: {}", id, e),
        }
    }

    DeviceRegistry {
        devices: Arc::new(devices),
    }
}
