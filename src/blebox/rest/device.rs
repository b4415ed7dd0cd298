use serde::Deserialize;

use crate::{
    blebox::error::DeviceError,
    protocols::http::{mk_get_request, DeviceEndpoint, HttpClient},
};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_name: String,
    #[serde(rename = "type")]
    pub device_type: String,
}

#[derive(Deserialize, Debug, Clone)]
struct DeviceStateResponse {
    device: DeviceInfo,
}

pub async fn get_device_info(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
) -> Result<DeviceInfo, DeviceError> {
    let response: DeviceStateResponse =
        mk_get_request(client, endpoint, "/api/device/state").await?;

    Ok(response.device)
}
