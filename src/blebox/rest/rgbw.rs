use serde::{Deserialize, Serialize};

use crate::{
    blebox::error::DeviceError,
    protocols::http::{mk_get_request, mk_post_request, DeviceEndpoint, HttpClient},
};

use super::device::DeviceInfo;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RgbwData {
    pub color_mode: u8,
    pub desired_color: String,
    #[serde(rename = "effectID")]
    pub effect_id: usize,
}

/// `/api/device/state` as answered by a wLightBox, which carries the light
/// state next to the device metadata.
#[derive(Deserialize, Debug, Clone)]
pub struct LightStateResponse {
    pub device: DeviceInfo,
    pub rgbw: RgbwData,
}

#[derive(Deserialize, Debug, Clone)]
struct RgbwResponse {
    rgbw: RgbwData,
}

#[derive(Serialize, Debug, Clone)]
struct RgbwSetData<'a> {
    #[serde(rename = "desiredColor")]
    desired_color: &'a str,
    #[serde(rename = "effectID")]
    effect_id: usize,
}

#[derive(Serialize, Debug, Clone)]
struct RgbwRequest<'a> {
    rgbw: RgbwSetData<'a>,
}

pub async fn get_light_state(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
) -> Result<LightStateResponse, DeviceError> {
    mk_get_request(client, endpoint, "/api/device/state").await
}

pub async fn set_rgbw(
    client: &HttpClient,
    endpoint: &DeviceEndpoint,
    desired_color: &str,
    effect_id: usize,
) -> Result<RgbwData, DeviceError> {
    let body = RgbwRequest {
        rgbw: RgbwSetData {
            desired_color,
            effect_id,
        },
    };

    let response: RgbwResponse = mk_post_request(client, endpoint, "/api/rgbw/set", &body).await?;

    Ok(response.rgbw)
}
