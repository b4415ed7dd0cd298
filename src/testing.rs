//! A fake blebox device served over real HTTP on localhost, used by the
//! adapter tests.

use std::{
    collections::HashSet,
    convert::Infallible,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    time::Duration,
};

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use serde_json::{json, Value};

use crate::protocols::http::DeviceEndpoint;

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Debug)]
struct MockState {
    device_type: String,
    device_name: String,
    brightness: u8,
    color_mode: u8,
    desired_color: String,
    effect_id: u64,
    relays: Vec<(String, u8)>,
    failing: HashSet<String>,
    offline: bool,
    stall: Option<Duration>,
    requests: Vec<Recorded>,
}

impl MockState {
    fn new(device_type: &str, device_name: &str) -> Self {
        Self {
            device_type: device_type.to_string(),
            device_name: device_name.to_string(),
            brightness: 0,
            color_mode: 1,
            desired_color: "00000000".to_string(),
            effect_id: 0,
            relays: vec![],
            failing: HashSet::new(),
            offline: false,
            stall: None,
            requests: vec![],
        }
    }

    fn relay_json(&self) -> Vec<Value> {
        self.relays
            .iter()
            .enumerate()
            .map(|(relay, (name, state))| json!({ "relay": relay, "state": state, "name": name }))
            .collect()
    }

    fn relay_state(&self) -> Value {
        if self.device_type == "switchBox" {
            let relays = self
                .relays
                .iter()
                .enumerate()
                .map(|(relay, (_, state))| json!({ "relay": relay, "state": state }))
                .collect();
            Value::Array(relays)
        } else {
            json!({ "relays": self.relay_json() })
        }
    }

    fn rgbw(&self) -> Value {
        json!({
            "colorMode": self.color_mode,
            "desiredColor": self.desired_color,
            "currentColor": self.desired_color,
            "effectID": self.effect_id,
        })
    }

    fn apply_relays(&mut self, changes: &Value) {
        for change in changes.as_array().into_iter().flatten() {
            let relay = change["relay"].as_u64().unwrap_or(0) as usize;
            let state = change["state"].as_u64().unwrap_or(0) as u8;
            if let Some(entry) = self.relays.get_mut(relay) {
                entry.1 = state;
            }
        }
    }

    fn respond(&mut self, method: &Method, path: &str, body: &Value) -> (StatusCode, Value) {
        if self.offline || self.failing.contains(path) {
            return (StatusCode::SERVICE_UNAVAILABLE, json!({}));
        }

        match (method.as_str(), path) {
            ("GET", "/api/device/state") => {
                let mut state = json!({
                    "device": {
                        "deviceName": self.device_name,
                        "type": self.device_type,
                        "apiLevel": "20180604",
                    }
                });
                if self.device_type == "wLightBox" {
                    state["rgbw"] = self.rgbw();
                }
                (StatusCode::OK, state)
            }
            ("GET", "/api/dimmer/state") => (StatusCode::OK, self.dimmer()),
            ("POST", "/api/dimmer/set") => {
                self.brightness = body["dimmer"]["desiredBrightness"].as_u64().unwrap_or(0) as u8;
                (StatusCode::OK, self.dimmer())
            }
            ("POST", "/api/rgbw/set") => {
                if let Some(color) = body["rgbw"]["desiredColor"].as_str() {
                    self.desired_color = color.to_string();
                }
                if let Some(effect_id) = body["rgbw"]["effectID"].as_u64() {
                    self.effect_id = effect_id;
                }
                (StatusCode::OK, json!({ "rgbw": self.rgbw() }))
            }
            ("GET", "/api/relay/state") => (StatusCode::OK, self.relay_state()),
            ("POST", "/api/relay/set") => {
                if body.is_array() {
                    self.apply_relays(body);
                } else {
                    self.apply_relays(&body["relays"]);
                }
                (StatusCode::OK, self.relay_state())
            }
            _ => (StatusCode::NOT_FOUND, json!({})),
        }
    }

    fn dimmer(&self) -> Value {
        json!({
            "dimmer": {
                "loadType": 2,
                "currentBrightness": self.brightness,
                "desiredBrightness": self.brightness,
                "overloaded": false,
                "overheated": false,
            }
        })
    }
}

pub struct MockBlebox {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockBlebox {
    async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let service_state = state.clone();
        let make_svc = make_service_fn(move |_conn| {
            let state = service_state.clone();
            async move { Ok::<_, Infallible>(service_fn(move |req| handle(state.clone(), req))) }
        });

        let server = Server::from_tcp(listener).unwrap().serve(make_svc);
        tokio::spawn(server);

        Self { addr, state }
    }

    pub async fn with_type(device_type: &str, name: &str) -> Self {
        Self::start(MockState::new(device_type, name)).await
    }

    pub async fn dimmer_box(name: &str, brightness: u8) -> Self {
        let mut state = MockState::new("dimmerBox", name);
        state.brightness = brightness;
        Self::start(state).await
    }

    pub async fn wlight_box(name: &str, color_mode: u8, color: &str, effect_id: u64) -> Self {
        let mut state = MockState::new("wLightBox", name);
        state.color_mode = color_mode;
        state.desired_color = color.to_string();
        state.effect_id = effect_id;
        Self::start(state).await
    }

    pub async fn switch_box(name: &str, on: bool) -> Self {
        let mut state = MockState::new("switchBox", name);
        state.relays = vec![(name.to_string(), on as u8)];
        Self::start(state).await
    }

    pub async fn switch_box_d(name: &str, relays: &[(&str, bool)]) -> Self {
        let mut state = MockState::new("switchBoxD", name);
        state.relays = relays
            .iter()
            .map(|(name, on)| (name.to_string(), *on as u8))
            .collect();
        Self::start(state).await
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.host(), Duration::from_secs(2))
    }

    pub fn stall(&self, duration: Duration) {
        self.state.lock().unwrap().stall = Some(duration);
    }

    pub fn fail(&self, path: &str) {
        self.state.lock().unwrap().failing.insert(path.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn set_color(&self, color: &str, effect_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.desired_color = color.to_string();
        state.effect_id = effect_id;
    }

    pub fn set_color_mode(&self, color_mode: u8) {
        self.state.lock().unwrap().color_mode = color_mode;
    }

    pub fn brightness(&self) -> u8 {
        self.state.lock().unwrap().brightness
    }

    pub fn relay(&self, index: usize) -> u8 {
        self.state.lock().unwrap().relays[index].1
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last_post(&self, path: &str) -> Option<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.path == path)
            .last()
            .map(|r| r.body)
    }
}

async fn handle(
    state: Arc<Mutex<MockState>>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let body_bytes = hyper::body::to_bytes(req.into_body())
        .await
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    let stall = {
        let mut state = state.lock().unwrap();
        state.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            body: body.clone(),
        });
        state.stall
    };

    if let Some(stall) = stall {
        tokio::time::sleep(stall).await;
    }

    let (status, body) = state.lock().unwrap().respond(&method, &path, &body);

    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap())
}

/// A localhost address nothing listens on.
pub fn unused_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}
