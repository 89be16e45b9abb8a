use crate::api_interface::{
    CountRecord, CurrentCount, DetectionSettings, ModelInfo, PreviewFrame, Room, RoomCreate,
    RoomUpdate, SettingsUpdate, SystemStatus,
};
use crate::prelude::{RequestError, RequestResult, RoomSource};
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Extra attempts for GET/PUT after a transport failure.
    pub idempotent_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            timeout_ms: 3_000,
            idempotent_retries: 1,
        }
    }
}

/// Only GET and PUT are replayed after a transport failure.
pub fn is_retryable(method: &Method) -> bool {
    *method == Method::GET || *method == Method::PUT
}

/// Typed JSON client for the `/api` backend contract.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    idempotent_retries: u32,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> RequestResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            RequestError::Transport(format!("invalid base url {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RequestError::Transport(format!(
                "invalid base url {}",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            idempotent_retries: config.idempotent_retries,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Performs one request and decodes the JSON response.
    ///
    /// `204 No Content` yields `Ok(None)`. Non-success statuses become
    /// `RequestError::Status` with the body's `detail`/`error` message.
    pub async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> RequestResult<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(segments, query);
        let attempts = if is_retryable(&method) {
            self.idempotent_retries + 1
        } else {
            1
        };
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(method.clone(), url.clone(), body).await {
                Err(RequestError::Transport(reason)) if attempt < attempts => {
                    debug!("retrying {} {} after transport error: {}", method, url, reason);
                }
                outcome => return outcome,
            }
        }
    }

    async fn send_once<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> RequestResult<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RequestError::from_status(status.as_u16(), &text));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RequestError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> RequestResult<T> {
        let value = self
            .request::<T, ()>(Method::GET, segments, query, None)
            .await?;
        required(value)
    }

    async fn send<T, B>(&self, method: Method, segments: &[&str], body: &B) -> RequestResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.request(method, segments, &[], Some(body)).await?;
        required(value)
    }

    pub async fn list_rooms(&self) -> RequestResult<Vec<Room>> {
        self.get(&["api", "rooms"], &[]).await
    }

    pub async fn get_room(&self, room_id: &str) -> RequestResult<Room> {
        self.get(&["api", "rooms", room_id], &[]).await
    }

    pub async fn create_room(&self, room: &RoomCreate) -> RequestResult<Room> {
        self.send(Method::POST, &["api", "rooms"], room).await
    }

    pub async fn update_room(&self, room_id: &str, update: &RoomUpdate) -> RequestResult<Room> {
        self.send(Method::PUT, &["api", "rooms", room_id], update)
            .await
    }

    pub async fn delete_room(&self, room_id: &str) -> RequestResult<()> {
        self.request::<serde_json::Value, ()>(Method::DELETE, &["api", "rooms", room_id], &[], None)
            .await
            .map(|_| ())
    }

    pub async fn current_count(&self, room_id: &str) -> RequestResult<CurrentCount> {
        self.get(&["api", "rooms", room_id, "current"], &[]).await
    }

    pub async fn history(&self, room_id: &str, hours: u32) -> RequestResult<Vec<CountRecord>> {
        self.get(
            &["api", "rooms", room_id, "history"],
            &[("hours", hours.to_string())],
        )
        .await
    }

    pub async fn preview(&self, room_id: &str) -> RequestResult<PreviewFrame> {
        self.get(&["api", "rooms", room_id, "preview"], &[]).await
    }

    pub async fn get_settings(&self) -> RequestResult<DetectionSettings> {
        self.get(&["api", "settings"], &[]).await
    }

    pub async fn update_settings(&self, update: &SettingsUpdate) -> RequestResult<DetectionSettings> {
        self.send(Method::PUT, &["api", "settings"], update).await
    }

    pub async fn list_models(&self) -> RequestResult<Vec<ModelInfo>> {
        self.get(&["api", "models"], &[]).await
    }

    pub async fn system_status(&self) -> RequestResult<SystemStatus> {
        self.get(&["api", "status"], &[]).await
    }

    pub async fn health(&self) -> RequestResult<bool> {
        let health: HealthStatus = self.get(&["health"], &[]).await?;
        Ok(health.status == "ok")
    }
}

#[derive(Debug, Deserialize)]
struct HealthStatus {
    status: String,
}

fn required<T>(value: Option<T>) -> RequestResult<T> {
    value.ok_or_else(|| RequestError::Decode("expected a response body".into()))
}

impl RoomSource for ApiClient {
    async fn list_rooms(&self) -> RequestResult<Vec<Room>> {
        ApiClient::list_rooms(self).await
    }

    async fn get_room(&self, room_id: &str) -> RequestResult<Room> {
        ApiClient::get_room(self, room_id).await
    }

    async fn preview(&self, room_id: &str) -> RequestResult<PreviewFrame> {
        ApiClient::preview(self, room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::{SocketAddr, TcpListener};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use warp::http::StatusCode as WarpStatus;
    use warp::Filter;

    fn client_for(addr: SocketAddr) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: format!("http://{}", addr),
            timeout_ms: 2_000,
            idempotent_retries: 0,
        })
        .unwrap()
    }

    fn hall() -> serde_json::Value {
        json!({
            "id": "hall-1",
            "name": "Main Hall",
            "capacity": 300,
            "camera_url": "rtsp://hall",
            "is_active": true,
            "count": 120,
            "raw_count": 123,
            "occupancy_percent": 40.0,
            "status": "medium",
            "last_updated": "2025-03-01T10:00:00"
        })
    }

    #[tokio::test]
    async fn list_rooms_decodes_collection() {
        let routes = warp::path!("api" / "rooms")
            .and(warp::get())
            .map(|| warp::reply::json(&json!([hall()])));
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let rooms = client_for(addr).list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, "hall-1");
        assert_eq!(rooms[0].count, 120);
    }

    #[tokio::test]
    async fn requests_carry_json_content_type() {
        let routes = warp::path!("api" / "settings")
            .and(warp::put())
            .and(warp::header::exact("content-type", "application/json"))
            .and(warp::body::json())
            .map(|update: SettingsUpdate| {
                let settings = DetectionSettings::default().merged(&update).unwrap();
                warp::reply::json(&settings)
            });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let update = SettingsUpdate {
            imgsz: Some(640),
            ..Default::default()
        };
        let settings = client_for(addr).update_settings(&update).await.unwrap();
        assert_eq!(settings.imgsz, 640);
    }

    #[tokio::test]
    async fn no_content_is_not_an_error() {
        let routes = warp::path!("api" / "rooms" / String)
            .and(warp::delete())
            .map(|_id: String| warp::reply::with_status(warp::reply(), WarpStatus::NO_CONTENT));
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        assert!(client_for(addr).delete_room("hall-1").await.is_ok());
    }

    #[tokio::test]
    async fn error_body_detail_becomes_message() {
        let routes = warp::path!("api" / "rooms" / String).map(|_id: String| {
            warp::reply::with_status(
                warp::reply::json(&json!({"detail": "Room not found"})),
                WarpStatus::NOT_FOUND,
            )
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = client_for(addr).get_room("ghost").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "Room not found");
    }

    #[tokio::test]
    async fn unparsable_error_body_uses_status_code() {
        let routes = warp::path!("api" / "status").map(|| {
            warp::reply::with_status("upstream exploded", WarpStatus::INTERNAL_SERVER_ERROR)
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = client_for(addr).system_status().await.unwrap_err();
        assert_eq!(err.message(), "HTTP 500");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let routes = warp::path!("api" / "models").map(|| warp::reply::json(&json!({"oops": 1})));
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = client_for(addr).list_models().await.unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn history_sends_hours_query() {
        let routes = warp::path!("api" / "rooms" / String / "history")
            .and(warp::query::<std::collections::HashMap<String, String>>())
            .map(|room_id: String, query: std::collections::HashMap<String, String>| {
                let hours = query.get("hours").cloned().unwrap_or_default();
                warp::reply::json(&json!([{
                    "id": 1,
                    "room_id": room_id,
                    "count": hours.parse::<u32>().unwrap_or(0),
                    "raw_count": 0,
                    "occupancy": 0.0,
                    "timestamp": "2025-03-01T10:00:00"
                }]))
            });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let history = client_for(addr).history("lab", 24).await.unwrap();
        assert_eq!(history[0].room_id, "lab");
        assert_eq!(history[0].count, 24);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let err = client_for(addr).list_rooms().await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
    }

    /// Listener that reads each request and hangs up without answering.
    async fn hang_up_server() -> (SocketAddr, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
            }
        });
        (addr, accepted)
    }

    fn retrying_client(addr: SocketAddr, retries: u32) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: format!("http://{}", addr),
            timeout_ms: 2_000,
            idempotent_retries: retries,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn get_and_put_are_replayed_after_transport_errors() {
        let (addr, accepted) = hang_up_server().await;
        let client = retrying_client(addr, 2);

        let err = client.list_rooms().await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
        assert_eq!(accepted.load(Ordering::SeqCst), 3);

        accepted.store(0, Ordering::SeqCst);
        let update = RoomUpdate {
            name: Some("Annex".into()),
            ..Default::default()
        };
        assert!(client.update_room("hall-1", &update).await.is_err());
        assert_eq!(accepted.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn post_and_delete_are_sent_once() {
        let (addr, accepted) = hang_up_server().await;
        let client = retrying_client(addr, 2);

        let room = RoomCreate {
            id: "annex".into(),
            name: "Annex".into(),
            capacity: 40,
            camera_url: "0".into(),
            is_active: true,
        };
        let err = client.create_room(&room).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
        assert_eq!(accepted.load(Ordering::SeqCst), 1);

        accepted.store(0, Ordering::SeqCst);
        assert!(client.delete_room("annex").await.is_err());
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn status_errors_are_not_replayed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let routes = warp::path!("api" / "rooms").map(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            warp::reply::with_status(
                warp::reply::json(&json!({"detail": "busy"})),
                WarpStatus::SERVICE_UNAVAILABLE,
            )
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = retrying_client(addr, 2).list_rooms().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn only_get_and_put_are_retryable() {
        assert!(is_retryable(&Method::GET));
        assert!(is_retryable(&Method::PUT));
        assert!(!is_retryable(&Method::POST));
        assert!(!is_retryable(&Method::DELETE));
    }

    #[test]
    fn url_encodes_path_segments() {
        let client = ApiClient::new(&ClientConfig {
            base_url: "http://localhost:8000/".into(),
            ..Default::default()
        })
        .unwrap();
        let url = client.url(&["api", "rooms", "room a", "history"], &[("hours", "5".into())]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/rooms/room%20a/history?hours=5"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(ApiClient::new(&config).is_err());
    }
}
