// Authors: Robert Lopez

use crate::Uploader;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::{net::TcpListener, sync::Notify, task::JoinHandle};

/// One multipart part as seen by the mock storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl ReceivedPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone)]
struct MockState {
    credentials_status: Arc<Mutex<StatusCode>>,
    credentials_body: Arc<Mutex<String>>,
    credential_requests: Arc<AtomicUsize>,
    upload_status: Arc<Mutex<StatusCode>>,
    uploads: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
    hold_uploads: Arc<AtomicBool>,
    upload_gate: Arc<Notify>,
}

async fn signed_post(State(state): State<MockState>) -> impl IntoResponse {
    state.credential_requests.fetch_add(1, Ordering::SeqCst);

    let status = *state.credentials_status.lock().unwrap();
    let body = state.credentials_body.lock().unwrap().clone();

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn bucket(State(state): State<MockState>, mut multipart: Multipart) -> StatusCode {
    let mut parts = vec![];

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.unwrap().to_vec();

                parts.push(ReceivedPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let value = field.text().await.unwrap();

                parts.push(ReceivedPart::Text { name, value });
            }
        }
    }

    state.uploads.lock().unwrap().push(parts);

    if state.hold_uploads.load(Ordering::SeqCst) {
        state.upload_gate.notified().await;
    }

    let status = *state.upload_status.lock().unwrap();
    status
}

/// In process stand in for both the signed post endpoint and the
/// storage service the form is posted to.
///
/// By default `/signed-post` answers with the scenario credentials pointing
/// at this server's `/bucket`, and `/bucket` answers `204 No Content`.
#[derive(Clone)]
pub struct TestServer {
    pub base_url: String,
    state: MockState,
    handle: Arc<JoinHandle<()>>,
}

impl TestServer {
    pub async fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let credentials = super::scenario_credentials(&format!("{}/bucket", base_url));

        let state = MockState {
            credentials_status: Arc::new(Mutex::new(StatusCode::OK)),
            credentials_body: Arc::new(Mutex::new(
                serde_json::to_string(&credentials).unwrap(),
            )),
            credential_requests: Arc::new(AtomicUsize::new(0)),
            upload_status: Arc::new(Mutex::new(StatusCode::NO_CONTENT)),
            uploads: Arc::new(Mutex::new(vec![])),
            hold_uploads: Arc::new(AtomicBool::new(false)),
            upload_gate: Arc::new(Notify::new()),
        };

        let router = Router::new()
            .route("/signed-post", get(signed_post))
            .route("/bucket", post(bucket))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle: Arc::new(handle),
        }
    }

    pub fn credentials_url(&self) -> String {
        format!("{}/signed-post", self.base_url)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/bucket", self.base_url)
    }

    pub fn set_credentials_body(&self, body: &str) {
        *self.state.credentials_body.lock().unwrap() = body.to_string();
    }

    pub fn set_credentials_status(&self, status: u16) {
        *self.state.credentials_status.lock().unwrap() = StatusCode::from_u16(status).unwrap();
    }

    pub fn set_upload_status(&self, status: u16) {
        *self.state.upload_status.lock().unwrap() = StatusCode::from_u16(status).unwrap();
    }

    /// Makes `/bucket` wait for `release_upload` before answering.
    pub fn hold_uploads(&self) {
        self.state.hold_uploads.store(true, Ordering::SeqCst);
    }

    /// Lets every held and future `/bucket` request answer right away.
    pub fn stop_holding_uploads(&self) {
        self.state.hold_uploads.store(false, Ordering::SeqCst);
        self.state.upload_gate.notify_waiters();
    }

    pub fn release_upload(&self) {
        self.state.upload_gate.notify_one();
    }

    pub fn credential_requests(&self) -> usize {
        self.state.credential_requests.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<Vec<ReceivedPart>> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn uploader(&self) -> Arc<Uploader> {
        Arc::new(Uploader::new(&self.credentials_url()))
    }

    pub fn drop(&self) {
        self.handle.abort();
    }

    pub async fn run_test<T, Fut>(self, test: T) -> Result<(), Box<dyn std::error::Error>>
    where
        T: FnOnce(Arc<Uploader>, TestServer) -> Fut,
        Fut: Future<Output = Result<(), Box<dyn std::error::Error>>>,
    {
        let result = test(self.uploader(), self.clone()).await;
        self.drop();

        result
    }
}
