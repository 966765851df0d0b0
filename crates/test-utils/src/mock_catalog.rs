//! In-process STAC catalog service for synchronization tests.
//!
//! Every request is recorded in arrival order. Responses follow a
//! [`CatalogBehavior`], which can fail a specific item POST.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use tokio::sync::oneshot;

/// One request as seen by the mock catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// How the mock catalog answers.
#[derive(Debug, Clone)]
pub struct CatalogBehavior {
    pub delete_status: StatusCode,
    pub collection_status: StatusCode,
    pub collection_body: String,
    /// Fail the n-th item POST (1-based) with this status and body.
    pub fail_item: Option<(usize, StatusCode, String)>,
}

impl Default for CatalogBehavior {
    fn default() -> Self {
        Self {
            delete_status: StatusCode::NO_CONTENT,
            collection_status: StatusCode::CREATED,
            collection_body: "{}".to_string(),
            fail_item: None,
        }
    }
}

impl CatalogBehavior {
    pub fn fail_item(mut self, position: usize, status: StatusCode, body: &str) -> Self {
        self.fail_item = Some((position, status, body.to_string()));
        self
    }

    pub fn collection_status(mut self, status: StatusCode, body: &str) -> Self {
        self.collection_status = status;
        self.collection_body = body.to_string();
        self
    }

    pub fn delete_status(mut self, status: StatusCode) -> Self {
        self.delete_status = status;
        self
    }
}

#[derive(Clone)]
struct CatalogState {
    behavior: Arc<CatalogBehavior>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    item_posts: Arc<Mutex<usize>>,
}

/// A running mock catalog. Shuts down when dropped.
pub struct MockCatalog {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockCatalog {
    pub async fn start() -> Self {
        Self::start_with(CatalogBehavior::default()).await
    }

    pub async fn start_with(behavior: CatalogBehavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = CatalogState {
            behavior: Arc::new(behavior),
            requests: Arc::clone(&requests),
            item_posts: Arc::new(Mutex::new(0)),
        };

        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr: SocketAddr = listener.local_addr().expect("listener addr");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .expect("serve mock catalog");
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            shutdown: Some(tx),
        }
    }

    /// `{base_url}/collections`
    pub fn collections_url(&self) -> String {
        format!("{}/collections", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// `(method, path)` pairs in arrival order.
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    pub fn item_posts(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.path.ends_with("/items"))
            .collect()
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<CatalogState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let json = serde_json::from_slice(&body).ok();
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            body: json,
        });

    let behavior = &state.behavior;
    match method {
        Method::DELETE => (behavior.delete_status, String::new()),
        Method::POST if path.ends_with("/items") => {
            let position = {
                let mut count = state.item_posts.lock().expect("item counter lock");
                *count += 1;
                *count
            };
            match &behavior.fail_item {
                Some((k, status, body)) if *k == position => (*status, body.clone()),
                _ => (StatusCode::CREATED, "{}".to_string()),
            }
        }
        Method::POST => (behavior.collection_status, behavior.collection_body.clone()),
        _ => (StatusCode::METHOD_NOT_ALLOWED, String::new()),
    }
}
