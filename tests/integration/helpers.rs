//! Shared test helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use medianest_api::{AppState, build_app};
use medianest_client::FolderTransport;
use medianest_client::transport::decode_envelope;
use medianest_core::config::AppConfig;
use medianest_core::result::AppResult;
use medianest_core::types::{ItemId, ItemKind, MediaItem};
use medianest_database::StoreManager;
use medianest_database::memory::{MemoryFolderRepository, MemoryItemStore};
use medianest_entity::action::FolderAction;
use medianest_service::ServiceContext;

/// Manager token accepted by [`TestApp::with_auth`].
pub const MANAGER_TOKEN: &str = "test-manager-token";

/// Number of seeded attachments (ids 1..=5). Item 6 is not an attachment.
pub const SEEDED_ATTACHMENTS: u64 = 5;

/// Test application context
#[derive(Clone)]
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Service context behind the router
    pub ctx: ServiceContext,
    /// Item store handle for direct inspection
    pub items: MemoryItemStore,
    /// Folder repository handle for direct inspection
    pub folders: MemoryFolderRepository,
}

impl TestApp {
    /// Create a test application with authorization disabled
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a test application that requires [`MANAGER_TOKEN`] for mutations
    pub async fn with_auth() -> Self {
        let mut config = AppConfig::default();
        config.auth.enabled = true;
        config.auth.manager_tokens = vec![MANAGER_TOKEN.to_string()];
        Self::with_config(config).await
    }

    /// Create a test application from explicit configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let items = MemoryItemStore::new();
        for (id, name) in [
            (1, "logo.png"),
            (2, "logo-dark.svg"),
            (3, "banner.jpg"),
            (4, "report.pdf"),
            (5, "intro.mp4"),
        ] {
            items.insert_item(MediaItem::attachment(ItemId(id), name));
        }
        items.insert_item(MediaItem {
            kind: ItemKind::Other,
            ..MediaItem::attachment(ItemId(6), "about-page.html")
        });

        let folders = MemoryFolderRepository::new();
        let stores = StoreManager::in_memory(folders.clone(), items.clone());
        let ctx = ServiceContext::with_stores(config, stores)
            .await
            .expect("Failed to build service context");
        let router = build_app(AppState::new(ctx.clone()));

        Self {
            router,
            ctx,
            items,
            folders,
        }
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// POST an action to the RPC endpoint
    pub async fn rpc(&self, body: Value) -> TestResponse {
        self.request("POST", "/api/rpc", Some(body), None).await
    }

    /// Create a folder and return its id
    pub async fn create_folder(&self, name: &str, parent: i64) -> i64 {
        let response = self
            .rpc(json!({"action": "createFolder", "name": name, "parent": parent}))
            .await;
        assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
        response.body["data"]["folder"]["id"]
            .as_i64()
            .expect("folder id")
    }

    /// Current snapshot payload
    pub async fn snapshot(&self) -> Value {
        let response = self.rpc(json!({"action": "getFolders"})).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["data"].clone()
    }

    /// Transport that drives this router in-process
    pub fn transport(&self, token: Option<&str>) -> RouterTransport {
        RouterTransport {
            app: self.clone(),
            token: token.map(str::to_string),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `error.code` of a failure envelope
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

/// Flat entry of `snapshot` with the given id
pub fn flat_entry(snapshot: &Value, id: i64) -> Option<Value> {
    snapshot["flat"]
        .as_array()?
        .iter()
        .find(|f| f["id"] == id)
        .cloned()
}

/// Id of the system folder in `snapshot`
pub fn system_id(snapshot: &Value) -> i64 {
    snapshot["flat"]
        .as_array()
        .and_then(|flat| flat.iter().find(|f| f["is_system"] == true))
        .and_then(|f| f["id"].as_i64())
        .expect("system folder present")
}

/// [`FolderTransport`] backed by the Axum router
pub struct RouterTransport {
    app: TestApp,
    token: Option<String>,
}

#[async_trait]
impl FolderTransport for RouterTransport {
    async fn call(&self, action: &FolderAction) -> AppResult<Value> {
        let body = serde_json::to_value(action)?;
        let response = self
            .app
            .request("POST", "/api/rpc", Some(body), self.token.as_deref())
            .await;
        let bytes = serde_json::to_vec(&response.body)?;
        decode_envelope(response.status.as_u16(), &bytes)
    }
}
