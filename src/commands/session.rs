use tokio::sync::RwLock;

use crate::api::ApiClient;

/// Managed Tauri state holding the API client and the in-memory session token.
pub struct ApiState {
    client: RwLock<ApiClient>,
}

impl ApiState {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: RwLock::new(ApiClient::new(base_url)),
        }
    }

    /// Clone of the current client. Callers make requests on the clone so the
    /// lock is never held across network I/O.
    pub async fn client(&self) -> ApiClient {
        self.client.read().await.clone()
    }

    pub async fn set_token(&self, token: String) {
        self.client.write().await.set_token(token);
    }

    pub async fn clear_token(&self) {
        self.client.write().await.clear_token();
    }

    /// Points the client at a new backend, keeping the token.
    pub async fn rebase(&self, base_url: &str) {
        let mut guard = self.client.write().await;
        let token = guard.token().map(str::to_string);
        *guard = ApiClient::new(base_url).with_token(token);
    }
}
