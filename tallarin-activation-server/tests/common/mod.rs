//! Shared helpers for activation server tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use tallarin_activation_server::{AppState, build_router};
use tallarin_license::{KeyPair, MIN_KEY_BITS};
use tallarin_revocation::{MemoryRegistry, RevocationRegistry};

pub fn test_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| KeyPair::generate(MIN_KEY_BITS).unwrap())
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
pub async fn spawn_with_registry(registry: Arc<dyn RevocationRegistry>) -> String {
    let state = AppState::new(test_keypair().clone(), registry).unwrap();
    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Spin up a server backed by an empty in-memory registry.
pub async fn spawn_test_server() -> (String, Arc<MemoryRegistry>) {
    let registry = Arc::new(MemoryRegistry::new());
    let base = spawn_with_registry(registry.clone()).await;
    (base, registry)
}
