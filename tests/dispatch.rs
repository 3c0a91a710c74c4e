//! Requests the keymaster does not handle reach the wrapped service unchanged.

mod common;

use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use common::{app, request, supplied_keys, MemoryStore};
use keymaster_lib::sysmeta::CRYPTO_ID_HEADER;
use keymaster_lib::{CryptoOverride, Keymaster};

fn keymaster() -> Keymaster {
    Keymaster::new("secret")
}

#[tokio::test]
async fn unhandled_methods_pass_through() {
    let store = MemoryStore::new();
    let app = app(&store, keymaster());

    let copy = Method::from_bytes(b"COPY").unwrap();
    for method in [Method::DELETE, Method::OPTIONS, copy] {
        let resp = app
            .clone()
            .oneshot(request(method.clone(), "/v1/a/c/o1"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(supplied_keys(&resp).is_none());
        assert!(resp.extensions().get::<CryptoOverride>().is_none());

        let seen = store.last_seen();
        assert_eq!(seen.method, method);
        assert!(seen.keys.is_none(), "{} should not get keys", method);
    }
}

#[tokio::test]
async fn non_account_paths_pass_through() {
    let store = MemoryStore::new();
    let app = app(&store, keymaster());

    for path in ["/", "/info", "/v1/", "/v1/a/c/%FF"] {
        let resp = app
            .clone()
            .oneshot(request(Method::PUT, path))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED, "path {}", path);

        let seen = store.last_seen();
        assert!(seen.keys.is_none(), "path {} should not get keys", path);
        assert!(seen.headers.get(CRYPTO_ID_HEADER).is_none());
    }
}

#[tokio::test]
async fn non_account_get_is_untouched() {
    let store = MemoryStore::new();
    let resp = app(&store, keymaster())
        .oneshot(request(Method::GET, "/info"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(supplied_keys(&resp).is_none());
    assert!(resp.extensions().get::<CryptoOverride>().is_none());
    assert_eq!(store.seen_count(), 1);
}

#[tokio::test]
async fn trailing_slash_targets_container() {
    let store = MemoryStore::new();
    app(&store, keymaster())
        .oneshot(request(Method::POST, "/v1/a/c/"))
        .await
        .unwrap();

    let keys = store.last_seen().keys.unwrap();
    assert!(keys.container().is_some());
    assert!(keys.object().is_none());
}
