//! In-memory object server used as the service wrapped by the keymaster.
//!
//! PUT stores the body and every sysmeta header it receives, plus a
//! `crypto-meta-key` header naming the object key it was sealed with (when
//! keys were supplied). GET/HEAD replay the stored headers. Anything else is
//! answered with 204 and recorded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{self, HeaderMap, Method, StatusCode};
use axum::response::Response;
use axum::Router;

use keymaster_lib::crypto::KeySet;
use keymaster_lib::path::ServerType;
use keymaster_lib::server::build_router;
use keymaster_lib::sysmeta;
use keymaster_lib::{FetchCryptoKeys, Keymaster};

pub const CRYPTO_META_KEY: &str = "x-object-sysmeta-crypto-meta-key";

#[derive(Clone)]
pub struct StoredObject {
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What the inner service observed for one request.
#[derive(Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub keys: Option<KeySet>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(&self) -> Router {
        Router::new().fallback(handle).with_state(self.clone())
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn insert(&self, path: &str, object: StoredObject) {
        self.objects.lock().unwrap().insert(path.to_string(), object);
    }

    /// Server-side copy: the destination keeps the source's sysmeta and body.
    pub fn copy(&self, from: &str, to: &str) {
        let object = self.get(from).expect("copy source exists");
        self.insert(to, object);
    }

    /// Remove a header from a stored object, as a tampered or legacy object
    /// would look.
    pub fn strip_header(&self, path: &str, name: &str) {
        if let Some(obj) = self.objects.lock().unwrap().get_mut(path) {
            obj.headers.remove(name);
        }
    }

    pub fn set_header(&self, path: &str, name: &'static str, value: &str) {
        if let Some(obj) = self.objects.lock().unwrap().get_mut(path) {
            obj.headers.insert(name, value.parse().unwrap());
        }
    }

    pub fn last_seen(&self) -> Seen {
        self.seen.lock().unwrap().last().cloned().expect("a request reached the store")
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

async fn handle(State(store): State<MemoryStore>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let keys = parts.extensions.get::<FetchCryptoKeys>().map(|f| f.fetch());

    store.seen.lock().unwrap().push(Seen {
        method: parts.method.clone(),
        path: path.clone(),
        headers: parts.headers.clone(),
        keys: keys.clone(),
    });

    match parts.method {
        Method::PUT => {
            let body = to_bytes(body, usize::MAX).await.unwrap();
            let mut headers = HeaderMap::new();
            for (name, value) in &parts.headers {
                if sysmeta::is_sys_meta(ServerType::Object, name.as_str()) {
                    headers.insert(name.clone(), value.clone());
                }
            }
            if let Some(key) = keys.as_ref().and_then(|k| k.object()) {
                headers.insert(CRYPTO_META_KEY, key.fingerprint().parse().unwrap());
            }
            store.insert(&path, StoredObject { headers, body });
            status(StatusCode::CREATED)
        }
        Method::GET | Method::HEAD => match store.get(&path) {
            Some(obj) => {
                let body = if parts.method == Method::HEAD {
                    Body::empty()
                } else {
                    Body::from(obj.body.clone())
                };
                let mut resp = Response::new(body);
                *resp.headers_mut() = obj.headers.clone();
                resp
            }
            None => status(StatusCode::NOT_FOUND),
        },
        _ => status(StatusCode::NO_CONTENT),
    }
}

fn status(code: StatusCode) -> Response {
    let mut resp = Response::new(Body::empty());
    *resp.status_mut() = code;
    resp
}

pub fn app(store: &MemoryStore, keymaster: Keymaster) -> Router {
    build_router(keymaster, store.router())
}

pub fn request(method: Method, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub fn put(path: &str, body: &'static str) -> Request {
    http::Request::builder()
        .method(Method::PUT)
        .uri(path)
        .body(Body::from(body))
        .unwrap()
}

pub fn supplied_keys(resp: &Response) -> Option<KeySet> {
    resp.extensions().get::<FetchCryptoKeys>().map(|f| f.fetch())
}
