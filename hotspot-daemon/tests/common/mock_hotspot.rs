//! Mock hotspot web admin for proxy tests.
//!
//! Serves canned responses by path and records every request.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
struct Canned {
    status: u16,
    body: String,
}

#[derive(Clone)]
pub struct MockHotspot {
    pub addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, Canned>>>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl MockHotspot {
    /// Start on a random local port. Unknown paths answer 404.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock hotspot");
        let addr = listener.local_addr().expect("failed to get local addr");

        let routes: Arc<Mutex<HashMap<String, Canned>>> = Arc::new(Mutex::new(HashMap::new()));
        let received = Arc::new(Mutex::new(Vec::new()));

        let server_routes = Arc::clone(&routes);
        let server_received = Arc::clone(&received);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let routes = Arc::clone(&server_routes);
                let received = Arc::clone(&server_received);

                tokio::spawn(async move {
                    let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let routes = Arc::clone(&routes);
                        let received = Arc::clone(&received);
                        async move {
                            let method = req.method().to_string();
                            let path = req.uri().path().to_owned();
                            let query = req.uri().query().map(str::to_owned);
                            let headers = req
                                .headers()
                                .iter()
                                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
                                .collect();
                            let body = req
                                .into_body()
                                .collect()
                                .await
                                .map(|c| String::from_utf8_lossy(&c.to_bytes()).into_owned())
                                .unwrap_or_default();

                            received.lock().unwrap().push(ReceivedRequest {
                                method,
                                path: path.clone(),
                                query,
                                headers,
                                body,
                            });

                            let canned = routes.lock().unwrap().get(&path).cloned().unwrap_or(
                                Canned {
                                    status: 404,
                                    body: "not found".to_owned(),
                                },
                            );
                            let content_type = if canned.body.starts_with(['{', '[']) {
                                "application/json"
                            } else {
                                "text/html"
                            };
                            Ok::<_, hyper::http::Error>(
                                Response::builder()
                                    .status(canned.status)
                                    .header("content-type", content_type)
                                    .body(Full::new(Bytes::from(canned.body)))
                                    .unwrap(),
                            )
                        }
                    });

                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        Self {
            addr,
            routes,
            received,
        }
    }

    /// Answer `path` (without query) with `status` and `body`.
    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            path.to_owned(),
            Canned {
                status,
                body: body.to_owned(),
            },
        );
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests_for(&self, path: &str) -> Vec<ReceivedRequest> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}
