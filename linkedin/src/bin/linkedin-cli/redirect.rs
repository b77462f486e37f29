//! One-shot loopback HTTP endpoint that receives the OAuth redirect.
//!
//! The listener does not judge the callback: whatever parameters arrive are handed to the
//! authorization flow, which checks `error` and `state`.

use eyre::Context;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, body};
use linkedin_connect::CallbackParams;
use std::convert::Infallible;
use std::future::Future;
use tokio::sync::mpsc;

const DONE_HTML: &str = "<!doctype html><title>LinkedIn</title>\
    <p>Authorization received. You can close this window and return to the terminal.</p>";
const DENIED_HTML: &str = "<!doctype html><title>LinkedIn</title>\
    <p>Authorization was not granted. You can close this window.</p>";

/// Binds `127.0.0.1:port` and waits for one request to `path`.
///
/// Returns the redirect URI to register with the authorization request and a future that
/// resolves to the callback's query parameters.
pub(crate) async fn listen(
    port: u16,
    path: &'static str,
) -> eyre::Result<(String, impl Future<Output = eyre::Result<CallbackParams>>)> {
    let socket = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("bind to localhost:{port}"))?;
    let addr = socket.local_addr().context("get local address")?;
    let redirect_uri = format!("http://{}:{}{path}", addr.ip(), addr.port());

    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let r = async move {
            let (got, mut gotten) = mpsc::channel(1);
            loop {
                tokio::select! {
                    accepted = socket.accept() => {
                        let (conn, _) = accepted.context("accept")?;
                        tokio::spawn(serve(conn, path, got.clone()));
                    }
                    params = gotten.recv() => {
                        return params
                            .ok_or_else(|| eyre::eyre!("redirect handler exited prematurely"));
                    }
                }
            }
        };
        let _ = tx.send(r.await);
    });

    Ok((redirect_uri, async move {
        rx.await.context("redirect future dropped prematurely")?
    }))
}

async fn serve(conn: tokio::net::TcpStream, path: &'static str, got: mpsc::Sender<CallbackParams>) {
    let conn = hyper_util::rt::TokioIo::new(conn);
    let service = service_fn(move |req: Request<body::Incoming>| {
        let got = got.clone();
        async move {
            // browsers also ask for /favicon.ico and the like
            if req.uri().path() != path {
                let mut response = Response::new(Full::<Bytes>::from("not found"));
                *response.status_mut() = StatusCode::NOT_FOUND;
                return Ok::<_, Infallible>(response);
            }

            let params = CallbackParams::from_query(req.uri().query().unwrap_or(""));
            let page = if params.error.as_deref().is_some_and(|e| !e.is_empty()) {
                DENIED_HTML
            } else {
                DONE_HTML
            };
            let _ = got.send(params).await;
            Ok(Response::new(Full::<Bytes>::from(page)))
        }
    });

    if let Err(e) = hyper::server::conn::http1::Builder::new()
        .serve_connection(conn, service)
        .await
    {
        tracing::debug!(error = %e, "redirect connection ended with an error");
    }
}
