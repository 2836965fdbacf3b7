//! HTTP API for sticker generation
//!
//! A small HTTP/1.1 server on a tokio [`TcpListener`]. Each connection
//! carries one request; rendering runs on the blocking pool so the accept
//! loop never stalls behind an image.

pub mod handlers;
pub mod http;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::{TcpListener, TcpStream};

use crate::generate::Generator;
use http::{read_request, Response};

/// Bind `host:port` and serve until the listener fails.
pub async fn serve(generator: Arc<Generator>, host: &str, port: u16) -> io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!(address = %listener.local_addr()?, "sticker API listening");
    run(listener, generator).await
}

/// Accept connections on an already bound listener.
pub async fn run(listener: TcpListener, generator: Arc<Generator>) -> io::Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        let generator = Arc::clone(&generator);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, generator).await {
                tracing::debug!(%peer, error = %e, "connection closed with error");
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, generator: Arc<Generator>) -> io::Result<()> {
    let started = Instant::now();

    let request = match read_request(&mut stream).await {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(%peer, error = %e, "rejected request");
            if let Some(status) = e.status() {
                Response::detail(status, e.to_string()).write_to(&mut stream).await?;
            }
            return Ok(());
        }
    };

    let response = handlers::handle(generator, &request).await;
    response.write_to(&mut stream).await?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status >= 400 {
        tracing::warn!(%peer, method = %request.method, path = %request.path, status = response.status, elapsed_ms, "request failed");
    } else {
        tracing::info!(%peer, method = %request.method, path = %request.path, status = response.status, elapsed_ms, "request served");
    }
    Ok(())
}
