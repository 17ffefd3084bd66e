//! Scripted HTTP responder on a loopback port.
//!
//! Answers one connection per scripted reply, in order, and records the raw
//! request text of each.

use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::config::ClientConfig;
use crate::session::{MemoryCredentialStore, Session};

use super::ApiClient;

pub struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

pub struct Loopback {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Loopback {
    pub async fn serve(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            for reply in replies {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                log.lock().unwrap().push(request);
                let reason = StatusCode::from_u16(reply.status)
                    .ok()
                    .and_then(|status| status.canonical_reason())
                    .unwrap_or("Status");
                let response = format!(
                    "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.body.len(),
                    reply.body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    /// Client against this responder with `token` stored, if any.
    pub fn client(&self, token: Option<&str>) -> ApiClient<MemoryCredentialStore> {
        let session = Session::new(MemoryCredentialStore::default());
        if let Some(token) = token {
            session.store_access_token(token).unwrap();
        }
        let config = ClientConfig::with_base_url(&self.base_url).unwrap();
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .no_proxy()
            .build()
            .unwrap();
        ApiClient {
            config,
            client,
            session,
        }
    }

    /// Raw requests received so far, lowercased.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.to_ascii_lowercase())
            .collect()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= end + 4 + length {
                break;
            }
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
