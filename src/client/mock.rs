//! A scripted transport for driving [`Client`] without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use azure_core::http::{
    headers::{HeaderName, Headers},
    ClientOptions, HttpClient, RawResponse, Request, RetryOptions, StatusCode, TransportOptions,
};

use super::Client;
use crate::azidentityext::AccessTokenCredential;

pub const ENDPOINT: &str = "https://management.azure.com";

#[derive(Debug)]
pub struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

pub fn reply(status: u16, body: &str) -> Reply {
    Reply {
        status,
        headers: vec![],
        body: body.to_string(),
    }
}

impl Reply {
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// Answers requests with the scripted replies in order and records
/// each request as `"{METHOD} {url}"`.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(vec![]),
        })
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// The request line, without the query string, of every request sent.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.split('?').next().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl HttpClient for MockTransport {
    async fn execute_request(&self, request: &Request) -> azure_core::Result<RawResponse> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method(), request.url()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no reply scripted for {}", request.url()));

        let mut headers = Headers::new();
        for (name, value) in reply.headers {
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(RawResponse::from_bytes(
            StatusCode::from(reply.status),
            headers,
            reply.body.into_bytes(),
        ))
    }
}

/// A client that sends through `transport`, never retries and polls every second.
pub fn client(transport: Arc<MockTransport>) -> Arc<Client> {
    let mut options = ClientOptions::default();
    options.transport = Some(TransportOptions::new(transport));
    options.retry = Some(RetryOptions::none());
    let credential = AccessTokenCredential::with_default_expiry("token".to_string());
    Arc::new(
        Client::new(ENDPOINT, credential, Some(options))
            .unwrap()
            .with_poll_frequency(Duration::from_secs(1)),
    )
}
