#[cfg(test)]
pub(crate) mod mock;
pub mod poller;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use azure_core::{
    credentials::TokenCredential,
    http::{
        policies::{BearerTokenCredentialPolicy, Policy},
        ClientOptions, Context, Method, Pipeline, Request, Url,
    },
};
use bytes::Bytes;
use tracing::debug;

use crate::error::{Error, Result};
use poller::{PollUntilDoneOptions, Poller};
pub use response::Response;

/// An authenticated Azure Resource Manager REST client.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    pipeline: Pipeline,
    poll_frequency: Duration,
}

impl Client {
    pub fn new(
        endpoint: &str,
        credential: Arc<dyn TokenCredential>,
        options: Option<ClientOptions>,
    ) -> Result<Self> {
        let options = options.unwrap_or_default();
        let endpoint = Url::parse(endpoint).map_err(|_| Error::Url(endpoint.to_string()))?;
        let scope = format!("{}/.default", endpoint.as_str().trim_end_matches('/'));
        let auth_policy: Arc<dyn Policy> =
            Arc::new(BearerTokenCredentialPolicy::new(credential, vec![scope]));
        let pipeline = Pipeline::new(
            option_env!("CARGO_PKG_NAME"),
            option_env!("CARGO_PKG_VERSION"),
            options,
            vec![auth_policy],
            vec![],
        );
        Ok(Self {
            endpoint,
            pipeline,
            poll_frequency: Duration::from_secs(30),
        })
    }

    /// Sets the wait between polls of a long-running operation when the
    /// service does not send a `Retry-After` header.
    pub fn with_poll_frequency(mut self, frequency: Duration) -> Self {
        self.poll_frequency = frequency;
        self
    }

    fn api_url(&self, api_path: &str, api_version: &str) -> Result<Url> {
        let mut url = self
            .endpoint
            .join(api_path)
            .map_err(|_| Error::Url(api_path.to_string()))?;
        url.query_pairs_mut()
            .append_pair("api-version", api_version);
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Bytes>,
    ) -> Result<(Request, Response)> {
        debug!(?method, %url, "sending request");
        let mut request = Request::new(url, method);
        request.insert_header("accept", "application/json");
        if let Some(body) = body {
            request.insert_header("content-type", "application/json");
            request.set_body(body);
        }

        let ctx = Context::new();
        let raw_resp = self.pipeline.send(&ctx, &mut request).await?;
        let resp = Response::from_raw_response(raw_resp).await?;
        debug!(status = resp.status(), "received response");
        Ok((request, resp))
    }

    /// Sends a single request without long-running-operation handling.
    /// Non-2xx answers come back as errors from the pipeline.
    pub async fn send(
        &self,
        method: Method,
        api_path: &str,
        api_version: &str,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let url = self.api_url(api_path, api_version)?;
        let (_, resp) = self.execute(method, url, body).await?;
        Ok(resp)
    }

    /// Sends a request and, for mutating methods, waits for the
    /// long-running operation it starts to finish.
    pub async fn run(
        &self,
        method: Method,
        api_path: &str,
        api_version: &str,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let url = self.api_url(api_path, api_version)?;
        let lro = matches!(
            method,
            Method::Put | Method::Post | Method::Delete | Method::Patch
        );
        let (request, resp) = self.execute(method.clone(), url, body).await?;

        if !lro {
            return resp.error_for_status();
        }

        let mut poller = Poller::new(self.pipeline.clone(), method, request.url(), &resp)?;
        let ctx = Context::new();
        poller
            .poll_until_done(
                &ctx,
                Some(PollUntilDoneOptions {
                    frequency: Some(self.poll_frequency),
                }),
            )
            .await
    }

    /// Fetches an absolute URL, such as a `nextLink` returned by a list call.
    pub async fn get_url(&self, url: &str) -> Result<Response> {
        let url = Url::parse(url).map_err(|_| Error::Url(url.to_string()))?;
        let (_, resp) = self.execute(Method::Get, url, None).await?;
        resp.error_for_status()
    }
}
