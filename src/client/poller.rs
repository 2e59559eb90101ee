mod asyncop;
mod body;
mod loc;
mod noop;
mod utils;

pub use utils::LROStatus;

use azure_core::http::{Context, Method, Pipeline, Request, StatusCode, Url};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::response::Response;
use crate::error::{Error, Result};

trait PollingHandler {
    fn applicable(method: &Method, resp: &Response) -> bool;

    // poll fetches the latest state of the LRO.
    async fn poll(&mut self, ctx: &Context<'_>) -> Result<Response>;

    // done returns true if the LRO has reached a terminal state.
    fn done(&self) -> bool;

    // result must be called once the LRO has reached a terminal state. It returns result of the operation.
    async fn result(&self, ctx: &Context<'_>) -> Result<Response>;
}

enum Handler {
    AsyncOp(asyncop::Poller),
    Loc(loc::Poller),
    Body(body::Poller),
    Noop(noop::Poller),
}

#[derive(Debug, Clone, Default)]
pub struct PollUntilDoneOptions {
    // frequency is the time to wait between polling intervals in absence of a Retry-After header.
    // Allowed minimum is one second; None means the default (30s).
    pub frequency: Option<Duration>,
}

pub struct Poller {
    handler: Handler,
    resp: Response,
}

async fn send(pl: &Pipeline, ctx: &Context<'_>, url: Url) -> Result<Response> {
    debug!(%url, "polling long-running operation");
    let mut req = Request::new(url, Method::Get);
    req.insert_header("accept", "application/json");
    let raw = pl.send(ctx, &mut req).await?;
    Response::from_raw_response(raw).await
}

impl Poller {
    /// Picks the polling protocol the initial response advertises.
    pub fn new(pl: Pipeline, method: Method, url: &Url, resp: &Response) -> Result<Self> {
        // This is a back-stop in case the service answers the initial request with a failure.
        if !utils::is_valid_status_code(resp.status_code) {
            return Err(resp.clone().into());
        }

        let handler = if asyncop::Poller::applicable(&method, resp) {
            // async poller must be checked first as it can also have a location header
            Handler::AsyncOp(asyncop::Poller::new(pl, method, url, resp.clone())?)
        } else if loc::Poller::applicable(&method, resp) {
            Handler::Loc(loc::Poller::new(pl, resp.clone())?)
        } else if body::Poller::applicable(&method, resp) {
            // must test body poller last as it's a subset of the other pollers.
            Handler::Body(body::Poller::new(pl, url, resp.clone()))
        } else if resp.status_code == StatusCode::Accepted
            && matches!(method, Method::Delete | Method::Post)
        {
            // a 202 with no polling headers for DELETE and POST is a hard error per ARM RPC.
            return Err(Error::Operation(
                "accepted without a polling URL".to_string(),
            ));
        } else {
            Handler::Noop(noop::Poller::new(resp))
        };

        Ok(Self {
            handler,
            resp: resp.clone(),
        })
    }

    pub async fn poll(&mut self, ctx: &Context<'_>) -> Result<Response> {
        if self.done() {
            return Ok(self.resp.clone());
        }

        let resp = match &mut self.handler {
            Handler::AsyncOp(poller) => poller.poll(ctx).await?,
            Handler::Loc(poller) => poller.poll(ctx).await?,
            Handler::Body(poller) => poller.poll(ctx).await?,
            Handler::Noop(poller) => poller.poll(ctx).await?,
        };

        self.resp = resp;
        Ok(self.resp.clone())
    }

    pub async fn poll_until_done(
        &mut self,
        ctx: &Context<'_>,
        opts: Option<PollUntilDoneOptions>,
    ) -> Result<Response> {
        let opts = opts.unwrap_or_default();
        let frequency = opts
            .frequency
            .unwrap_or(Duration::from_secs(30))
            .max(Duration::from_secs(1));

        loop {
            let resp = self.poll(ctx).await?;
            if self.done() {
                return self.result(ctx).await;
            }

            let duration = utils::retry_after(&resp).unwrap_or(frequency);
            sleep(duration).await;
        }
    }

    pub fn done(&self) -> bool {
        match &self.handler {
            Handler::AsyncOp(poller) => poller.done(),
            Handler::Loc(poller) => poller.done(),
            Handler::Body(poller) => poller.done(),
            Handler::Noop(poller) => poller.done(),
        }
    }

    // result returns the final response of the LRO operation when it reaches a terminal state.
    // If the LRO failed or was canceled, an Error::Operation is returned.
    async fn result(&self, ctx: &Context<'_>) -> Result<Response> {
        match &self.handler {
            Handler::AsyncOp(poller) => poller.result(ctx).await,
            Handler::Loc(poller) => poller.result(ctx).await,
            Handler::Body(poller) => poller.result(ctx).await,
            Handler::Noop(poller) => poller.result(ctx).await,
        }
    }
}
