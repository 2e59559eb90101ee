use azure_core::http::{Context, Method, Pipeline, StatusCode, Url};

use super::utils::{self, get_provisioning_state, result_helper, LROStatus};
use super::{send, PollingHandler, Response};
use crate::error::{Error, Result};

pub struct Poller {
    pl: Pipeline,

    // The response of the last call (either sync or poll call).
    resp: Response,

    // The URL for polling.
    poll_url: Url,

    // The LRO's current state.
    cur_state: LROStatus,
}

impl Poller {
    pub fn new(pl: Pipeline, url: &Url, resp: Response) -> Self {
        let provision_state = get_provisioning_state(&resp);
        let cur_state = match resp.status_code {
            StatusCode::Created => provision_state.unwrap_or(LROStatus::InProgress),
            StatusCode::Ok => provision_state.unwrap_or(LROStatus::Succeeded),
            StatusCode::NoContent => LROStatus::Succeeded,
            _ => LROStatus::InProgress,
        };

        Self {
            pl,
            resp,
            poll_url: url.clone(),
            cur_state,
        }
    }
}

impl PollingHandler for Poller {
    // applicable returns true if the LRO is using no headers, just provisioning state.
    // This is only applicable to PATCH and PUT methods and assumes no polling headers.
    fn applicable(method: &Method, _: &Response) -> bool {
        matches!(method, Method::Put | Method::Patch)
    }

    async fn poll(&mut self, ctx: &Context<'_>) -> Result<Response> {
        if self.done() {
            return Ok(self.resp.clone());
        }
        let resp = send(&self.pl, ctx, self.poll_url.clone()).await?;
        if !utils::is_valid_status_code(resp.status_code) {
            self.resp = resp.clone();
            return Err(resp.into());
        }
        if resp.status_code == StatusCode::NoContent {
            self.resp = resp.clone();
            self.cur_state = LROStatus::Succeeded;
            return Ok(resp);
        }

        if resp.body.is_empty() {
            // a missing response body in non-204 case is an error
            return Err(Error::Operation(
                "non-204 response has no response body".to_string(),
            ));
        }
        // a response body without provisioning state is considered terminal success
        self.cur_state = get_provisioning_state(&resp).unwrap_or(LROStatus::Succeeded);
        self.resp = resp.clone();
        Ok(resp)
    }

    fn done(&self) -> bool {
        self.cur_state.is_terminal()
    }

    async fn result(&self, _: &Context<'_>) -> Result<Response> {
        result_helper(&self.resp, self.cur_state.is_failed())
    }
}
