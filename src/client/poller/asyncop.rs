use azure_core::http::{Context, Method, Pipeline, Url};

use super::utils::{
    self, get_lro_status, get_provisioning_state, header_url, result_helper, LROStatus,
    AZURE_ASYNCOPERATION, LOCATION,
};
use super::{send, PollingHandler, Response};
use crate::error::{Error, Result};

pub struct Poller {
    pl: Pipeline,

    // The response of the last call (either sync or poll call).
    resp: Response,

    // The URL from Azure-AsyncOperation header.
    async_url: Url,

    // The URL from Location header.
    loc_url: Option<Url>,

    // The URL from the initial LRO request.
    origin_url: Url,

    // The HTTP method from the initial LRO request.
    method: Method,

    // The LRO's current state.
    cur_state: LROStatus,
}

impl Poller {
    pub fn new(pl: Pipeline, method: Method, origin_url: &Url, resp: Response) -> Result<Self> {
        let async_url = header_url(&resp, &AZURE_ASYNCOPERATION)?.ok_or_else(|| {
            Error::Operation(format!("missing `{}` header", AZURE_ASYNCOPERATION.as_str()))
        })?;
        let loc_url = header_url(&resp, &LOCATION)?;
        let cur_state = get_provisioning_state(&resp)
            .filter(LROStatus::is_terminal)
            .unwrap_or(LROStatus::InProgress);
        Ok(Self {
            pl,
            resp,
            async_url,
            loc_url,
            origin_url: origin_url.clone(),
            method,
            cur_state,
        })
    }
}

impl PollingHandler for Poller {
    fn applicable(_: &Method, resp: &Response) -> bool {
        resp.headers
            .get_optional_str(&AZURE_ASYNCOPERATION)
            .is_some()
    }

    async fn poll(&mut self, ctx: &Context<'_>) -> Result<Response> {
        if self.done() {
            return Ok(self.resp.clone());
        }
        let resp = send(&self.pl, ctx, self.async_url.clone()).await?;
        if !utils::is_valid_status_code(resp.status_code) {
            self.resp = resp.clone();
            return Err(resp.into());
        }
        let status = get_lro_status(&resp)
            .ok_or_else(|| Error::Operation("the response did not contain a status".to_string()))?;
        self.cur_state = status;
        self.resp = resp.clone();
        Ok(resp)
    }

    fn done(&self) -> bool {
        self.cur_state.is_terminal()
    }

    async fn result(&self, ctx: &Context<'_>) -> Result<Response> {
        if self.cur_state.is_failed() {
            return result_helper(&self.resp, true);
        }

        let final_url = match self.method {
            // for PATCH and PUT, the final GET is on the original resource URL
            Method::Put | Method::Patch => Some(self.origin_url.clone()),
            Method::Post => self.loc_url.clone(),
            _ => None,
        };
        let Some(final_url) = final_url else {
            return Ok(self.resp.clone());
        };

        let resp = send(&self.pl, ctx, final_url).await?;
        result_helper(&resp, false)
    }
}
