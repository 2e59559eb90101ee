use super::{PollingHandler, Response};
use crate::error::Result;
use azure_core::http::{Context, Method};

// Used when the initial response already is the final one.
pub struct Poller {
    resp: Response,
}

impl Poller {
    pub fn new(resp: &Response) -> Self {
        Poller { resp: resp.clone() }
    }
}

impl PollingHandler for Poller {
    fn applicable(_: &Method, _: &Response) -> bool {
        true
    }

    async fn poll(&mut self, _: &Context<'_>) -> Result<Response> {
        Ok(self.resp.clone())
    }

    fn done(&self) -> bool {
        true
    }

    async fn result(&self, _: &Context<'_>) -> Result<Response> {
        Ok(self.resp.clone())
    }
}
