use azure_core::error::http_response_from_body;
use azure_core::http::{headers::Headers, RawResponse, StatusCode};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub async fn from_raw_response(resp: RawResponse) -> Result<Self> {
        let (status_code, headers, body) = resp.deconstruct();
        let body = body.collect().await?;
        Ok(Self {
            status_code,
            headers,
            body,
        })
    }

    pub fn status(&self) -> u16 {
        u16::from(self.status_code)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turns a non-2xx response into an error carrying its status and ARM error code.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status_code.is_success() {
            Ok(self)
        } else {
            Err(self.into())
        }
    }
}

impl From<Response> for Error {
    fn from(val: Response) -> Self {
        let kind = http_response_from_body(val.status_code, &val.body);
        azure_core::Error::with_message(kind, || {
            format!("request failed with status {}", val.status())
        })
        .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arm_error_body_becomes_a_coded_error() {
        let resp = Response {
            status_code: StatusCode::NotFound,
            headers: Headers::new(),
            body: Bytes::from_static(
                br#"{"error":{"code":"ResourceGroupNotFound","message":"Resource group 'rg' could not be found."}}"#,
            ),
        };
        let err = resp.error_for_status().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), Some("ResourceGroupNotFound"));
    }

    #[test]
    fn success_passes_through() {
        let resp = Response {
            status_code: StatusCode::Ok,
            headers: Headers::new(),
            body: Bytes::from_static(br#"{"name":"rg"}"#),
        };
        let resp = resp.error_for_status().unwrap();
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["name"], "rg");
    }
}
