use chrono::{DateTime, Utc};
use std::{fmt::Display, time::Duration};

use super::Response;

use crate::error::Result;
use azure_core::http::{headers::HeaderName, StatusCode, Url};
use serde_json::{from_slice, Value};
use std::collections::HashMap;

// These are not defined in every azure_core release, so keep our own copies.
pub const AZURE_ASYNCOPERATION: HeaderName = HeaderName::from_static("azure-asyncoperation");
pub const LOCATION: HeaderName = HeaderName::from_static("location");

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LROStatus {
    Unknown,
    Succeeded,
    Canceled,
    Failed,
    InProgress,

    // Followings are non-conformant states that been seen in the wild
    Cancelled,
    Completed,
}

impl Display for LROStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LROStatus::Succeeded => "Succeeded",
            LROStatus::Canceled => "Canceled",
            LROStatus::Failed => "Failed",
            LROStatus::InProgress => "InProgress",
            LROStatus::Cancelled => "Cancelled",
            LROStatus::Completed => "Completed",
            LROStatus::Unknown => "<unknown>",
        };
        f.write_str(s)
    }
}

impl LROStatus {
    pub fn parse(v: &str) -> Self {
        // CDN reports "Creating", "Deleting" and friends while in flight;
        // anything unrecognised is treated as still running.
        match v {
            "Succeeded" => LROStatus::Succeeded,
            "Canceled" => LROStatus::Canceled,
            "Failed" => LROStatus::Failed,
            "InProgress" => LROStatus::InProgress,
            "Cancelled" => LROStatus::Cancelled,
            "Completed" => LROStatus::Completed,
            _ => LROStatus::Unknown,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            LROStatus::Failed | LROStatus::Canceled | LROStatus::Cancelled
        )
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, LROStatus::Succeeded | LROStatus::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_failed() || self.is_succeeded()
    }
}

fn body_object(resp: &Response) -> Option<HashMap<String, Value>> {
    if resp.body.is_empty() {
        return None;
    }
    from_slice(&resp.body).ok()
}

// get_provisioning_state returns the LRO's state from the response body.
// If there is no state in the response body the None is returned.
pub fn get_provisioning_state(resp: &Response) -> Option<LROStatus> {
    let m = body_object(resp)?;
    m.get("properties")
        .and_then(|v| v.as_object())
        .and_then(|p| p.get("provisioningState"))
        .and_then(|s| s.as_str())
        .map(LROStatus::parse)
}

// get_lro_status returns the LRO's status from an Azure-AsyncOperation body.
pub fn get_lro_status(resp: &Response) -> Option<LROStatus> {
    let m = body_object(resp)?;
    m.get("status")
        .and_then(|v| v.as_str())
        .map(LROStatus::parse)
}

pub fn header_url(resp: &Response, name: &HeaderName) -> Result<Option<Url>> {
    match resp.headers.get_optional_str(name) {
        Some(v) => Url::parse(v)
            .map(Some)
            .map_err(|_| crate::Error::Url(v.to_string())),
        None => Ok(None),
    }
}

pub fn retry_after(resp: &Response) -> Option<Duration> {
    struct Candidate {
        header: &'static str,
        to_duration: fn(u64) -> Duration,
        // custom is used when the regular algorithm failed and is optional.
        // the returned duration is used verbatim (units is not applied).
        custom: Option<fn(&str) -> Option<Duration>>,
    }

    let candidates = [
        Candidate {
            header: "retry-after-ms",
            to_duration: Duration::from_millis,
            custom: None,
        },
        Candidate {
            header: "x-ms-retry-after-ms",
            to_duration: Duration::from_millis,
            custom: None,
        },
        Candidate {
            header: "retry-after",
            to_duration: Duration::from_secs,
            custom: Some(|s| {
                let t = DateTime::parse_from_rfc2822(s).ok()?;
                let d = t.with_timezone(&Utc).signed_duration_since(Utc::now());
                Some(d.to_std().unwrap_or(Duration::ZERO))
            }),
        },
    ];

    for c in &candidates {
        if let Some(v) = resp
            .headers
            .get_optional_str(&HeaderName::from_static(c.header))
        {
            if let Ok(v) = v.parse::<u64>() {
                return Some((c.to_duration)(v));
            } else if let Some(custom) = c.custom {
                return custom(v);
            }
        }
    }

    None
}

pub fn is_valid_status_code(status_code: StatusCode) -> bool {
    [
        StatusCode::Ok,
        StatusCode::Accepted,
        StatusCode::Created,
        StatusCode::NoContent,
    ]
    .iter()
    .any(|&code| code == status_code)
}

// is_non_terminal_http_status_code returns true if the HTTP status code
// should be considered non-terminal thus eligible for another poll.
pub fn is_non_terminal_http_status_code(status_code: StatusCode) -> bool {
    [
        StatusCode::RequestTimeout,
        StatusCode::TooManyRequests,
        StatusCode::InternalServerError,
        StatusCode::BadGateway,
        StatusCode::ServiceUnavailable,
        StatusCode::GatewayTimeout,
    ]
    .iter()
    .any(|v| *v == status_code)
}

// result_helper processes the response as success or failure.
pub fn result_helper(resp: &Response, failed: bool) -> Result<Response> {
    if !is_valid_status_code(resp.status_code) {
        Err(resp.clone().into())
    } else if failed {
        let state = get_lro_status(resp)
            .or_else(|| get_provisioning_state(resp))
            .unwrap_or(LROStatus::Failed);
        Err(crate::Error::Operation(state.to_string()))
    } else {
        Ok(resp.clone())
    }
}
