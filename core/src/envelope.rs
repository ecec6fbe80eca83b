//! The uniform result envelope and the response handler that fills it.
//!
//! # Design
//! `handle_response` classifies purely by status range. A 2xx body must
//! decode as the expected type or the whole call fails with
//! [`ClientError::Decode`]. Anything else becomes a [`ProblemDetail`], decoded
//! from the body when possible and synthesized from the status line when not.
//! Payload semantics are never inspected here.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;
use crate::http::HttpResponse;

const SYNTHETIC_DETAIL: &str = "HTTP error occurred";

/// Structured error body returned by the VTN for non-2xx responses.
///
/// Every field is best-effort; servers may send any subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetail {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetail {
    /// Problem built from the status line when the body is not a problem
    /// document.
    pub fn synthesize(status: u16) -> Self {
        let title = match http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
        {
            Some(reason) => format!("{status} {reason}"),
            None => status.to_string(),
        };
        Self {
            problem_type: None,
            title: Some(title),
            status: Some(status),
            detail: Some(SYNTHETIC_DETAIL.to_string()),
        }
    }
}

impl fmt::Display for ProblemDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.title, &self.problem_type) {
            (Some(title), _) => write!(f, "{title}")?,
            (None, Some(problem_type)) => write!(f, "{problem_type}")?,
            (None, None) => write!(f, "API error")?,
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ProblemDetail {}

/// Result of a completed call: the status plus either the decoded payload or
/// the problem the server reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<ProblemDetail>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.problem.is_none()
    }

    pub fn response(&self) -> Option<&T> {
        self.response.as_ref()
    }

    pub fn problem(&self) -> Option<&ProblemDetail> {
        self.problem.as_ref()
    }

    /// The payload, or the problem that replaced it.
    ///
    /// A success without a payload (an empty delete response, say) yields a
    /// problem describing that.
    pub fn into_result(self) -> Result<T, ProblemDetail> {
        match (self.response, self.problem) {
            (Some(response), _) => Ok(response),
            (None, Some(problem)) => Err(problem),
            (None, None) => Err(ProblemDetail {
                problem_type: Some("about:blank".to_string()),
                title: Some("No payload".to_string()),
                status: Some(self.status),
                detail: Some("response carried neither a payload nor a problem".to_string()),
            }),
        }
    }
}

/// Classify `response` by status and decode its body.
pub fn handle_response<T: DeserializeOwned>(response: HttpResponse) -> Result<Envelope<T>, ClientError> {
    let HttpResponse { status, body, .. } = response;
    debug!(status, "handling response");

    if (200..300).contains(&status) {
        if body.trim().is_empty() {
            // An empty body stands for `null`; only payload types that accept
            // null may succeed without one.
            serde_json::from_str::<T>("null").map_err(|source| ClientError::Decode { status, source })?;
            return Ok(Envelope {
                status,
                response: None,
                problem: None,
            });
        }
        let payload: T =
            serde_json::from_str(&body).map_err(|source| ClientError::Decode { status, source })?;
        return Ok(Envelope {
            status,
            response: Some(payload),
            problem: None,
        });
    }

    let problem = match serde_json::from_str::<ProblemDetail>(&body) {
        Ok(problem) => problem,
        Err(e) => {
            debug!(status, error = %e, "non-2xx body is not a problem document");
            ProblemDetail::synthesize(status)
        }
    };

    Ok(Envelope {
        status,
        response: None,
        problem: Some(problem),
    })
}
