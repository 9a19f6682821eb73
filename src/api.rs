// src/api.rs
use crate::error::ClientError;
use crate::feedback::{read_reply, FeedbackRecord, FeedbackSubmission, FORM_CONTENT_TYPE};
use gloo_net::http::{Request, Response};

/// Read the stored feedback. `Ok(None)` when the backend has no record yet.
pub async fn fetch_feedback(url: &str) -> Result<Option<FeedbackRecord>, ClientError> {
    let resp = Request::get(url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    read_reply(url, status, &body)
}

pub async fn store_feedback(
    submission: &FeedbackSubmission,
    csrf_token: Option<&str>,
) -> Result<(), ClientError> {
    let mut request = Request::post(&submission.url).header("Content-Type", FORM_CONTENT_TYPE);
    if let Some(token) = csrf_token {
        request = request.header("X-CSRFToken", token);
    }
    let resp = request.body(submission.encoded_body())?.send().await?;
    ensure_ok(&submission.url, resp)?;
    Ok(())
}

/// Rendered explanation fragment for a submission.
pub async fn fetch_explanation(url: &str) -> Result<String, ClientError> {
    let resp = ensure_ok(url, Request::get(url).send().await?)?;
    Ok(resp.text().await?)
}

fn ensure_ok(url: &str, resp: Response) -> Result<Response, ClientError> {
    if resp.ok() {
        Ok(resp)
    } else {
        Err(ClientError::Status {
            url: url.to_string(),
            status: resp.status(),
        })
    }
}
