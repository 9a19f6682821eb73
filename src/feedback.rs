// src/feedback.rs
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::lesson_data::{MediaIdentity, RenderContext};
use crate::utils::{fill_template, resource_url};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Rating and comment stored by the backend for one media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(default)]
    pub comments: String,
    pub rating: i64,
}

/// Local copy of the dialog fields. Never re-fetched after the first load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackForm {
    pub comments: String,
    pub rating: u8,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self {
            comments: String::new(),
            rating: MIN_RATING,
        }
    }
}

impl FeedbackForm {
    pub fn apply(&mut self, record: FeedbackRecord) {
        self.comments = record.comments;
        self.rating = clamp_rating(record.rating);
    }

    pub fn set_rating(&mut self, rating: i64) {
        self.rating = clamp_rating(rating);
    }
}

fn clamp_rating(rating: i64) -> u8 {
    rating.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8
}

/// Address of the feedback record for one media item within one lesson instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEndpoint {
    pub url: String,
    pub identity: MediaIdentity,
}

impl FeedbackEndpoint {
    pub fn new(config: &ClientConfig, context: &RenderContext, media_type: &str, media: &str) -> Self {
        let task = context.task_id.to_string();
        let path = fill_template(
            &config.feedback_url,
            &[
                ("task", task.as_str()),
                ("section", context.section_segment()),
                ("type", media_type),
                ("media", media),
            ],
        );
        Self {
            url: resource_url(&config.site_prefix, &path),
            identity: MediaIdentity::new(media_type, media),
        }
    }

    pub fn submission(&self, form: &FeedbackForm) -> FeedbackSubmission {
        FeedbackSubmission {
            url: self.url.clone(),
            comments: form.comments.clone(),
            rating: form.rating,
        }
    }
}

/// One write to the feedback service, captured from the form at save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub url: String,
    pub comments: String,
    pub rating: u8,
}

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

impl FeedbackSubmission {
    pub fn encoded_body(&self) -> String {
        format!(
            "comments={}&rating={}",
            urlencoding::encode(&self.comments),
            self.rating
        )
    }
}

/// Error body the feedback service sends along with a 400.
#[derive(Debug, Deserialize)]
struct ServiceFailure {
    status: String,
    #[serde(default)]
    message: String,
}

/// Interpret the reply to a feedback read.
///
/// Media nobody has rated yet comes back as a 404, or as a 400 with
/// `{"status": "error"}` because the service reports its failed lookup that
/// way. Both mean the form starts empty.
pub fn read_reply(url: &str, status: u16, body: &str) -> Result<Option<FeedbackRecord>, ClientError> {
    match status {
        200..=299 => Ok(Some(serde_json::from_str(body)?)),
        404 => Ok(None),
        400 => match serde_json::from_str::<ServiceFailure>(body) {
            Ok(failure) if failure.status == "error" => {
                log::debug!("No feedback record at {}: {}", url, failure.message);
                Ok(None)
            }
            _ => Err(ClientError::Status {
                url: url.to_string(),
                status,
            }),
        },
        _ => Err(ClientError::Status {
            url: url.to_string(),
            status,
        }),
    }
}
