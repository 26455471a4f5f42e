use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use tracing::warn;

use crate::errors::AppError;

pub const MISSING_FIELDS_MESSAGE: &str = "Both job description and resume are required";

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUME_FIELD: &str = "resume";

/// The uploaded file exactly as received. Lives for one request only.
#[derive(Debug)]
pub struct UploadedResume {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub struct AnalysisRequest {
    pub job_description: String,
    pub resume: UploadedResume,
}

fn missing_fields() -> AppError {
    AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())
}

/// An over-limit body is reported as such; any other stream failure means
/// the fields could not be read.
fn stream_error(e: MultipartError, what: &str, upload_limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge {
            limit: upload_limit,
        };
    }
    warn!("Unreadable {what}: {e}");
    missing_fields()
}

/// Reads the multipart form into an `AnalysisRequest`.
///
/// A resume part only counts when it carries a file name, which is what a
/// browser sends for a chosen file. Its bytes may still be empty; that is
/// left for the converter to reject. A job description sent as a file does
/// not count. Repeated fields keep the first value.
pub async fn read_analysis_request(
    mut multipart: Multipart,
    upload_limit: usize,
) -> Result<AnalysisRequest, AppError> {
    let mut job_description: Option<String> = None;
    let mut resume: Option<UploadedResume> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| stream_error(e, "multipart body", upload_limit))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            JOB_DESCRIPTION_FIELD if job_description.is_none() => {
                if field.file_name().is_some() {
                    continue;
                }
                let text = field
                    .text()
                    .await
                    .map_err(|e| stream_error(e, "job_description field", upload_limit))?;
                job_description = Some(text);
            }
            RESUME_FIELD if resume.is_none() => {
                let file_name = match field.file_name() {
                    Some(f) if !f.is_empty() => f.to_string(),
                    _ => continue,
                };
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| stream_error(e, "resume field", upload_limit))?;
                resume = Some(UploadedResume {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    match (job_description, resume) {
        (Some(job_description), Some(resume)) if !job_description.is_empty() => {
            Ok(AnalysisRequest {
                job_description,
                resume,
            })
        }
        _ => Err(missing_fields()),
    }
}
