//! Resume analysis: multipart upload → first-page image → model review.

pub mod handlers;
pub mod prompts;
pub mod request;
