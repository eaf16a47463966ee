use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use domain::{Upload, Username, ValidationError};
use serde::Deserialize;

pub type ApiError = (StatusCode, String);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!("Store error: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub fn invalid(e: ValidationError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

pub fn not_found(what: &str, id: i64) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{} {} not found", what, id))
}

pub fn forbidden(actor: &Username) -> ApiError {
    (
        StatusCode::FORBIDDEN,
        format!("{} may only delete their own content", actor),
    )
}

pub fn parse_username(raw: &str) -> ApiResult<Username> {
    Username::new(raw).map_err(invalid)
}

#[derive(Deserialize)]
pub struct AttachmentPayload {
    pub filename: Option<String>,
    // 标准 base64 编码的文件内容
    pub data: String,
}

impl AttachmentPayload {
    pub fn decode(self) -> ApiResult<Upload> {
        let bytes = B64.decode(self.data.as_bytes()).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Attachment is not valid base64: {}", e),
            )
        })?;
        if bytes.is_empty() {
            return Err(invalid(ValidationError::Empty("attachment")));
        }
        Ok(Upload {
            filename: self.filename,
            bytes,
        })
    }
}
