use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use std::fmt;

/// Fixed message shown for every rejected credential.
pub const UNAUTHORIZED_MESSAGE: &str = "Bạn phải sử dụng email do nhà trường cung cấp";

/// Error returned by service functions; rendered as `{"error": ...}` with
/// the matching status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(String),
    /// The request would break the class-subject capacity invariant.
    Conflict(String),
    /// An import or bulk submission that failed validation; one message per problem.
    Rejected(Vec<String>),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::Unauthorized => write!(f, "{}", UNAUTHORIZED_MESSAGE),
            ApiError::Forbidden => write!(f, "Bạn không có quyền thực hiện thao tác này"),
            ApiError::NotFound(what) => write!(f, "Không tìm thấy {}", what),
            ApiError::Conflict(msg) => write!(f, "{}", msg),
            ApiError::Rejected(errors) => write!(f, "{} lỗi kiểm tra dữ liệu", errors.len()),
            ApiError::Internal(msg) => write!(f, "Lỗi máy chủ: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Rejected(errors) => serde_json::json!({
                "error": self.to_string(),
                "errors": errors,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => ApiError::NotFound("bản ghi".to_string()),
            rusqlite::Error::SqliteFailure(ref code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ApiError::Conflict(format!("Dữ liệu bị ràng buộc: {}", e))
            }
            other => {
                error!("database error: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        error!("io error: {}", e);
        ApiError::Internal(e.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(e: csv::Error) -> Self {
        ApiError::BadRequest(format!("Không đọc được tệp CSV: {}", e))
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("Dữ liệu tải lên không hợp lệ: {}", e))
    }
}
