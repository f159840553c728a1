// src/common/error.rs

use thiserror::Error;

/// Crate-wide error type.
///
/// The taxonomy mirrors how failures are recovered: validation and duplicate
/// conflicts stop an operation before any network call and keep the form
/// open; token errors force a re-login; network/API errors propagate to the
/// initiating action, which reports them without mutating local state.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dữ liệu không hợp lệ")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Thiếu trường bắt buộc: {0}")]
    MissingField(&'static str),

    #[error("Số điện thoại {phone} đã tồn tại (khách hàng: {existing})")]
    DuplicatePhone { phone: String, existing: String },

    #[error("Mã số thuế {tax_code} đã tồn tại (khách hàng: {existing})")]
    DuplicateTaxCode { tax_code: String, existing: String },

    #[error("Chưa đăng nhập")]
    TokenMissing,

    #[error("Phiên đăng nhập đã hết hạn")]
    TokenExpired,

    // Malformed token payload (taxonomy: mapping/decoding error).
    #[error("Token không hợp lệ")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Lỗi kết nối: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Dataverse trả về lỗi {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Không đọc được dữ liệu trả về")]
    Decode(#[from] serde_json::Error),

    #[error("Lỗi lưu trữ cục bộ")]
    Storage(#[from] std::io::Error),

    #[error("Lỗi không xác định")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors the form recovers from locally (the operation simply
    /// does not proceed; no remote state was touched).
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::MissingField(_)
                | Self::DuplicatePhone { .. }
                | Self::DuplicateTaxCode { .. }
        )
    }
}
