//! 错误处理体系 (Error Handling System)
//!
//! 定义抓取链路的错误分类、对外状态码映射以及全局 Result 别名。

use http::StatusCode;
use thiserror::Error;

/// 抓取失败的具体原因 (Fetch Failure Cause)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    /// 请求或读取响应超时
    Timeout,
    /// 连接建立失败或被重置
    Connect,
    /// 源站返回非 2xx 状态码
    Status(StatusCode),
    /// 响应体读取或解码失败
    Body,
    /// URL 无法被解析
    InvalidUrl,
    /// 调用方已放弃查询
    Cancelled,
    Other(String),
}

impl FetchCause {
    /// 是否属于可重试的瞬时故障
    ///
    /// 超时、连接错误、5xx 与 429 可重试；其余 4xx、非法 URL 与取消立即失败。
    pub fn is_transient(&self) -> bool {
        match self {
            FetchCause::Timeout | FetchCause::Connect | FetchCause::Body => true,
            FetchCause::Status(code) => {
                code.is_server_error() || *code == StatusCode::TOO_MANY_REQUESTS
            }
            FetchCause::InvalidUrl | FetchCause::Cancelled | FetchCause::Other(_) => false,
        }
    }

    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchCause::Timeout
        } else if e.is_connect() {
            FetchCause::Connect
        } else if let Some(status) = e.status() {
            FetchCause::Status(status)
        } else if e.is_body() || e.is_decode() {
            FetchCause::Body
        } else if e.is_builder() {
            FetchCause::InvalidUrl
        } else if e.is_request() {
            FetchCause::Connect
        } else {
            FetchCause::Other(e.to_string())
        }
    }
}

impl std::fmt::Display for FetchCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchCause::Timeout => write!(f, "timeout"),
            FetchCause::Connect => write!(f, "connection failed"),
            FetchCause::Status(code) => write!(f, "HTTP {}", code),
            FetchCause::Body => write!(f, "unreadable body"),
            FetchCause::InvalidUrl => write!(f, "invalid url"),
            FetchCause::Cancelled => write!(f, "cancelled"),
            FetchCause::Other(s) => write!(f, "{}", s),
        }
    }
}

/// 网络抓取错误，携带最终原因与尝试次数
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fetch {url} failed after {attempts} attempt(s): {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
    pub attempts: u32,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchCause, attempts: u32) -> Self {
        Self {
            url: url.into(),
            cause,
            attempts,
        }
    }

    /// 源站明确回应资源不存在
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.cause,
            FetchCause::Status(StatusCode::NOT_FOUND) | FetchCause::Status(StatusCode::GONE)
        )
    }
}

/// 对外暴露的错误类别 (Boundary Error Kinds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Fetch,
    Extraction,
    Validation,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// 边界层使用的 HTTP 状态码
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Fetch => StatusCode::BAD_GATEWAY,
            ErrorKind::Extraction => StatusCode::BAD_GATEWAY,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 全局错误定义 (Gallery Domain Errors)
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, GalleryError>;

impl GalleryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GalleryError::Fetch(e) if e.is_not_found() => ErrorKind::NotFound,
            GalleryError::Fetch(_) => ErrorKind::Fetch,
            GalleryError::Extraction(_) => ErrorKind::Extraction,
            GalleryError::Validation(_) => ErrorKind::Validation,
            GalleryError::NotFound(_) => ErrorKind::NotFound,
            GalleryError::Config(_) | GalleryError::Serialization(_) | GalleryError::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    /// 面向调用方的简短描述，不暴露内部错误链
    pub fn public_message(&self) -> String {
        match self {
            GalleryError::Validation(msg) | GalleryError::NotFound(msg) => msg.clone(),
            GalleryError::Fetch(e) if e.is_not_found() => "Resource not found on origin".into(),
            GalleryError::Fetch(_) => "Origin site unreachable".into(),
            GalleryError::Extraction(_) => "Origin page could not be understood".into(),
            _ => "Internal error".into(),
        }
    }
}
