//! 错误处理模块
//!
//! 定义翻译客户端中使用的错误类型。
//!
//! 传输层和协议层的错误会作为调用失败返回给调用方；响应体内部某个可选
//! 字段的格式异常不会成为错误，解析器会记录日志并省略该字段。

use thiserror::Error;

/// 翻译客户端错误类型
///
/// # 变体说明
///
/// * `Http` - 网络请求失败（DNS、连接重置等），不会重试
/// * `Status` - 非200的HTTP响应，包括重试次数用尽后的最后一个429响应
/// * `Json` - 200响应的正文不是合法JSON
/// * `UnexpectedResponse` - 响应结构中缺少调用必需的值
/// * `Config` - 配置文件读写错误
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// HTTP请求错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务返回的非200响应
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP状态码
        status: u16,
        /// 响应正文
        body: String,
    },

    /// 响应正文解码失败
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// 响应中缺少必要的值
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// 配置错误
    #[error("config error: {0}")]
    Config(String),
}

impl TranslatorError {
    /// 是否为速率限制响应（HTTP 429）
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TranslatorError::Status { status: 429, .. })
    }

    /// 返回HTTP状态码（仅 `Status` 变体）
    pub fn status(&self) -> Option<u16> {
        match self {
            TranslatorError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 结果类型别名
///
/// ```rust
/// use google_web_translator::{Result, TranslatorError};
///
/// fn example_function() -> Result<String> {
///     Err(TranslatorError::Config("missing host".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TranslatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_status() {
        let err = TranslatorError::Status {
            status: 429,
            body: "Too Many Requests".to_string(),
        };
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "unexpected HTTP status 429: Too Many Requests");
    }

    #[test]
    fn test_other_errors_are_not_rate_limited() {
        let err = TranslatorError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(!err.is_rate_limited());

        let err = TranslatorError::UnexpectedResponse("no language".to_string());
        assert!(!err.is_rate_limited());
        assert_eq!(err.status(), None);
    }
}
