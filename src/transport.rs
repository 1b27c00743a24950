//! HTTP传输模块
//!
//! 翻译客户端只需要发起GET请求并读取状态码和正文。`HttpTransport` 把这一点
//! 抽象出来，默认实现基于 `reqwest`，测试中可以替换为 [`ScriptedTransport`]。
//!
//! [`ScriptedTransport`]: crate::mock::ScriptedTransport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::error::{Result, TranslatorError};
use crate::types::TranslatorConfig;

/// 一次HTTP响应的状态码和正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 状态码是否为2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 将响应转换为 `TranslatorError::Status`
    pub fn into_error(self) -> TranslatorError {
        TranslatorError::Status {
            status: self.status,
            body: self.body,
        }
    }
}

/// HTTP传输接口
///
/// 非2xx状态码以 `Ok(HttpResponse)` 返回，只有网络层失败才是错误，
/// 调用方据此区分速率限制和传输错误。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发起GET请求
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// 基于 `reqwest` 的默认传输
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 按配置中的超时和User-Agent创建客户端
    pub fn new(config: &TranslatorConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to create configured client: {}, using default", e);
                Client::new()
            });

        Self { client }
    }

    /// 使用已有的 `reqwest::Client`
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
    }

    #[test]
    fn test_into_error_keeps_response() {
        let err = HttpResponse::new(429, "slow down").into_error();
        assert!(err.is_rate_limited());
        match err {
            TranslatorError::Status { body, .. } => assert_eq!(body, "slow down"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reqwest_transport_builds_from_config() {
        let transport = ReqwestTransport::new(&TranslatorConfig::default());
        let _ = ReqwestTransport::with_client(transport.client.clone());
    }
}
