//! 脚本化的HTTP传输，用于离线测试
//!
//! # 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use google_web_translator::{GoogleTranslator, HttpResponse, ScriptedTransport, TranslatorConfig};
//!
//! # tokio_test::block_on(async {
//! let config = TranslatorConfig::default();
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.respond(&config.base_url(), HttpResponse::new(200, r#"[null,null,"en"]"#));
//!
//! let translator = GoogleTranslator::with_transport(config, transport.clone());
//! assert_eq!(translator.detect_language("hello").await.unwrap(), "en");
//! assert_eq!(transport.requests().len(), 1);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, TranslatorError};
use crate::transport::{HttpResponse, HttpTransport};

#[derive(Debug, Default)]
struct Route {
    prefix: String,
    queued: VecDeque<HttpResponse>,
    fallback: Option<HttpResponse>,
}

/// 按URL前缀回放预设响应的传输
///
/// 同一请求匹配多个前缀时取最长者。每个前缀先依次返回 `respond_once`
/// 排队的响应，用完后返回 `respond` 设置的固定响应。所有请求URL都会被记录。
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为前缀设置固定响应
    pub fn respond(&self, prefix: &str, response: HttpResponse) {
        self.with_route(prefix, |route| route.fallback = Some(response));
    }

    /// 为前缀追加一次性响应
    pub fn respond_once(&self, prefix: &str, response: HttpResponse) {
        self.with_route(prefix, |route| route.queued.push_back(response));
    }

    /// 已收到的全部请求URL
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// 与 `url` 完全相同的请求次数
    pub fn count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    fn with_route(&self, prefix: &str, update: impl FnOnce(&mut Route)) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes.iter_mut().find(|r| r.prefix == prefix) {
            Some(route) => update(route),
            None => {
                let mut route = Route {
                    prefix: prefix.to_string(),
                    ..Route::default()
                };
                update(&mut route);
                routes.push(route);
            }
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes
            .iter_mut()
            .filter(|r| url.starts_with(&r.prefix))
            .max_by_key(|r| r.prefix.len())
            .and_then(|route| route.queued.pop_front().or_else(|| route.fallback.clone()))
            .ok_or_else(|| TranslatorError::UnexpectedResponse(format!("no scripted response for {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let transport = ScriptedTransport::new();
        transport.respond("https://h/", HttpResponse::new(200, "page"));
        transport.respond("https://h/api", HttpResponse::new(200, "api"));

        assert_eq!(transport.get("https://h/").await.unwrap().body, "page");
        assert_eq!(transport.get("https://h/api?q=1").await.unwrap().body, "api");
        assert_eq!(transport.count("https://h/"), 1);
    }

    #[tokio::test]
    async fn test_queued_before_fallback() {
        let transport = ScriptedTransport::new();
        transport.respond_once("https://h/", HttpResponse::new(429, ""));
        transport.respond("https://h/", HttpResponse::new(200, "ok"));

        assert_eq!(transport.get("https://h/").await.unwrap().status, 429);
        assert_eq!(transport.get("https://h/").await.unwrap().status, 200);
        assert_eq!(transport.get("https://h/").await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_unscripted_url_is_error() {
        let transport = ScriptedTransport::new();
        assert!(transport.get("https://nowhere/").await.is_err());
        assert_eq!(transport.requests(), vec!["https://nowhere/".to_string()]);
    }
}
