//! 密钥对（TKK）管理模块
//!
//! 服务端会定期轮换用于计算请求令牌的密钥对。`SecretStore` 持有当前密钥对，
//! 在需要时抓取服务主页，从页面脚本中提取新值。

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, RwLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, TranslatorError};
use crate::transport::HttpTransport;

/// 计算请求令牌所需的两个整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretPair {
    pub base: i64,
    pub modifier: i64,
}

impl SecretPair {
    pub const fn new(base: i64, modifier: i64) -> Self {
        Self { base, modifier }
    }

    /// 宽松地从文本构造密钥对，无法解析的部分视为0
    pub fn coerce(base: &str, modifier: &str) -> Self {
        Self::new(coerce_number(base), coerce_number(modifier))
    }
}

impl Default for SecretPair {
    /// 已知可用的备用值
    fn default() -> Self {
        Self::new(434217, 1534559001)
    }
}

/// 以服务端使用的 `base.modifier` 记法输出
impl fmt::Display for SecretPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base, self.modifier)
    }
}

impl FromStr for SecretPair {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TranslatorError::Config(format!("invalid secret pair: {:?}", s));
        let (base, modifier) = s.trim().split_once('.').ok_or_else(invalid)?;
        let base = base.parse().map_err(|_| invalid())?;
        let modifier = modifier.parse().map_err(|_| invalid())?;
        Ok(Self::new(base, modifier))
    }
}

fn coerce_number(text: &str) -> i64 {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| n.trunc() as i64)
        })
        .unwrap_or(0)
}

/// `TKK=eval('((function(){var a\x3d4102;var b\x3d-7658;return 434217+\x27.\x27+(a+b)})())');`
fn script_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)TKK=(.*?)\(\)\)'\);").ok())
        .as_ref()
}

fn hex_escape_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\\x[0-9A-Fa-f]{2}").ok())
        .as_ref()
}

fn number_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"[+-]?[0-9]+").ok())
        .as_ref()
}

/// `TKK='434217.1534559001'` 或 `tkk:"434217.1534559001"`
fn quoted_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?i)TKK[=:]['"]([0-9]+?)\.([0-9]+?)['"]"#).ok())
        .as_ref()
}

/// 从服务主页HTML中提取密钥对
///
/// 依次尝试两种写法：
///
/// 1. 脚本形式，去掉 `\xNN` 转义后取出前三个整数 `a`、`b`、`c`，
///    得到 `base = c`、`modifier = a + b`；
/// 2. 引号形式 `"N.M"`，得到 `base = N`、`modifier = M`。
///
/// 两者都不匹配时返回 `None`。
pub fn extract_secret_pair(page: &str) -> Option<SecretPair> {
    extract_from_script(page).or_else(|| extract_from_quoted(page))
}

fn extract_from_script(page: &str) -> Option<SecretPair> {
    let script = script_pattern()?.find(page)?.as_str();
    let script = hex_escape_pattern()?.replace_all(script, "");
    let numbers: Vec<i64> = number_pattern()?
        .find_iter(&script)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    match numbers.as_slice() {
        [a, b, c, ..] => Some(SecretPair::new(*c, a.checked_add(*b)?)),
        _ => None,
    }
}

fn extract_from_quoted(page: &str) -> Option<SecretPair> {
    let captures = quoted_pattern()?.captures(page)?;
    let base = captures.get(1)?.as_str().parse().ok()?;
    let modifier = captures.get(2)?.as_str().parse().ok()?;
    Some(SecretPair::new(base, modifier))
}

/// 密钥对存储
///
/// 持有当前密钥对，并能通过抓取服务主页刷新它。读取不会阻塞刷新之外的操作；
/// 并发的刷新请求依次执行。
pub struct SecretStore {
    pair: RwLock<SecretPair>,
    refresh_lock: Mutex<()>,
    transport: Arc<dyn HttpTransport>,
    host: String,
}

impl SecretStore {
    /// 创建存储
    ///
    /// # 参数
    ///
    /// * `transport` - 用于抓取主页的HTTP传输
    /// * `host` - 服务主页地址
    /// * `initial` - 初始密钥对
    pub fn new(transport: Arc<dyn HttpTransport>, host: impl Into<String>, initial: SecretPair) -> Self {
        Self {
            pair: RwLock::new(initial),
            refresh_lock: Mutex::new(()),
            transport,
            host: host.into(),
        }
    }

    /// 当前密钥对
    pub fn current(&self) -> SecretPair {
        *self.pair.read().unwrap_or_else(|e| e.into_inner())
    }

    /// 直接替换密钥对
    pub fn set(&self, pair: SecretPair) {
        *self.pair.write().unwrap_or_else(|e| e.into_inner()) = pair;
    }

    /// 抓取服务主页并更新密钥对
    ///
    /// 页面中找不到密钥对时保留原值并返回 `Ok(())`；
    /// 网络错误或非2xx响应原样返回，密钥对不变。
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;

        debug!("Fetching secret pair from {}", self.host);
        let response = self.transport.get(&self.host).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }

        match extract_secret_pair(&response.body) {
            Some(pair) => {
                info!("Secret pair refreshed: {} -> {}", self.current(), pair);
                self.set(pair);
            }
            None => {
                warn!("No secret pair found in {}, keeping {}", self.host, self.current());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use crate::transport::HttpResponse;

    const HOST: &str = "https://translate.example.com/";

    #[test]
    fn test_extract_script_form() {
        let page = r"<script>TKK=eval('((function(){var a\x3d4102;var b\x3d-7658;return 434217+\x27.\x27+(a+b)})())');</script>";
        assert_eq!(extract_secret_pair(page), Some(SecretPair::new(434217, -3556)));
    }

    #[test]
    fn test_extract_quoted_form() {
        assert_eq!(
            extract_secret_pair("window.config={tkk:'445678.1234567',lang:'en'}"),
            Some(SecretPair::new(445678, 1234567))
        );
        assert_eq!(
            extract_secret_pair(r#"TKK="434217.1534559001";"#),
            Some(SecretPair::new(434217, 1534559001))
        );
    }

    #[test]
    fn test_extract_without_pattern() {
        assert_eq!(extract_secret_pair("<html><body>nothing here</body></html>"), None);
        assert_eq!(extract_secret_pair("TKK='not.numbers'"), None);
    }

    #[test]
    fn test_script_form_with_too_few_numbers_falls_back() {
        let page = r"TKK=eval('((function(){return 1})())'); var x = {TKK:'12.34'}";
        assert_eq!(extract_secret_pair(page), Some(SecretPair::new(12, 34)));
    }

    #[test]
    fn test_display_and_parse() {
        let pair = SecretPair::new(434217, 1534559001);
        assert_eq!(pair.to_string(), "434217.1534559001");
        assert_eq!("434217.1534559001".parse::<SecretPair>().unwrap(), pair);
        assert!("434217".parse::<SecretPair>().is_err());
        assert!("a.b".parse::<SecretPair>().is_err());
    }

    #[test]
    fn test_coerce_defaults_to_zero() {
        assert_eq!(SecretPair::coerce("434217", " 15 "), SecretPair::new(434217, 15));
        assert_eq!(SecretPair::coerce("abc", "2.9"), SecretPair::new(0, 2));
        assert_eq!(SecretPair::coerce("", "NaN"), SecretPair::new(0, 0));
    }

    #[tokio::test]
    async fn test_refresh_updates_pair() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(HOST, HttpResponse::new(200, "<script>TKK='445678.1234567';</script>"));
        let store = SecretStore::new(transport.clone(), HOST, SecretPair::default());

        store.refresh().await.unwrap();

        assert_eq!(store.current(), SecretPair::new(445678, 1234567));
        assert_eq!(transport.requests(), vec![HOST.to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_keeps_pair_when_nothing_matches() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(HOST, HttpResponse::new(200, "<html></html>"));
        let store = SecretStore::new(transport, HOST, SecretPair::new(1, 2));

        store.refresh().await.unwrap();

        assert_eq!(store.current(), SecretPair::new(1, 2));
    }

    #[test]
    fn test_refresh_propagates_status() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(HOST, HttpResponse::new(503, "unavailable"));
        let store = SecretStore::new(transport, HOST, SecretPair::new(1, 2));

        let err = tokio_test::block_on(store.refresh()).unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(store.current(), SecretPair::new(1, 2));
    }
}
