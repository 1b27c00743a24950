//! 翻译客户端核心模块
//!
//! 组装请求URL、发起请求，并在收到HTTP 429时刷新密钥对后重试。

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, TranslatorError};
use crate::parser::{detected_language, parse_response};
use crate::secret::SecretStore;
use crate::token::generate_token;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{ParsedResult, TranslationQuery, TranslatorConfig};

/// 与 `encodeURIComponent` 相同的保留字符集
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const RATE_LIMITED: u16 = 429;

/// 网页翻译接口客户端
///
/// 持有HTTP传输和密钥对存储。每次请求都会用当前密钥对重新计算令牌；
/// 收到429时刷新密钥对并重试，最多 `max_retries` 次，之后返回最后一个429响应。
///
/// # 示例
///
/// ```rust,no_run
/// use google_web_translator::{GoogleTranslator, TranslatorConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let translator = GoogleTranslator::new(TranslatorConfig::default());
///
///     let result = translator.translate("hello", "en", "zh-CN").await?;
///     println!("{:?}", result.main_meaning);
///
///     let language = translator.detect_language("bonjour").await?;
///     println!("{}", language);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct GoogleTranslator {
    transport: Arc<dyn HttpTransport>,
    secrets: Arc<SecretStore>,
    config: TranslatorConfig,
}

impl GoogleTranslator {
    /// 使用基于 `reqwest` 的默认传输创建客户端
    pub fn new(config: TranslatorConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(&config));
        Self::with_transport(config, transport)
    }

    /// 使用自定义传输创建客户端
    pub fn with_transport(config: TranslatorConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let secrets = Arc::new(SecretStore::new(
            transport.clone(),
            config.host.clone(),
            config.secret,
        ));
        Self {
            transport,
            secrets,
            config,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// 密钥对存储，克隆出的客户端共享同一个存储
    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    /// 文本在当前密钥对下的令牌
    pub fn token(&self, text: &str) -> String {
        generate_token(text, self.secrets.current())
    }

    /// 构造请求URL，令牌按当前密钥对计算
    pub fn build_url(&self, query: &TranslationQuery) -> String {
        format!(
            "{}&sl={}&tl={}&tk={}&q={}",
            self.config.base_url(),
            utf8_percent_encode(&query.from, URI_COMPONENT),
            utf8_percent_encode(&query.to, URI_COMPONENT),
            self.token(&query.text),
            utf8_percent_encode(&query.text, URI_COMPONENT)
        )
    }

    /// 翻译文本
    ///
    /// # 参数
    ///
    /// * `text` - 原文
    /// * `from` - 源语言代码，`"auto"` 表示自动检测
    /// * `to` - 目标语言代码
    ///
    /// # 返回
    ///
    /// * `Ok(ParsedResult)` - 解析后的结果，缺失的数据块对应字段为 `None`
    /// * `Err(TranslatorError)` - 网络错误、非200响应或正文不是JSON
    pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<ParsedResult> {
        let query = TranslationQuery::new(text, from, to);
        let body = self.fetch(&query).await?;
        let raw: Value = serde_json::from_str(&body)?;
        Ok(parse_response(&raw))
    }

    /// 检测文本语言，返回响应下标2处的语言代码
    pub async fn detect_language(&self, text: &str) -> Result<String> {
        let query = TranslationQuery::new(text, "auto", self.config.detect_target_lang.as_str());
        let body = self.fetch(&query).await?;
        let raw: Value = serde_json::from_str(&body)?;
        detected_language(&raw).ok_or_else(|| {
            TranslatorError::UnexpectedResponse("response carries no detected language".to_string())
        })
    }

    /// 发送请求并处理速率限制，成功时返回响应正文
    async fn fetch(&self, query: &TranslationQuery) -> Result<String> {
        let max_retries = self.config.max_retries;
        let mut retries = 0;

        loop {
            let url = self.build_url(query);
            debug!("Requesting translation {} -> {} (attempt {})", query.from, query.to, retries + 1);

            let response = self.transport.get(&url).await?;
            debug!("Translation response status: {}", response.status);

            match response.status {
                200 => return Ok(response.body),
                RATE_LIMITED if retries < max_retries => {
                    retries += 1;
                    warn!(
                        "Rate limited, refreshing secret pair and retrying ({}/{})",
                        retries, max_retries
                    );
                    self.secrets.refresh().await?;
                }
                _ => return Err(response.into_error()),
            }
        }
    }
}
