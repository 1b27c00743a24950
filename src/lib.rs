//! # Google Web Translator
//!
//! 谷歌网页翻译接口的Rust客户端：根据轮换的密钥对（TKK）计算请求令牌，
//! 发起翻译或语言检测请求，并把按位置寻址的JSON响应解析为词典式的结构化结果。
//!
//! ## 主要特性
//!
//! - **令牌生成**: 与服务端逐位一致的 `tk` 参数计算
//! - **密钥刷新**: 收到429时抓取服务主页更新密钥对并自动重试
//! - **容错解析**: 释义、词性、读音、例句等数据块独立解析，单块异常不影响其余结果
//! - **可替换传输**: 通过 `HttpTransport` 接入任意HTTP客户端，内置 `reqwest` 实现
//! - **配置灵活**: 支持TOML配置文件和程序化配置
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use google_web_translator::{GoogleTranslator, TranslatorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = GoogleTranslator::new(TranslatorConfig::default());
//!     let result = translator.translate("Hello, world!", "auto", "zh-CN").await?;
//!     println!("Translation: {:?}", result.main_meaning);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [translator]
//! host = "https://translate.google.cn/"
//! api_path = "translate_a/single"
//! timeout_secs = 30
//! max_retries = 3
//! detect_target_lang = "zh-cn"
//! secret = { base = 434217, modifier = 1534559001 }
//! ```

pub mod config;
pub mod error;
pub mod html;
pub mod mock;
pub mod parser;
pub mod secret;
pub mod token;
pub mod translator;
pub mod transport;
pub mod types;

pub use config::TranslatorFileConfig;
pub use error::{Result, TranslatorError};
pub use mock::ScriptedTransport;
pub use parser::{detected_language, parse_response, RawResponse};
pub use secret::{extract_secret_pair, SecretPair, SecretStore};
pub use token::{generate_token, scramble};
pub use translator::GoogleTranslator;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{
    Definition, DetailedMeaning, Example, ParsedResult, TranslationQuery, TranslatorConfig,
};
