//! 类型定义模块
//!
//! 定义客户端配置、翻译请求以及解析后的词典式翻译结果。

use serde::{Deserialize, Serialize};

use crate::secret::SecretPair;

/// 静态的响应详情参数，选择翻译、备选、词典、例句、释义等数据块
const DETAIL_PARAMS: &str =
    "ie=UTF-8&client=webapp&otf=1&ssel=0&tsel=0&kc=5&dt=t&dt=at&dt=bd&dt=ex&dt=md&dt=rw&dt=ss&dt=rm";

/// 翻译客户端配置
///
/// # 字段说明
///
/// * `host` - 翻译服务主页地址，刷新密钥对时抓取该页面
/// * `api_path` - 翻译接口相对于 `host` 的路径
/// * `user_agent` - 请求使用的 User-Agent
/// * `timeout_secs` - HTTP请求超时（秒）
/// * `max_retries` - 收到429后刷新密钥并重试的最大次数
/// * `detect_target_lang` - 语言检测请求使用的目标语言
/// * `secret` - 初始密钥对（TKK）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// 翻译服务主页地址
    pub host: String,
    /// 翻译接口路径
    pub api_path: String,
    /// User-Agent
    pub user_agent: String,
    /// HTTP请求超时（秒）
    pub timeout_secs: u64,
    /// 速率限制后的最大重试次数
    pub max_retries: usize,
    /// 语言检测使用的目标语言
    pub detect_target_lang: String,
    /// 初始密钥对
    pub secret: SecretPair,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            host: "https://translate.google.cn/".to_string(),
            api_path: "translate_a/single".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            detect_target_lang: "zh-cn".to_string(),
            secret: SecretPair::default(),
        }
    }
}

impl TranslatorConfig {
    /// 翻译接口的基础URL，已包含全部静态参数
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}?{}",
            self.host.trim_end_matches('/'),
            self.api_path.trim_start_matches('/'),
            DETAIL_PARAMS
        )
    }
}

/// 一次翻译请求
///
/// 不可变的值对象，`from` 为 `"auto"` 时由服务自动检测源语言。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationQuery {
    pub text: String,
    pub from: String,
    pub to: String,
}

impl TranslationQuery {
    pub fn new(text: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// 词性及其对应的全部释义，释义以 ", " 连接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMeaning {
    pub part_of_speech: String,
    pub meaning: String,
}

/// 单词定义及可选的用法示例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub part_of_speech: String,
    pub meaning: String,
    pub example: Option<String>,
}

/// 例句。服务只返回目标文本，`source` 始终为空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub source: Option<String>,
    pub target: String,
}

/// 解析后的翻译结果
///
/// 所有字段相互独立：响应中缺少对应数据块时字段为 `None`，序列化时省略。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResult {
    /// 原文（已转义HTML）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// 主要译文（已转义HTML，换行替换为 `<br/>`）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_meaning: Option<String>,
    /// 原文读音
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_pronunciation: Option<String>,
    /// 译文读音
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pronunciation: Option<String>,
    /// 检测到的源语言代码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_source_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_meanings: Option<Vec<DetailedMeaning>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Vec<Definition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
}
