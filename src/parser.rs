//! 翻译响应解析模块
//!
//! 翻译接口返回的是按位置寻址的嵌套JSON数组，字段含义完全由下标决定：
//!
//! | 下标 | 内容 |
//! |------|------|
//! | 0    | `[译文片段, 原文片段, 译文读音?, 原文读音?]` 列表 |
//! | 1    | `[词性, [释义, ...]]` 列表 |
//! | 2    | 检测到的源语言 |
//! | 12   | `[词性, [[定义, _, 例子], ...]]` 列表 |
//! | 13   | `[[[例句], ...]]` |
//!
//! 每个数据块独立解析。某个数据块格式异常时记录警告并省略对应字段，
//! 其余字段照常返回，解析本身从不失败。

use serde_json::Value;
use tracing::warn;

use crate::html::{escape_html, newlines_to_br};
use crate::types::{Definition, DetailedMeaning, Example, ParsedResult};

const TRANSLATIONS: usize = 0;
const DICTIONARY: usize = 1;
const SOURCE_LANGUAGE: usize = 2;
const DEFINITIONS: usize = 12;
const EXAMPLES: usize = 13;

/// 数据块内部的格式异常，只用于日志
#[derive(Debug)]
struct ParseAnomaly(String);

type Section<T> = std::result::Result<T, ParseAnomaly>;

impl ParseAnomaly {
    fn new(what: impl Into<String>) -> Self {
        Self(what.into())
    }
}

/// 位置响应的具名访问器
#[derive(Debug, Clone, Copy)]
pub struct RawResponse<'a> {
    sections: &'a [Value],
}

impl<'a> RawResponse<'a> {
    /// 顶层不是数组时返回 `None`
    pub fn new(raw: &'a Value) -> Option<Self> {
        raw.as_array().map(|sections| Self { sections })
    }

    /// 下标存在且非空时返回该数据块
    fn section(&self, index: usize) -> Option<&'a Value> {
        self.sections.get(index).filter(|value| is_present(value))
    }

    pub fn translations(&self) -> Option<&'a Value> {
        self.section(TRANSLATIONS)
    }

    pub fn dictionary(&self) -> Option<&'a Value> {
        self.section(DICTIONARY)
    }

    pub fn source_language(&self) -> Option<&'a Value> {
        self.section(SOURCE_LANGUAGE)
    }

    pub fn definitions(&self) -> Option<&'a Value> {
        self.section(DEFINITIONS)
    }

    pub fn examples(&self) -> Option<&'a Value> {
        self.section(EXAMPLES)
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

/// 解析翻译响应
///
/// ```rust
/// use google_web_translator::parse_response;
///
/// let raw = serde_json::json!([[["Hallo", "Hello"]], null, "en"]);
/// let result = parse_response(&raw);
/// assert_eq!(result.main_meaning.as_deref(), Some("Hallo"));
/// assert_eq!(result.detected_source_language.as_deref(), Some("en"));
/// assert!(result.definitions.is_none());
/// ```
pub fn parse_response(raw: &Value) -> ParsedResult {
    let mut result = ParsedResult::default();
    let Some(response) = RawResponse::new(raw) else {
        warn!("Translation response is not an array, nothing to parse");
        return result;
    };

    if let Some(entries) = response.translations() {
        if let Some((main_meaning, original_text)) = recover("translations", translation_text(entries)) {
            result.main_meaning = Some(main_meaning);
            result.original_text = Some(original_text);
        }
        if let Some((target, source)) = recover("pronunciations", pronunciations(entries)) {
            result.target_pronunciation = target;
            result.source_pronunciation = source;
        }
    }

    result.detailed_meanings = response
        .dictionary()
        .and_then(|section| recover("dictionary", detailed_meanings(section)));
    result.detected_source_language = response
        .source_language()
        .and_then(|section| recover("source language", source_language(section)));
    result.definitions = response
        .definitions()
        .and_then(|section| recover("definitions", definitions(section)));
    result.examples = response
        .examples()
        .and_then(|section| recover("examples", examples(section)));

    result
}

/// 取出响应下标2处的源语言，语言检测直接使用该值
pub fn detected_language(raw: &Value) -> Option<String> {
    RawResponse::new(raw)?
        .source_language()
        .and_then(|section| recover("source language", source_language(section)))
}

fn recover<T>(section: &str, parsed: Section<T>) -> Option<T> {
    parsed
        .map_err(|anomaly| warn!("Skipping malformed {} section: {}", section, anomaly.0))
        .ok()
}

fn as_list<'a>(value: &'a Value, what: &str) -> Section<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ParseAnomaly::new(format!("{} is not an array: {}", what, value)))
}

/// 必需的字符串字段
fn text_at(entry: &[Value], index: usize, what: &str) -> Section<String> {
    match entry.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(ParseAnomaly::new(format!("{} is not a string: {:?}", what, other))),
    }
}

/// 可选的字符串字段，缺失或为 `null` 时返回 `None`
fn optional_text_at(entry: &[Value], index: usize, what: &str) -> Section<Option<String>> {
    match entry.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ParseAnomaly::new(format!("{} is not a string: {}", what, other))),
    }
}

/// 拼接所有条目的译文片段和原文片段，`null` 片段视为空串
fn translation_text(entries: &Value) -> Section<(String, String)> {
    let mut translated = String::new();
    let mut original = String::new();

    for entry in as_list(entries, "translation entries")? {
        let entry = as_list(entry, "translation entry")?;
        translated.push_str(&optional_text_at(entry, 0, "translated fragment")?.unwrap_or_default());
        original.push_str(&optional_text_at(entry, 1, "original fragment")?.unwrap_or_default());
    }

    Ok((newlines_to_br(&escape_html(&translated)), escape_html(&original)))
}

/// 最后一个条目中的 (译文读音, 原文读音)，空串视为缺失
fn pronunciations(entries: &Value) -> Section<(Option<String>, Option<String>)> {
    let last = match as_list(entries, "translation entries")?.last() {
        Some(last) => as_list(last, "pronunciation entry")?,
        None => return Ok((None, None)),
    };

    let non_empty = |text: Option<String>| text.filter(|t| !t.is_empty()).map(|t| escape_html(&t));
    let target = optional_text_at(last, 2, "target pronunciation")?;
    let source = optional_text_at(last, 3, "source pronunciation")?;
    Ok((non_empty(target), non_empty(source)))
}

fn detailed_meanings(section: &Value) -> Section<Vec<DetailedMeaning>> {
    as_list(section, "dictionary")?
        .iter()
        .map(|item| {
            let item = as_list(item, "dictionary entry")?;
            let part_of_speech = text_at(item, 0, "part of speech")?;
            let meanings = item
                .get(1)
                .ok_or_else(|| ParseAnomaly::new("dictionary entry has no meanings"))?;
            let meanings = as_list(meanings, "meanings")?
                .iter()
                .map(|m| {
                    m.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ParseAnomaly::new(format!("meaning is not a string: {}", m)))
                })
                .collect::<Section<Vec<_>>>()?;
            Ok(DetailedMeaning {
                part_of_speech,
                meaning: meanings.join(", "),
            })
        })
        .collect()
}

fn source_language(section: &Value) -> Section<String> {
    section
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ParseAnomaly::new(format!("source language is not a string: {}", section)))
}

fn definitions(section: &Value) -> Section<Vec<Definition>> {
    let mut definitions = Vec::new();

    for item in as_list(section, "definitions")? {
        let item = as_list(item, "definition group")?;
        let part_of_speech = text_at(item, 0, "part of speech")?;
        let elements = item
            .get(1)
            .ok_or_else(|| ParseAnomaly::new("definition group has no entries"))?;

        for element in as_list(elements, "definition entries")? {
            let element = as_list(element, "definition entry")?;
            definitions.push(Definition {
                part_of_speech: part_of_speech.clone(),
                meaning: text_at(element, 0, "definition")?,
                example: optional_text_at(element, 2, "definition example")?,
            });
        }
    }

    Ok(definitions)
}

fn examples(section: &Value) -> Section<Vec<Example>> {
    let mut examples = Vec::new();

    for group in as_list(section, "examples")? {
        for element in as_list(group, "example group")? {
            let element = as_list(element, "example")?;
            examples.push(Example {
                source: None,
                target: text_at(element, 0, "example text")?,
            });
        }
    }

    Ok(examples)
}
