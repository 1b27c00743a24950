//! HTML转义工具

/// 转义 `&`、`<`、`>`、`"`、`'`
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 每个 `\n` 和 `\r` 都替换为 `<br/>`
pub fn newlines_to_br(text: &str) -> String {
    text.replace(['\n', '\r'], "<br/>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html(r#"say "hi" 'there'"#), "say &quot;hi&quot; &#39;there&#39;");
        assert_eq!(escape_html("纯文本"), "纯文本");
    }

    #[test]
    fn test_newlines_to_br() {
        assert_eq!(newlines_to_br("a\nb"), "a<br/>b");
        assert_eq!(newlines_to_br("a\r\nb"), "a<br/><br/>b");
    }
}
