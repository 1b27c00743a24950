//! 请求令牌（tk）生成模块
//!
//! 翻译接口要求每个请求携带由原文和当前密钥对计算出的 `tk` 参数。
//! 算法必须与服务端逐位一致，所有运算都按32位无符号整数回绕。

use crate::secret::SecretPair;

/// 逐字节混合时使用的模式
const BYTE_PATTERN: &str = "+-a^+6";
/// 全部字节处理完成后的收尾模式
const FINAL_PATTERN: &str = "+-3^+b+-f";

/// 将文本拆分为多字节编码后的字节序列
///
/// 按UTF-16码元逐个处理：小于128为1字节，小于2048为2字节，
/// 代理对合并为一个码点后编码为4字节，其余为3字节。
/// 对合法的Rust字符串，结果与 `text.as_bytes()` 相同。
pub fn encode_bytes(text: &str) -> Vec<u8> {
    let units: Vec<u32> = text.encode_utf16().map(u32::from).collect();
    let mut bytes = Vec::with_capacity(units.len() * 3);
    let mut i = 0;

    while i < units.len() {
        let unit = units[i];
        if unit < 0x80 {
            bytes.push(unit as u8);
        } else if unit < 0x800 {
            bytes.push(((unit >> 6) | 0xC0) as u8);
            bytes.push(((unit & 0x3F) | 0x80) as u8);
        } else if (unit & 0xFC00) == 0xD800
            && i + 1 < units.len()
            && (units[i + 1] & 0xFC00) == 0xDC00
        {
            let code_point = 0x10000 + ((unit & 0x3FF) << 10) + (units[i + 1] & 0x3FF);
            i += 1;
            bytes.push(((code_point >> 18) | 0xF0) as u8);
            bytes.push((((code_point >> 12) & 0x3F) | 0x80) as u8);
            bytes.push((((code_point >> 6) & 0x3F) | 0x80) as u8);
            bytes.push(((code_point & 0x3F) | 0x80) as u8);
        } else {
            bytes.push(((unit >> 12) | 0xE0) as u8);
            bytes.push((((unit >> 6) & 0x3F) | 0x80) as u8);
            bytes.push(((unit & 0x3F) | 0x80) as u8);
        }
        i += 1;
    }

    bytes
}

/// 位混合函数
///
/// `pattern` 每3个字符为一步：`op1`、`op2`、`shift`。
/// `op2` 为 `+` 时右移，否则左移；`op1` 为 `+` 时回绕相加，否则异或。
pub fn scramble(value: u32, pattern: &str) -> u32 {
    pattern
        .as_bytes()
        .chunks_exact(3)
        .fold(value, |acc, step| {
            let shift = shift_amount(step[2]);
            let mixed = if step[1] == b'+' {
                acc >> shift
            } else {
                acc << shift
            };
            if step[0] == b'+' {
                acc.wrapping_add(mixed)
            } else {
                acc ^ mixed
            }
        })
}

/// `0`-`9` 为数字本身，小写字母 `a`-`z` 表示10-35
fn shift_amount(c: u8) -> u32 {
    let amount = if c >= b'a' {
        u32::from(c) - 87
    } else {
        char::from(c).to_digit(10).unwrap_or(0)
    };
    amount & 31
}

/// 计算文本在给定密钥对下的请求令牌
///
/// 返回 `"<a>.<a ^ base>"` 形式的字符串，其中 `a` 小于 1,000,000。
///
/// ```rust
/// use google_web_translator::{generate_token, SecretPair};
///
/// let token = generate_token("hello", SecretPair::new(434217, 1534559001));
/// assert_eq!(token, "754182.860719");
/// ```
pub fn generate_token(text: &str, secret: SecretPair) -> String {
    // 截断到32位与服务端对超范围数值的处理一致
    let base = secret.base as u32;
    let modifier = secret.modifier as u32;

    let mut acc = base;
    for byte in encode_bytes(text) {
        acc = scramble(acc.wrapping_add(u32::from(byte)), BYTE_PATTERN);
    }
    acc = scramble(acc, FINAL_PATTERN);
    acc ^= modifier;

    // 以无符号数读取即完成负数归一化：(a & 0x7FFFFFFF) + 0x80000000
    let acc = acc % 1_000_000;
    format!("{}.{}", acc, (acc as i32) ^ (base as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: SecretPair = SecretPair {
        base: 434217,
        modifier: 1534559001,
    };

    #[test]
    fn test_golden_tokens() {
        let cases = [
            ("hello", "754182.860719"),
            ("Hello, world!", "889089.733480"),
            ("a", "520888.86673"),
            ("", "527772.961973"),
            ("café", "467437.98756"),
            ("你好", "973515.555746"),
            ("😀", "24374.458527"),
            ("hi 😀 你好 é", "409588.40925"),
        ];

        for (text, expected) in cases {
            assert_eq!(generate_token(text, SECRET), expected, "token for {:?}", text);
        }
    }

    #[test]
    fn test_token_wraps_out_of_range_secret() {
        assert_eq!(
            generate_token("hello", SecretPair::new(3_000_000_000, 4_000_000_000)),
            "406332.-1294570180"
        );
        assert_eq!(generate_token("hello", SecretPair::new(445678, 0)), "45867.425925");
    }

    #[test]
    fn test_byte_counts_follow_utf8() {
        assert_eq!(encode_bytes("a").len(), 1);
        assert_eq!(encode_bytes("é").len(), 2);
        assert_eq!(encode_bytes("你").len(), 3);
        assert_eq!(encode_bytes("😀").len(), 4);
        assert_eq!(encode_bytes("é你😀"), vec![0xC3, 0xA9, 0xE4, 0xBD, 0xA0, 0xF0, 0x9F, 0x98, 0x80]);
    }

    #[test]
    fn test_encode_bytes_matches_utf8() {
        for text in ["plain ascii", "Grüße", "日本語のテキスト", "🦀 rust 🦀", "\u{10FFFF}\u{7FF}\u{800}"] {
            assert_eq!(encode_bytes(text), text.as_bytes());
        }
    }

    #[test]
    fn test_scramble_byte_pattern() {
        assert_eq!(scramble(0, BYTE_PATTERN), 0);
        // 104 + (104 << 10) = 106600; 106600 ^ (106600 >> 6) = 108265
        assert_eq!(scramble(104, BYTE_PATTERN), 108265);
        assert_eq!(scramble(434321, BYTE_PATTERN), 451069699);
    }

    #[test]
    fn test_scramble_final_pattern() {
        assert_eq!(scramble(123456789, FINAL_PATTERN), 2075128571);
        assert_eq!(scramble((-5i32) as u32, FINAL_PATTERN), 4294311980);
    }

    #[test]
    fn test_shift_amount() {
        assert_eq!(shift_amount(b'6'), 6);
        assert_eq!(shift_amount(b'a'), 10);
        assert_eq!(shift_amount(b'f'), 15);
    }
}
