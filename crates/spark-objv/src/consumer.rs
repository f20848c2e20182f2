use std::{borrow::Cow, fmt};

use crate::{
    error::ObjvError,
    value::{ArgValue, ObjvBindings},
};

/// 消费者的三态结果中的成功两态；失败由 `Err` 表达。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// 成功，并从当前位置消费了给定数量的记号（可以为 0）。
    Continue(usize),
    /// 停止选项解析，其余记号全部按位置参数处理。
    Break,
}

/// 规格条目绑定的记号消费者。
///
/// # 教案式注释
///
/// ## 契约 (What)
/// - `dest`：目标名，消费者以此为键写入 `out`；
/// - `tokens`：从当前位置开始的剩余记号，选项阶段不含选项名本身；
/// - 返回 [`Flow::Continue`] 时声明的消费数量不得超过 `tokens.len()`，解析器会校验；
/// - 返回 `Err` 会立即中止整次解析。
pub trait Consumer: fmt::Debug + Send + Sync {
    fn consume(
        &self,
        dest: &str,
        tokens: &[&str],
        out: &mut ObjvBindings,
    ) -> Result<Flow, ObjvError>;
}

fn first<'t>(dest: &str, tokens: &[&'t str]) -> Result<&'t str, ObjvError> {
    tokens.first().copied().ok_or_else(|| ObjvError::MissingValue {
        dest: dest.to_owned(),
    })
}

fn convert_error(dest: &str, token: &str, expected: &'static str) -> ObjvError {
    ObjvError::Convert {
        dest: dest.to_owned(),
        token: token.to_owned(),
        expected,
    }
}

/// 解析整数记号。
///
/// 接受首尾空白、可选的 `+`/`-` 符号，以及 `0x`、`0o`、`0b` 进制前缀；其余按十进制解析。
/// 超出 `i64` 范围返回 `None`。
///
/// 与 Tcl 的 `Tcl_GetIntFromObj` 不同，前导 `0` 不表示八进制：`010` 解析为 10 而不是 8。
///
/// ```
/// use spark_objv::parse_int;
///
/// assert_eq!(parse_int(" -0x10 "), Some(-16));
/// assert_eq!(parse_int("0b101"), Some(5));
/// assert_eq!(parse_int("12abc"), None);
/// ```
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = if let Some(rest) = strip_radix(unsigned, 'x') {
        (16, rest)
    } else if let Some(rest) = strip_radix(unsigned, 'o') {
        (8, rest)
    } else if let Some(rest) = strip_radix(unsigned, 'b') {
        (2, rest)
    } else {
        (10, unsigned)
    };
    // `from_str_radix` 自身也接受符号，这里只允许出现在进制前缀之前的那一个。
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn strip_radix(text: &str, marker: char) -> Option<&str> {
    let rest = text.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

/// 解析布尔记号。
///
/// 接受任意整数（非零为真），以及大小写不敏感的 `true`/`false`/`yes`/`no` 及其唯一前缀、
/// `on`/`off`（`off` 可缩写为 `of`）。单独的 `o` 有歧义，返回 `None`。
///
/// 与 Tcl 的 `Tcl_GetBooleanFromObj` 不同，不接受浮点数文本：`0.0`、`1.5` 返回 `None`。
pub fn parse_bool(text: &str) -> Option<bool> {
    if let Some(number) = parse_int(text) {
        return Some(number != 0);
    }
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "" => return None,
        "on" => return Some(true),
        "of" | "off" => return Some(false),
        other if other.starts_with('o') => return None,
        _ => {}
    }
    if "true".starts_with(&lower) || "yes".starts_with(&lower) {
        Some(true)
    } else if "false".starts_with(&lower) || "no".starts_with(&lower) {
        Some(false)
    } else {
        None
    }
}

/// 消费一个记号并绑定为整数。
#[derive(Clone, Copy, Debug, Default)]
pub struct IntConsumer;

impl Consumer for IntConsumer {
    fn consume(
        &self,
        dest: &str,
        tokens: &[&str],
        out: &mut ObjvBindings,
    ) -> Result<Flow, ObjvError> {
        let token = first(dest, tokens)?;
        let value = parse_int(token).ok_or_else(|| convert_error(dest, token, "integer"))?;
        out.bind(dest, ArgValue::Int(value));
        Ok(Flow::Continue(1))
    }
}

/// 消费一个记号并原样绑定为字符串，可选地同时报告字节长度。
#[derive(Clone, Copy, Debug, Default)]
pub struct StringConsumer {
    pub report_len: bool,
}

impl Consumer for StringConsumer {
    fn consume(
        &self,
        dest: &str,
        tokens: &[&str],
        out: &mut ObjvBindings,
    ) -> Result<Flow, ObjvError> {
        let token = first(dest, tokens)?;
        let len = self.report_len.then_some(token.len());
        out.bind(
            dest,
            ArgValue::Str {
                value: token.to_owned(),
                len,
            },
        );
        Ok(Flow::Continue(1))
    }
}

/// 布尔消费者。
///
/// `literal` 为 `Some` 时是标志型选项：不读取记号，直接绑定该字面量；
/// 为 `None` 时消费一个记号并按 [`parse_bool`] 转换。
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolConsumer {
    pub literal: Option<bool>,
}

impl Consumer for BoolConsumer {
    fn consume(
        &self,
        dest: &str,
        tokens: &[&str],
        out: &mut ObjvBindings,
    ) -> Result<Flow, ObjvError> {
        if let Some(literal) = self.literal {
            out.bind(dest, ArgValue::Bool(literal));
            return Ok(Flow::Continue(0));
        }
        let token = first(dest, tokens)?;
        let value = parse_bool(token).ok_or_else(|| convert_error(dest, token, "boolean"))?;
        out.bind(dest, ArgValue::Bool(value));
        Ok(Flow::Continue(1))
    }
}

/// 选项结束标记（`--`）的消费者：总是要求停止选项解析。
#[derive(Clone, Copy, Debug, Default)]
pub struct BreakConsumer;

impl Consumer for BreakConsumer {
    fn consume(&self, _: &str, _: &[&str], _: &mut ObjvBindings) -> Result<Flow, ObjvError> {
        Ok(Flow::Break)
    }
}

/// 按键名表查值的消费者：记号必须与某个键完全相等，绑定对应的整数值。
#[derive(Clone, Debug)]
pub struct IndexConsumer {
    table: Vec<(Cow<'static, str>, i64)>,
}

impl IndexConsumer {
    pub fn new<I, K>(table: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<Cow<'static, str>>,
    {
        Self {
            table: table.into_iter().map(|(key, value)| (key.into(), value)).collect(),
        }
    }

    /// 按解释器惯例渲染候选列表：`a`、`a or b`、`a, b, or c`。
    fn choices(&self) -> String {
        let keys: Vec<&str> = self.table.iter().map(|(key, _)| key.as_ref()).collect();
        match keys.as_slice() {
            [] => String::new(),
            [only] => (*only).to_owned(),
            [a, b] => format!("{a} or {b}"),
            [init @ .., last] => format!("{}, or {last}", init.join(", ")),
        }
    }
}

impl Consumer for IndexConsumer {
    fn consume(
        &self,
        dest: &str,
        tokens: &[&str],
        out: &mut ObjvBindings,
    ) -> Result<Flow, ObjvError> {
        let token = first(dest, tokens)?;
        let value = self
            .table
            .iter()
            .find(|(key, _)| key == token)
            .map(|(_, value)| *value)
            .ok_or_else(|| ObjvError::BadIndex {
                dest: dest.to_owned(),
                token: token.to_owned(),
                choices: self.choices(),
            })?;
        out.bind(dest, ArgValue::Int(value));
        Ok(Flow::Continue(1))
    }
}
