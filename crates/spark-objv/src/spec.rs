use std::{borrow::Cow, sync::Arc};

use crate::consumer::{
    BoolConsumer, BreakConsumer, Consumer, IndexConsumer, IntConsumer, StringConsumer,
};

/// 条目在用法字符串中的渲染方式。
///
/// 该标签在构造条目时显式给出，渲染时不根据消费者的具体类型做推断。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageForm {
    /// 带值的选项，渲染为 `?-key key?`；位置条目统一使用此形式。
    Value,
    /// 标志型选项，渲染为 `?-key?`。
    Flag,
    /// 选项结束标记，渲染为 `?--?`。
    Separator,
}

/// 一条参数规格：名称（或位置名）、消费者、目标名与用法标签。
///
/// # 教案式注释
///
/// ## 契约 (What)
/// - `key`：选项名（如 `-timeout`）或位置名（如 `path`）；以 `?` 开头的位置名表示可选；
/// - `dest`：写入 [`ObjvBindings`](crate::ObjvBindings) 时使用的目标名，默认去掉一个前导
///   `-` 或 `?`，可通过 [`ObjvSpec::with_dest`] 覆盖；
/// - `form`：用法字符串渲染标签，见 [`UsageForm`]。
#[derive(Clone, Debug)]
pub struct ObjvSpec {
    key: Cow<'static, str>,
    dest: Cow<'static, str>,
    form: UsageForm,
    consumer: Arc<dyn Consumer>,
}

impl ObjvSpec {
    /// 以自定义消费者构造条目。
    pub fn new(
        key: impl Into<Cow<'static, str>>,
        form: UsageForm,
        consumer: impl Consumer + 'static,
    ) -> Self {
        let key = key.into();
        let dest = default_dest(&key);
        Self {
            key,
            dest,
            form,
            consumer: Arc::new(consumer),
        }
    }

    pub fn int(key: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, UsageForm::Value, IntConsumer)
    }

    pub fn string(key: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, UsageForm::Value, StringConsumer { report_len: false })
    }

    /// 字符串条目，同时报告字节长度。
    pub fn string_with_len(key: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, UsageForm::Value, StringConsumer { report_len: true })
    }

    /// 读取一个布尔记号的值型条目。
    pub fn boolean(key: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, UsageForm::Value, BoolConsumer { literal: None })
    }

    /// 标志型布尔选项：出现即绑定 `literal`，不消费后续记号。
    pub fn flag(key: impl Into<Cow<'static, str>>, literal: bool) -> Self {
        Self::new(
            key,
            UsageForm::Flag,
            BoolConsumer {
                literal: Some(literal),
            },
        )
    }

    /// 选项结束标记 `--`。
    pub fn separator() -> Self {
        Self::new("--", UsageForm::Separator, BreakConsumer)
    }

    /// 键名表条目，见 [`IndexConsumer`]。
    pub fn index<I, K>(key: impl Into<Cow<'static, str>>, table: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<Cow<'static, str>>,
    {
        Self::new(key, UsageForm::Value, IndexConsumer::new(table))
    }

    pub fn with_dest(mut self, dest: impl Into<Cow<'static, str>>) -> Self {
        self.dest = dest.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn form(&self) -> UsageForm {
        self.form
    }

    /// 位置条目是否可选（名称以 `?` 开头）。
    pub fn is_optional(&self) -> bool {
        self.key.starts_with('?')
    }

    pub fn consumer(&self) -> &dyn Consumer {
        self.consumer.as_ref()
    }

    /// 作为选项时的用法片段。
    pub(crate) fn option_usage(&self) -> String {
        match self.form {
            UsageForm::Separator => "?--?".to_owned(),
            UsageForm::Flag => format!("?{}?", self.key),
            UsageForm::Value => {
                let name = self.key.strip_prefix('-').unwrap_or(&self.key);
                format!("?{} {}?", self.key, name)
            }
        }
    }

    /// 作为位置参数时的用法片段；可选条目补一个结尾 `?`。
    pub(crate) fn positional_usage(&self) -> String {
        if self.is_optional() {
            format!("{}?", self.key)
        } else {
            self.key.to_string()
        }
    }
}

fn strip_marker(key: &str) -> &str {
    key.strip_prefix('-')
        .or_else(|| key.strip_prefix('?'))
        .unwrap_or(key)
}

fn default_dest(key: &Cow<'static, str>) -> Cow<'static, str> {
    match key {
        Cow::Borrowed(key) => Cow::Borrowed(strip_marker(*key)),
        Cow::Owned(key) => Cow::Owned(strip_marker(key).to_owned()),
    }
}
