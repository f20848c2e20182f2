//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 区分两类失败：参数个数不符的用法错误（可由调用方转告其上游或提示重试），
//!   以及消费者转换/消费失败（立即中止整次解析）。
//!
//! ## 设计要求（What）
//! - 所有错误均派生 `thiserror::Error`，并提供 `objv.*` 前缀的稳定错误码。

use thiserror::Error;

/// 稳定错误码。
pub mod codes {
    pub const USAGE_TOO_FEW: &str = "objv.usage.too_few";
    pub const USAGE_TOO_MANY: &str = "objv.usage.too_many";
    pub const VALUE_MISSING: &str = "objv.value.missing";
    pub const VALUE_CONVERT: &str = "objv.value.convert";
    pub const VALUE_INDEX: &str = "objv.value.index";
    pub const CONSUMER: &str = "objv.consumer";
}

/// 用法错误的具体原因。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageKind {
    /// 必需的位置参数没有可用记号。
    TooFewArguments,
    /// 所有位置规格处理完毕后仍有剩余记号。
    TooManyArguments,
}

/// 参数个数不符。
///
/// # 契约 (What)
/// - `command`：调用前 `offset` 个记号（命令词）以空格连接；
/// - `usage`：按规格重建的用法字符串，例如 `?-n n? path`；
/// - 展示形式为 `wrong # args: should be "<command> <usage>"`。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("wrong # args: should be \"{}\"", join_words(.command, .usage))]
pub struct UsageError {
    kind: UsageKind,
    command: String,
    usage: String,
}

impl UsageError {
    pub fn new(kind: UsageKind, command: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            kind,
            command: command.into(),
            usage: usage.into(),
        }
    }

    pub fn kind(&self) -> UsageKind {
        self.kind
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            UsageKind::TooFewArguments => codes::USAGE_TOO_FEW,
            UsageKind::TooManyArguments => codes::USAGE_TOO_MANY,
        }
    }
}

/// 命令词与用法字符串以单个空格连接，任一侧为空时省略空格。
fn join_words(command: &str, usage: &str) -> String {
    match (command.is_empty(), usage.is_empty()) {
        (true, _) => usage.to_owned(),
        (false, true) => command.to_owned(),
        (false, false) => format!("{command} {usage}"),
    }
}

/// 解析失败。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ObjvError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// 值型选项位于记号末尾，没有可消费的值。
    #[error("missing value for \"{dest}\"")]
    MissingValue { dest: String },
    /// 记号无法转换为目标类型。
    #[error("expected {expected} but got \"{token}\"")]
    Convert {
        dest: String,
        token: String,
        expected: &'static str,
    },
    /// 记号不在索引表中。
    #[error("bad {dest} \"{token}\": must be {choices}")]
    BadIndex {
        dest: String,
        token: String,
        choices: String,
    },
    /// 消费者违反消费约定，或自定义消费者报告的失败。
    #[error("argument \"{dest}\": {reason}")]
    Consumer { dest: String, reason: String },
}

impl ObjvError {
    pub fn code(&self) -> &'static str {
        match self {
            ObjvError::Usage(usage) => usage.code(),
            ObjvError::MissingValue { .. } => codes::VALUE_MISSING,
            ObjvError::Convert { .. } => codes::VALUE_CONVERT,
            ObjvError::BadIndex { .. } => codes::VALUE_INDEX,
            ObjvError::Consumer { .. } => codes::CONSUMER,
        }
    }

    pub fn usage_error(&self) -> Option<&UsageError> {
        match self {
            ObjvError::Usage(usage) => Some(usage),
            _ => None,
        }
    }

    pub(crate) fn consumer(dest: &str, reason: impl Into<String>) -> Self {
        ObjvError::Consumer {
            dest: dest.to_owned(),
            reason: reason.into(),
        }
    }
}
