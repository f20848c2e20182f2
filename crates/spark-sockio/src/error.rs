use std::{io, time::Duration};

use thiserror::Error;

/// 稳定错误码，遵循 `<域>.<语义>` 命名。
pub mod codes {
    /// 底层发送失败（含等待后再次 `WouldBlock`）。
    pub const WRITE_IO: &str = "sockio.write.io";
    /// 等待可写超时。
    pub const WRITE_TIMEOUT: &str = "sockio.write.timeout";
}

/// 整批写出失败的原因。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 调用方需要区分“对端读得太慢”与“连接已损坏”：前者通常关闭慢连接，后者记录断链；
/// - 失败前已经写出的字节不会回滚，因此每个变体都携带 `sent`，调用方据此判断对端
///   可能已经收到的前缀长度。
///
/// ## 契约 (What)
/// - [`SendError::Io`]：操作系统返回的发送错误原样保留在 `source` 中；等待可写之后
///   再次遇到 `WouldBlock` 也归入此类，`source.kind()` 为 [`io::ErrorKind::WouldBlock`]；
/// - [`SendError::Timeout`]：在 `timeout` 内套接字没有变为可写。
#[derive(Debug, Error)]
pub enum SendError {
    #[error("socket send failed after {sent} bytes: {source}")]
    Io { sent: usize, source: io::Error },
    #[error("socket not writable within {timeout:?} ({sent} bytes sent)")]
    Timeout { sent: usize, timeout: Duration },
}

impl SendError {
    pub(crate) fn io(source: io::Error) -> Self {
        SendError::Io { sent: 0, source }
    }

    pub(crate) fn timeout(timeout: Duration) -> Self {
        SendError::Timeout { sent: 0, timeout }
    }

    /// 在已有计数上叠加之前窗口写出的字节数。
    pub(crate) fn after(mut self, previously_sent: usize) -> Self {
        match &mut self {
            SendError::Io { sent, .. } | SendError::Timeout { sent, .. } => {
                *sent += previously_sent;
            }
        }
        self
    }

    /// 失败前已经交给内核的字节数。
    pub fn sent(&self) -> usize {
        match self {
            SendError::Io { sent, .. } | SendError::Timeout { sent, .. } => *sent,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Timeout { .. })
    }

    pub fn code(&self) -> &'static str {
        match self {
            SendError::Io { .. } => codes::WRITE_IO,
            SendError::Timeout { .. } => codes::WRITE_TIMEOUT,
        }
    }

    /// 底层 IO 错误；超时没有对应的系统错误。
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            SendError::Io { source, .. } => Some(source),
            SendError::Timeout { .. } => None,
        }
    }
}

impl From<SendError> for io::Error {
    fn from(value: SendError) -> Self {
        match value {
            SendError::Io { source, .. } => source,
            timeout @ SendError::Timeout { .. } => {
                io::Error::new(io::ErrorKind::TimedOut, timeout.to_string())
            }
        }
    }
}
