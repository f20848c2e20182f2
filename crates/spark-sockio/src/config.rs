use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// 单次向量化系统调用允许携带的描述符上限，取 Linux `UIO_MAXIOV`。
pub const DEFAULT_MAX_IOV: usize = 1024;

/// 等待套接字可写的默认超时。
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 整批写出的运行参数。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 把“窗口大小”和“可写等待超时”集中成一个值对象，调用方可以从配置文件加载，
///   也可以在测试中把窗口调小以覆盖分窗路径。
///
/// ## 契约 (What)
/// - `max_iov`：每个窗口的描述符上限，恒大于 0；
/// - `timeout`：每个窗口遇到 `WouldBlock` 时等待可写的最长时间；`Duration::ZERO`
///   表示只检查一次就绪状态而不阻塞。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    max_iov: usize,
    timeout: Duration,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            max_iov: DEFAULT_MAX_IOV,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WriteOptions {
    /// 以指定超时构造参数，窗口大小取默认值。
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// 覆盖窗口大小；传入 0 时按 1 处理，保证每个窗口至少携带一个描述符。
    pub fn with_max_iov(mut self, max_iov: usize) -> Self {
        self.max_iov = max_iov.max(1);
        self
    }

    /// 覆盖可写等待超时。
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_iov(&self) -> usize {
        self.max_iov
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 从 TOML 文本加载参数。
    ///
    /// 支持的键：`max_iov`（正整数）与 `timeout_ms`（毫秒）；缺省键取默认值，
    /// 未知键与 `max_iov = 0` 均被拒绝。
    ///
    /// ```
    /// use std::time::Duration;
    /// use spark_sockio::WriteOptions;
    ///
    /// let opts = WriteOptions::from_toml_str("max_iov = 16\ntimeout_ms = 250").unwrap();
    /// assert_eq!(opts.max_iov(), 16);
    /// assert_eq!(opts.timeout(), Duration::from_millis(250));
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawWriteOptions = toml::from_str(text)?;
        let mut options = Self::default();
        if let Some(max_iov) = raw.max_iov {
            if max_iov == 0 {
                return Err(ConfigError::ZeroMaxIov);
            }
            options.max_iov = max_iov;
        }
        if let Some(millis) = raw.timeout_ms {
            options.timeout = Duration::from_millis(millis);
        }
        Ok(options)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWriteOptions {
    max_iov: Option<usize>,
    timeout_ms: Option<u64>,
}

/// 加载 [`WriteOptions`] 时的错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 语法错误、类型不符或出现未知键。
    #[error("invalid write options: {0}")]
    Parse(#[from] toml::de::Error),
    /// 窗口大小为 0 时引擎无法推进。
    #[error("`max_iov` must be at least 1")]
    ZeroMaxIov,
}
