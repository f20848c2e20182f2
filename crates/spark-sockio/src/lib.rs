#![deny(unsafe_code)]
#![doc = r#"
# spark-sockio

## 设计动机（Why）
- **定位**：在非阻塞套接字上把一批分散缓冲区完整写出，屏蔽“部分写入”“发送缓冲区已满”
  与“单次系统调用 iovec 数量受限”三类细节。
- **架构角色**：叶子组件，不创建也不关闭套接字，不接入事件循环；调用线程在一次调用内
  同步完成所有工作。

## 核心契约（What）
- [`send_all`]：把整批 [`IoSlice`](std::io::IoSlice) 按顺序完整写出，返回总字节数；
- [`write_all`]：单缓冲区版本，等价于只含一个描述符的 [`send_all`]；
- [`send_bufs`] / [`send_once`]：单窗口的“尝试 + 至多一次等待 + 一次重试”与单次尝试原语；
- [`Endpoint`]：引擎依赖的两个外部能力：向量化发送与可写等待；
- 失败统一返回 [`SendError`]，区分“对端过慢（超时）”与“连接损坏（IO 错误）”，并携带已发送字节数。

## 实现策略（How）
- 批次在原地按索引切分为不超过 [`WriteOptions::max_iov`] 的窗口，跳过惰性描述符；
- 部分写入后在窗口内做稳定压缩，只重发未完成的字节，绝不与新的输入描述符交错；
- 每个窗口在遇到 `WouldBlock` 时至多等待一次可写事件，第二次 `WouldBlock` 视为硬错误。

## 风险与考量（Trade-offs）
- 引擎会阻塞调用线程，最坏情况下每个窗口阻塞一个超时周期；
- 不支持调用中途取消，调用方只能关闭套接字，使下一次发送以 IO 错误结束。
"#]

mod config;
mod endpoint;
mod error;
pub mod iov;
mod send;

pub use config::{ConfigError, DEFAULT_MAX_IOV, DEFAULT_TIMEOUT, WriteOptions};
#[cfg(unix)]
pub use endpoint::SocketEndpoint;
pub use endpoint::{AggregateSend, Endpoint, Readiness, ScalarSend};
pub use error::{SendError, codes};
pub use send::{send_all, send_bufs, send_once, write_all};
