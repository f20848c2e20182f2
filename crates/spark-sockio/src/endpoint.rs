//! 发送引擎依赖的外部能力：向量化发送与可写等待。
//!
//! # 模块定位（Why）
//! - 引擎本身只负责分窗、续传与重试策略，真正的系统调用通过 [`Endpoint`] 注入，
//!   便于在测试中用脚本化端点复现部分写入、`WouldBlock` 与超时；
//! - 平台没有原生向量化发送时，以 [`AggregateSend`] 把窗口拼接为一块连续内存后整体发送，
//!   对引擎保持行为等价。
//!
//! # 暴露接口（What）
//! - [`Endpoint`]：`send_vectored` + `wait_writable`；
//! - [`ScalarSend`]：只具备单缓冲区发送能力的端点；
//! - [`AggregateSend`]：`ScalarSend` 到 `Endpoint` 的适配器；
//! - [`SocketEndpoint`]（Unix）：基于 `socket2` 的 `sendmsg` 与 `poll(2)` 的实现。

use std::{
    io::{self, IoSlice},
    time::Duration,
};

/// 等待可写的结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// 套接字已可写，或已出现需要由下一次发送暴露的错误/挂断。
    Ready,
    /// 超时前未变为可写。
    TimedOut,
}

/// 非阻塞网络端点。
///
/// # 契约 (What)
/// - `send_vectored`：执行一次非阻塞的分散/聚集发送，返回从窗口头部按顺序写出的字节数；
///   发送缓冲区已满时返回 [`io::ErrorKind::WouldBlock`]，其余失败原样返回；
/// - `wait_writable`：阻塞调用线程至多 `timeout`，直到端点可写。
pub trait Endpoint {
    fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize>;

    fn wait_writable(&mut self, timeout: Duration) -> io::Result<Readiness>;
}

impl<E: Endpoint + ?Sized> Endpoint for &mut E {
    fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        (**self).send_vectored(bufs)
    }

    fn wait_writable(&mut self, timeout: Duration) -> io::Result<Readiness> {
        (**self).wait_writable(timeout)
    }
}

/// 只能发送单块连续内存的端点。
pub trait ScalarSend {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn wait_writable(&mut self, timeout: Duration) -> io::Result<Readiness>;
}

/// 把窗口聚合为一次单缓冲区发送的适配器。
///
/// # 教案式注释
///
/// ## 逻辑 (How)
/// - 窗口内只有一个非空描述符时直接发送，不做拷贝；
/// - 否则把所有描述符依次追加到内部暂存区后一次性发送；暂存区在多次调用间复用。
///
/// ## 契约 (What)
/// - 返回值语义与原生向量化发送一致：写出的字节按窗口顺序从头部开始计数。
#[derive(Debug)]
pub struct AggregateSend<S> {
    inner: S,
    scratch: Vec<u8>,
}

impl<S> AggregateSend<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ScalarSend> Endpoint for AggregateSend<S> {
    fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let mut live = bufs.iter().filter(|buf| !buf.is_empty());
        match (live.next(), live.next()) {
            (None, _) => Ok(0),
            (Some(only), None) => self.inner.send(only),
            _ => {
                self.scratch.clear();
                for buf in bufs {
                    self.scratch.extend_from_slice(buf);
                }
                self.inner.send(&self.scratch)
            }
        }
    }

    fn wait_writable(&mut self, timeout: Duration) -> io::Result<Readiness> {
        self.inner.wait_writable(timeout)
    }
}

#[cfg(unix)]
pub use self::unix::SocketEndpoint;

#[cfg(unix)]
mod unix {
    use super::{Endpoint, Readiness, ScalarSend};
    use std::{
        io::{self, IoSlice},
        os::fd::{AsFd, AsRawFd, RawFd},
        time::{Duration, Instant},
    };

    use nix::errno::Errno;
    use nix::libc;
    use socket2::SockRef;

    /// 借用任意 Unix 套接字（`TcpStream`、`UnixStream`、`socket2::Socket` 等）的端点实现。
    ///
    /// - 发送走 `socket2` 的 `sendmsg`，Linux 上带 `MSG_NOSIGNAL`，对端关闭时得到 `EPIPE`
    ///   而不是进程信号；
    /// - 可写等待走 `poll(2)`，被信号中断时按剩余时间继续等待。
    ///
    /// 端点不修改套接字的阻塞模式，调用方需事先设置为非阻塞。
    #[derive(Debug)]
    pub struct SocketEndpoint<'s> {
        sock: SockRef<'s>,
    }

    impl<'s> SocketEndpoint<'s> {
        pub fn new<S: AsFd>(socket: &'s S) -> Self {
            Self {
                sock: SockRef::from(socket),
            }
        }
    }

    impl Endpoint for SocketEndpoint<'_> {
        fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
            self.sock.send_vectored(bufs)
        }

        fn wait_writable(&mut self, timeout: Duration) -> io::Result<Readiness> {
            poll_writable(self.sock.as_raw_fd(), timeout)
        }
    }

    impl ScalarSend for SocketEndpoint<'_> {
        fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sock.send(buf)
        }

        fn wait_writable(&mut self, timeout: Duration) -> io::Result<Readiness> {
            poll_writable(self.sock.as_raw_fd(), timeout)
        }
    }

    fn nix_err_to_io(errno: Errno) -> io::Error {
        io::Error::from_raw_os_error(errno as i32)
    }

    /// 把剩余时间换算为 `poll` 的毫秒参数，向上取整避免亚毫秒余量退化为忙等。
    fn poll_millis(remaining: Duration) -> libc::c_int {
        let millis = remaining.as_nanos().div_ceil(1_000_000);
        libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX)
    }

    #[allow(unsafe_code)]
    fn poll_writable(fd: RawFd, timeout: Duration) -> io::Result<Readiness> {
        // 超时大到无法表示截止时间时按无限等待处理。
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let millis = match deadline {
                Some(deadline) => poll_millis(deadline.saturating_duration_since(Instant::now())),
                None => -1,
            };
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLOUT,
                revents: 0,
            };
            let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
            if rc < 0 {
                let errno = Errno::last();
                if errno == Errno::EINTR {
                    continue;
                }
                return Err(nix_err_to_io(errno));
            }
            if rc == 0 {
                return Ok(Readiness::TimedOut);
            }
            return Ok(Readiness::Ready);
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Vec<u8>>,
    }

    impl ScalarSend for Recorder {
        fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls.push(buf.to_vec());
            Ok(buf.len())
        }

        fn wait_writable(&mut self, _timeout: Duration) -> io::Result<Readiness> {
            Ok(Readiness::Ready)
        }
    }

    #[test]
    fn aggregate_send_coalesces_window() {
        let mut endpoint = AggregateSend::new(Recorder::default());
        let bufs = [IoSlice::new(b"ab"), IoSlice::new(b""), IoSlice::new(b"cd")];
        assert_eq!(endpoint.send_vectored(&bufs).expect("聚合发送成功"), 4);

        let single = [IoSlice::new(b""), IoSlice::new(b"xyz")];
        assert_eq!(endpoint.send_vectored(&single).expect("单缓冲直发"), 3);
        assert_eq!(endpoint.send_vectored(&[]).expect("空窗口"), 0);

        assert_eq!(
            endpoint.into_inner().calls,
            vec![b"abcd".to_vec(), b"xyz".to_vec()]
        );
    }
}
