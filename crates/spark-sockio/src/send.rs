use std::{
    io::{self, ErrorKind, IoSlice},
    time::Duration,
};

use tracing::{debug, trace};

use crate::{
    config::WriteOptions,
    endpoint::{Endpoint, Readiness},
    error::SendError,
    iov,
};

/// 执行一次非阻塞向量化发送。
///
/// 被信号中断（`EINTR`）时立即重试，其余失败以 debug 级别记录后原样返回，
/// 包括 [`ErrorKind::WouldBlock`]。
pub fn send_once<E: Endpoint + ?Sized>(
    endpoint: &mut E,
    bufs: &[IoSlice<'_>],
) -> io::Result<usize> {
    loop {
        match endpoint.send_vectored(bufs) {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(error = %err, buffers = bufs.len(), "socket send failed");
                return Err(err);
            }
            Ok(sent) => return Ok(sent),
        }
    }
}

/// 发送单个窗口：一次尝试，`WouldBlock` 时至多等待一次可写，然后恰好再试一次。
///
/// # 教案式注释
///
/// ## 契约 (What)
/// - 成功时返回本次写出的字节数，可能小于窗口总长度（部分写入）；
/// - 等待超时返回 [`SendError::Timeout`]；等待后再次 `WouldBlock` 或任何其他系统错误
///   返回 [`SendError::Io`]；
/// - 错误中的 `sent` 恒为 0：本函数失败时没有写出任何字节。
///
/// ## 注意事项 (Trade-offs)
/// - 单次等待把每个窗口的最坏阻塞时间限制在一个 `timeout` 内，代价是短暂抖动后
///   仍然拥塞的连接会直接失败，而不是无限重试。
pub fn send_bufs<E: Endpoint + ?Sized>(
    endpoint: &mut E,
    bufs: &[IoSlice<'_>],
    timeout: Duration,
) -> Result<usize, SendError> {
    if iov::remaining(bufs) == 0 {
        return Ok(0);
    }
    match send_once(endpoint, bufs) {
        Ok(sent) => return Ok(sent),
        Err(err) if err.kind() == ErrorKind::WouldBlock => {}
        Err(err) => return Err(SendError::io(err)),
    }

    trace!(?timeout, "send buffer full, waiting for writability");
    match endpoint.wait_writable(timeout).map_err(SendError::io)? {
        Readiness::Ready => send_once(endpoint, bufs).map_err(SendError::io),
        Readiness::TimedOut => {
            debug!(?timeout, "timed out waiting for socket to become writable");
            Err(SendError::timeout(timeout))
        }
    }
}

/// 把整批描述符按顺序完整写出，返回写出的总字节数。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 单次系统调用的描述符数量有上限，且非阻塞套接字随时可能只接受一部分数据；
///   调用方需要的是“要么全部写出，要么得到明确的失败原因与已写字节数”。
///
/// ## 逻辑 (How)
/// 1. 从输入游标处收集至多 `max_iov` 个非惰性描述符，原地排列为当前窗口；
/// 2. 用 [`send_bufs`] 发送窗口；
/// 3. 按写出字节数从窗口头部扣减：完成的描述符变为惰性，首个未完成的描述符前移起点；
/// 4. 窗口仍有剩余时稳定压缩后立即重发，不吸收新的输入描述符；
/// 5. 窗口清空后推进到下一个窗口，直至输入耗尽。
///
/// ## 契约 (What)
/// - **前置条件**：端点处于非阻塞模式；调用期间调用方不得访问 `bufs`；
/// - **后置条件**：成功时所有描述符均为惰性；失败时 `bufs` 反映已写出的前缀，
///   错误携带的 `sent()` 是跨所有窗口累计的字节数；
/// - 端点报告的写出字节数为 0 或超过窗口长度时以 [`SendError::Io`] 结束，
///   避免死循环或越界扣减。
pub fn send_all<E: Endpoint + ?Sized>(
    endpoint: &mut E,
    bufs: &mut [IoSlice<'_>],
    options: &WriteOptions,
) -> Result<usize, SendError> {
    let max_iov = options.max_iov();
    let timeout = options.timeout();
    let mut total = 0;
    let mut cursor = 0;

    while cursor < bufs.len() {
        let start = cursor;
        let mut live = iov::gather(bufs, start, &mut cursor, max_iov);

        while live > 0 {
            let window = &mut bufs[start..start + live];
            let sent = send_bufs(endpoint, window, timeout).map_err(|err| err.after(total))?;
            if sent == 0 {
                return Err(SendError::io(io::Error::from(ErrorKind::WriteZero)).after(total));
            }
            let overrun = iov::consume(window, sent);
            if overrun > 0 {
                return Err(SendError::io(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("endpoint reported {overrun} bytes beyond the offered window"),
                ))
                .after(total));
            }
            total += sent;
            live = iov::compact(window);
            if live > 0 {
                trace!(sent, pending = iov::remaining(window), "partial send, resending window");
            }
        }
    }

    trace!(total, "batch flushed");
    Ok(total)
}

/// 单缓冲区版本：作为只含一个描述符的批次交给 [`send_all`]。
pub fn write_all<E: Endpoint + ?Sized>(
    endpoint: &mut E,
    buf: &[u8],
    options: &WriteOptions,
) -> Result<usize, SendError> {
    let mut bufs = [IoSlice::new(buf)];
    send_all(endpoint, &mut bufs, options)
}
