//! 缓冲区描述符（[`IoSlice`]）批次的原地操作。
//!
//! # 模块定位（Why）
//! - 发送引擎只持有调用方批次的可变借用，部分写入后的续传状态全部记录在批次本身：
//!   已完成的描述符被置为惰性（长度为 0），部分完成的描述符前移起点；
//! - 所有操作基于索引在原切片上完成，热路径上不分配内存。
//!
//! # 契约（What）
//! - 惰性描述符：长度为 0 的描述符，发送时会被跳过；
//! - [`consume`] 按描述符顺序从窗口头部扣减已发送字节；
//! - [`compact`] 把仍有剩余字节的描述符稳定地移动到窗口前部；
//! - [`gather`] 从输入游标处收集下一个窗口。

use std::io::IoSlice;

/// 判断描述符是否为惰性描述符。
#[inline]
pub fn is_inert(buf: &IoSlice<'_>) -> bool {
    buf.is_empty()
}

/// 批次中尚未发送的总字节数。
pub fn remaining(bufs: &[IoSlice<'_>]) -> usize {
    bufs.iter().map(|buf| buf.len()).sum()
}

/// 从窗口头部扣减 `sent` 个字节。
///
/// # 契约（What）
/// - 完全发送的描述符变为惰性；第一个未完全发送的描述符前移起点并缩短长度，遍历随即停止；
/// - 返回无法归属到任何描述符的剩余字节数，正常情况下为 0；
/// - 对已全部惰性的窗口调用是空操作。
pub fn consume(window: &mut [IoSlice<'_>], sent: usize) -> usize {
    let mut left = sent;
    for buf in window.iter_mut() {
        if left == 0 {
            break;
        }
        let len = buf.len();
        if left >= len {
            left -= len;
            *buf = IoSlice::new(&[]);
        } else {
            buf.advance(left);
            left = 0;
        }
    }
    left
}

/// 将仍有字节的描述符稳定地移动到窗口前部，返回这些描述符的数量。
///
/// 惰性描述符被交换到尾部；相对顺序只对非惰性描述符保证。
pub fn compact(window: &mut [IoSlice<'_>]) -> usize {
    let mut live = 0;
    for idx in 0..window.len() {
        if !is_inert(&window[idx]) {
            window.swap(live, idx);
            live += 1;
        }
    }
    live
}

/// 从 `*cursor` 开始收集至多 `max` 个非惰性描述符，放到 `start` 起的连续位置。
///
/// # 契约（What）
/// - **前置条件**：`start <= *cursor`，且 `start..*cursor` 之间只有惰性描述符；
/// - **后置条件**：返回窗口长度 `n`，`bufs[start..start + n]` 按原顺序排列，
///   游标越过所有被扫描过的描述符（含跳过的惰性描述符）。
pub fn gather(bufs: &mut [IoSlice<'_>], start: usize, cursor: &mut usize, max: usize) -> usize {
    debug_assert!(start <= *cursor);
    let mut len = 0;
    while *cursor < bufs.len() && len < max {
        if !is_inert(&bufs[*cursor]) {
            bufs.swap(start + len, *cursor);
            len += 1;
        }
        *cursor += 1;
    }
    len
}
