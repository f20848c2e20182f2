#![deny(unsafe_code)]

//! # spark-objv
//!
//! ## 定位与职责（Why）
//! - 把原生命令暴露给嵌入式脚本解释器时，每个命令都要解析“若干具名选项 + 若干位置参数”；
//!   本 crate 以两张有序规格表声明这些参数，由统一的解析循环完成匹配、转换与用法报错。
//! - 目标值不绑定任何解释器的对象模型，而是写入带标签的 [`ArgValue`]，解析整体成功后
//!   以 [`ObjvBindings`] 交给调用方。
//!
//! ## 核心契约（What）
//! - [`parse_objv`]：先按名称匹配选项，再按位置依次消费参数；
//! - [`Consumer`]：每个规格条目绑定的消费者，返回三态结果（继续并消费 n 个、停止选项解析、失败）；
//! - 内置消费者：[`IntConsumer`]、[`StringConsumer`]、[`BoolConsumer`]、[`BreakConsumer`]、
//!   [`IndexConsumer`]；
//! - 参数个数不符时返回 [`UsageError`]，其中携带按规格重建的用法字符串。
//!
//! ## 风险提示（Trade-offs）
//! - 选项名只做精确匹配，不支持前缀缩写；首个不匹配的记号即结束选项阶段。

mod consumer;
mod error;
mod parse;
mod spec;
mod value;

pub use consumer::{
    BoolConsumer, BreakConsumer, Consumer, Flow, IndexConsumer, IntConsumer, StringConsumer,
    parse_bool, parse_int,
};
pub use error::{ObjvError, UsageError, UsageKind, codes};
pub use parse::{parse_objv, usage};
pub use spec::{ObjvSpec, UsageForm};
pub use value::{ArgValue, ObjvBindings};
