use tracing::debug;

use crate::{
    consumer::Flow,
    error::{ObjvError, UsageError, UsageKind},
    spec::ObjvSpec,
    value::ObjvBindings,
};

/// 按选项规格与位置规格解析记号序列。
///
/// # 教案式注释
///
/// ## 逻辑 (How)
/// 1. 选项阶段（仅当 `opts` 非空）：当前记号与某个选项名完全相等时，越过选项名并调用其消费者；
///    消费者返回 [`Flow::Break`] 或当前记号不是任何选项名时结束本阶段。`--` 只有在
///    `opts` 中声明（见 [`ObjvSpec::separator`]）时才会被吃掉，否则作为首个位置参数保留；
/// 2. 位置阶段：严格按顺序处理 `args`，每个条目至少消费一个记号；记号耗尽时，
///    遇到的是可选条目（`?` 开头）则成功返回，否则报“参数过少”；
/// 3. 全部位置条目处理完仍有记号时报“参数过多”；`args` 为 `None` 时任何剩余记号都算过多。
///
/// ## 契约 (What)
/// - `offset`：前 `offset` 个记号是命令词，不参与匹配，只用于渲染用法错误；超过记号数时按记号数处理；
/// - 成功返回完整的绑定表；失败时部分绑定随之丢弃；
/// - 消费者的 `Err` 原样返回；消费者声明的消费数超过剩余记号、位置条目消费 0 个记号
///   或在位置阶段返回 [`Flow::Break`] 都视为消费者失败。
pub fn parse_objv(
    opts: Option<&[ObjvSpec]>,
    args: Option<&[ObjvSpec]>,
    offset: usize,
    tokens: &[&str],
) -> Result<ObjvBindings, ObjvError> {
    let offset = offset.min(tokens.len());
    let mut bindings = ObjvBindings::new();
    let mut pos = offset;

    if let Some(opts) = opts.filter(|opts| !opts.is_empty()) {
        while let Some(&token) = tokens.get(pos) {
            let Some(spec) = opts.iter().find(|spec| spec.key() == token) else {
                break;
            };
            pos += 1;
            match consume(spec, &tokens[pos..], &mut bindings)? {
                Flow::Continue(used) => pos += used,
                Flow::Break => break,
            }
        }
    }

    let Some(args) = args else {
        if pos < tokens.len() {
            return Err(wrong_num_args(opts, args, tokens, offset, UsageKind::TooManyArguments));
        }
        return Ok(bindings);
    };

    for spec in args {
        if pos == tokens.len() {
            if spec.is_optional() {
                return Ok(bindings);
            }
            return Err(wrong_num_args(opts, Some(args), tokens, offset, UsageKind::TooFewArguments));
        }
        match consume(spec, &tokens[pos..], &mut bindings)? {
            Flow::Continue(0) => {
                return Err(ObjvError::consumer(spec.dest(), "positional argument consumed nothing"));
            }
            Flow::Continue(used) => pos += used,
            Flow::Break => {
                return Err(ObjvError::consumer(
                    spec.dest(),
                    "end-of-options marker is not valid as a positional argument",
                ));
            }
        }
    }

    if pos < tokens.len() {
        return Err(wrong_num_args(opts, Some(args), tokens, offset, UsageKind::TooManyArguments));
    }
    Ok(bindings)
}

/// 调用消费者并校验其声明的消费数量。
fn consume(spec: &ObjvSpec, rest: &[&str], bindings: &mut ObjvBindings) -> Result<Flow, ObjvError> {
    let flow = spec.consumer().consume(spec.dest(), rest, bindings)?;
    if let Flow::Continue(used) = flow
        && used > rest.len()
    {
        return Err(ObjvError::consumer(
            spec.dest(),
            format!("claimed {used} arguments but only {} remain", rest.len()),
        ));
    }
    Ok(flow)
}

/// 按规格重建用法字符串，例如 `?-n n? ?-flag? ?--? path ?b?`。
pub fn usage(opts: Option<&[ObjvSpec]>, args: Option<&[ObjvSpec]>) -> String {
    let options = opts.unwrap_or_default().iter().map(ObjvSpec::option_usage);
    let positionals = args.unwrap_or_default().iter().map(ObjvSpec::positional_usage);
    options.chain(positionals).collect::<Vec<_>>().join(" ")
}

fn wrong_num_args(
    opts: Option<&[ObjvSpec]>,
    args: Option<&[ObjvSpec]>,
    tokens: &[&str],
    offset: usize,
    kind: UsageKind,
) -> ObjvError {
    let command = tokens[..offset].join(" ");
    let usage = usage(opts, args);
    debug!(?kind, %command, %usage, "wrong number of arguments");
    UsageError::new(kind, command, usage).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use tracing_test::traced_test;

    fn flag_opts() -> Vec<ObjvSpec> {
        vec![ObjvSpec::flag("-flag", true), ObjvSpec::int("-n"), ObjvSpec::separator()]
    }

    #[test]
    fn options_then_positionals() {
        let opts = flag_opts();
        let args = [ObjvSpec::string("name")];
        let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["-flag", "alice"]).expect("解析成功");
        assert_eq!(bound.get_bool("flag"), Some(true));
        assert_eq!(bound.get_str("name"), Some("alice"));
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn first_unknown_token_ends_option_phase() {
        let opts = flag_opts();
        let args = [ObjvSpec::string("a"), ObjvSpec::string("?b")];
        let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["-n", "3", "x", "-flag"]).expect("解析成功");
        assert_eq!(bound.get_int("n"), Some(3));
        assert_eq!(bound.get_str("a"), Some("x"));
        assert_eq!(bound.get_str("b"), Some("-flag"));
        assert!(!bound.contains("flag"));
    }

    #[test]
    fn undeclared_separator_binds_as_positional() {
        let opts = [ObjvSpec::flag("-flag", true)];
        let args = [ObjvSpec::string("a"), ObjvSpec::string("?b")];
        let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["--", "x"]).expect("解析成功");
        assert_eq!(bound.get_str("a"), Some("--"));
        assert_eq!(bound.get_str("b"), Some("x"));
        assert!(!bound.contains("flag"));
    }

    #[test]
    fn declared_separator_is_swallowed() {
        let opts = [ObjvSpec::flag("-flag", true), ObjvSpec::separator()];
        let args = [ObjvSpec::string("a")];
        let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["--", "-flag"]).expect("解析成功");
        assert_eq!(bound.get_str("a"), Some("-flag"));
        assert!(!bound.contains("flag"));
    }

    #[test]
    fn positional_consuming_nothing_is_rejected() {
        let args = [ObjvSpec::flag("x", true)];
        let err = parse_objv(None, Some(&args[..]), 0, &["token"]).expect_err("位置条目必须消费记号");
        assert_eq!(err.code(), codes::CONSUMER);
    }

    #[test]
    fn break_in_positional_phase_is_rejected() {
        let args = [ObjvSpec::separator()];
        let err = parse_objv(None, Some(&args[..]), 0, &["--"]).expect_err("位置阶段不接受停止");
        assert_eq!(err.code(), codes::CONSUMER);
    }

    #[test]
    fn without_option_spec_separator_is_positional() {
        let args = [ObjvSpec::string("a")];
        let bound = parse_objv(None, Some(&args[..]), 0, &["--"]).expect("解析成功");
        assert_eq!(bound.get_str("a"), Some("--"));
    }

    #[test]
    fn missing_positional_spec_rejects_leftovers() {
        let opts = flag_opts();
        assert!(parse_objv(Some(&opts[..]), None, 0, &["-flag"]).is_ok());
        let err = parse_objv(Some(&opts[..]), None, 0, &["-flag", "extra"]).expect_err("多余参数");
        assert_eq!(err.code(), codes::USAGE_TOO_MANY);
        assert_eq!(err.usage_error().map(UsageError::usage), Some("?-flag? ?-n n? ?--?"));
    }

    #[test]
    fn consumer_overclaim_is_rejected() {
        #[derive(Debug)]
        struct Greedy;
        impl crate::Consumer for Greedy {
            fn consume(&self, _: &str, _: &[&str], _: &mut ObjvBindings) -> Result<Flow, ObjvError> {
                Ok(Flow::Continue(5))
            }
        }
        let args = [ObjvSpec::new("all", crate::UsageForm::Value, Greedy)];
        let err = parse_objv(None, Some(&args[..]), 0, &["a", "b"]).expect_err("越界消费");
        assert_eq!(err.code(), codes::CONSUMER);
    }

    #[test]
    #[traced_test]
    fn usage_error_carries_command_words() {
        let opts = [ObjvSpec::int("-n")];
        let args = [ObjvSpec::string("path")];
        let err = parse_objv(Some(&opts[..]), Some(&args[..]), 1, &["ns_write", "-n", "2"]).expect_err("缺少 path");

        let usage = err.usage_error().expect("应为用法错误");
        assert_eq!(usage.kind(), UsageKind::TooFewArguments);
        assert_eq!(usage.command(), "ns_write");
        assert_eq!(err.to_string(), "wrong # args: should be \"ns_write ?-n n? path\"");
        assert!(logs_contain("wrong number of arguments"));
    }

    #[test]
    fn offset_beyond_tokens_is_clamped() {
        let args = [ObjvSpec::string("?opt")];
        let bound = parse_objv(None, Some(&args[..]), 7, &["cmd"]).expect("命令词之外没有参数");
        assert!(bound.is_empty());
    }
}
