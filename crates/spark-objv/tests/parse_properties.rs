use proptest::prelude::*;
use spark_objv::{ObjvError, ObjvSpec, UsageKind, codes, parse_objv, usage};

fn positional_pair() -> [ObjvSpec; 2] {
    [ObjvSpec::string("a"), ObjvSpec::string("?b")]
}

fn usage_kind(err: &ObjvError) -> Option<UsageKind> {
    err.usage_error().map(|usage| usage.kind())
}

#[test]
fn flag_then_name_binds_both() {
    let opts = [ObjvSpec::flag("-flag", true)];
    let args = [ObjvSpec::string("name")];

    let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["-flag", "bob"]).expect("解析成功");
    assert_eq!(bound.get_bool("flag"), Some(true));
    assert_eq!(bound.get_str("name"), Some("bob"));

    let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["bob"]).expect("未出现的选项不绑定");
    assert!(!bound.contains("flag"));
    assert_eq!(bound.get_str("name"), Some("bob"));
}

#[test]
fn optional_trailing_positional() {
    let args = positional_pair();

    let bound = parse_objv(None, Some(&args[..]), 0, &["x"]).expect("可选参数可缺省");
    assert_eq!(bound.get_str("a"), Some("x"));
    assert!(!bound.contains("b"));

    let err = parse_objv(None, Some(&args[..]), 0, &[]).expect_err("缺少必需参数");
    assert_eq!(usage_kind(&err), Some(UsageKind::TooFewArguments));
    assert_eq!(err.code(), codes::USAGE_TOO_FEW);

    let err = parse_objv(None, Some(&args[..]), 0, &["x", "y", "z"]).expect_err("多余参数");
    assert_eq!(usage_kind(&err), Some(UsageKind::TooManyArguments));
    assert_eq!(err.to_string(), "wrong # args: should be \"a ?b?\"");
}

#[test]
fn separator_stops_option_matching() {
    let opts = [
        ObjvSpec::flag("-flag", true),
        ObjvSpec::int("-n"),
        ObjvSpec::separator(),
    ];
    let args = positional_pair();

    let bound = parse_objv(Some(&opts[..]), Some(&args[..]), 0, &["-n", "1", "--", "-flag", "-n"])
        .expect("`--` 之后全是位置参数");
    assert_eq!(bound.get_int("n"), Some(1));
    assert_eq!(bound.get_str("a"), Some("-flag"));
    assert_eq!(bound.get_str("b"), Some("-n"));
    assert!(!bound.contains("flag"));
}

#[test]
fn option_missing_its_value_is_reported() {
    let opts = [ObjvSpec::int("-n")];
    let err = parse_objv(Some(&opts[..]), None, 0, &["-n"]).expect_err("值缺失");
    assert_eq!(err.code(), codes::VALUE_MISSING);

    let err = parse_objv(Some(&opts[..]), None, 0, &["-n", "many"]).expect_err("无法转换");
    assert_eq!(err.code(), codes::VALUE_CONVERT);
}

#[test]
fn index_option_binds_table_value() {
    let opts = [ObjvSpec::index("-when", [("readable", 1), ("writable", 2)])];
    let bound = parse_objv(Some(&opts[..]), None, 0, &["-when", "writable"]).expect("键名有效");
    assert_eq!(bound.get_int("when"), Some(2));

    let err = parse_objv(Some(&opts[..]), None, 0, &["-when", "never"]).expect_err("键名无效");
    assert_eq!(err.to_string(), "bad when \"never\": must be readable or writable");
}

#[test]
fn usage_rendering() {
    let opts = [ObjvSpec::int("-n")];
    let args = [ObjvSpec::string("path")];
    assert_eq!(usage(Some(&opts[..]), Some(&args[..])), "?-n n? path");

    let opts = [
        ObjvSpec::flag("-nonewline", true),
        ObjvSpec::boolean("-binary"),
        ObjvSpec::separator(),
    ];
    let args = [ObjvSpec::string("channel"), ObjvSpec::string("?data")];
    assert_eq!(
        usage(Some(&opts[..]), Some(&args[..])),
        "?-nonewline? ?-binary binary? ?--? channel ?data?"
    );
    assert_eq!(usage(None, None), "");
}

#[test]
fn repeated_option_last_wins() {
    let opts = [ObjvSpec::int("-n")];
    let bound = parse_objv(Some(&opts[..]), None, 0, &["-n", "1", "-n", "0x20"]).expect("重复选项");
    assert_eq!(bound.get_int("n"), Some(32));
}

proptest! {
    /// 仅有字符串位置参数时，记号按顺序逐个绑定；记号数超出规格数时报参数过多。
    #[test]
    fn positionals_bind_in_order(tokens in proptest::collection::vec("[a-z]{1,6}", 0..6)) {
        let names = ["p0", "p1", "p2", "?p3"];
        let args: Vec<ObjvSpec> = names.iter().map(|name| ObjvSpec::string(*name)).collect();
        let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();

        match parse_objv(None, Some(&args[..]), 0, &refs) {
            Ok(bound) => {
                prop_assert!((3..=4).contains(&refs.len()));
                prop_assert_eq!(bound.len(), refs.len());
                for (spec, token) in args.iter().zip(&refs) {
                    prop_assert_eq!(bound.get_str(spec.dest()), Some(*token));
                }
            }
            Err(err) => {
                let expected = if refs.len() < 3 {
                    UsageKind::TooFewArguments
                } else {
                    UsageKind::TooManyArguments
                };
                prop_assert_eq!(usage_kind(&err), Some(expected));
            }
        }
    }

    /// 命令词不参与匹配，只出现在用法错误中。
    #[test]
    fn command_words_only_appear_in_usage(words in proptest::collection::vec("[a-z_]{1,8}", 1..4)) {
        let args = [ObjvSpec::string("path")];
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let err = parse_objv(None, Some(&args[..]), refs.len(), &refs).expect_err("缺少 path");
        let usage = err.usage_error().expect("应为用法错误");
        prop_assert_eq!(usage.command(), refs.join(" "));
        prop_assert_eq!(usage.usage(), "path");
    }
}
