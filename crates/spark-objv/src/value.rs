use std::collections::BTreeMap;

/// 消费者写入的目标值。
///
/// - `Int`：整数与索引表消费者的结果；
/// - `Bool`：布尔消费者的结果，包括标志型选项绑定的字面量；
/// - `Str`：字符串消费者的结果；`len` 仅在规格要求同时报告长度时为 `Some`，单位为字节。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Int(i64),
    Bool(bool),
    Str { value: String, len: Option<usize> },
}

/// 一次解析得到的全部绑定，按目标名索引。
///
/// 只有整体解析成功时调用方才能拿到该结构；失败路径上已写入的部分绑定随错误一起丢弃。
/// 未出现的可选选项与尾部可选位置参数不会出现在表中。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjvBindings {
    values: BTreeMap<String, ArgValue>,
}

impl ObjvBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入目标值，返回被覆盖的旧值（同一选项重复出现时后者生效）。
    pub fn bind(&mut self, dest: &str, value: ArgValue) -> Option<ArgValue> {
        self.values.insert(dest.to_owned(), value)
    }

    pub fn get(&self, dest: &str) -> Option<&ArgValue> {
        self.values.get(dest)
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    pub fn get_int(&self, dest: &str) -> Option<i64> {
        match self.values.get(dest)? {
            ArgValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        match self.values.get(dest)? {
            ArgValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_str(&self, dest: &str) -> Option<&str> {
        match self.values.get(dest)? {
            ArgValue::Str { value, .. } => Some(value),
            _ => None,
        }
    }

    /// 字符串的字节长度；规格未要求报告长度时返回 `None`。
    pub fn get_str_len(&self, dest: &str) -> Option<usize> {
        match self.values.get(dest)? {
            ArgValue::Str { len, .. } => *len,
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(dest, value)| (dest.as_str(), value))
    }
}
