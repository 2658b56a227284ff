use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::value::{NativeFunction, Value, ValueKind};

/// Read-only table of native functions, consulted after the environment
/// chain when an identifier is resolved.
pub struct Builtins {
    functions: IndexMap<&'static str, NativeFunction>,
}

impl Builtins {
    pub fn standard() -> Self {
        let mut functions = IndexMap::new();
        for function in [
            native("len", len),
            native("puts", puts),
            native("first", first),
            native("last", last),
            native("rest", rest),
            native("push", push),
        ] {
            functions.insert(function.name, function);
        }
        Self { functions }
    }

    /// The process-wide registry, built on first use.
    pub fn global() -> &'static Builtins {
        static REGISTRY: OnceLock<Builtins> = OnceLock::new();
        REGISTRY.get_or_init(Builtins::standard)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.functions.get(name).copied().map(Value::builtin)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

fn native(name: &'static str, callback: fn(&[Value]) -> Value) -> NativeFunction {
    NativeFunction { name, callback }
}

fn wrong_arity(args: &[Value], want: usize) -> Value {
    Value::error(format!(
        "wrong number of arguments. got={}, want={want}",
        args.len()
    ))
}

fn len(args: &[Value]) -> Value {
    let [arg] = args else {
        return wrong_arity(args, 1);
    };
    match arg.kind() {
        ValueKind::Array(values) => Value::integer(values.len() as i64),
        ValueKind::String(text) => Value::integer(text.chars().count() as i64),
        _ => Value::error(format!(
            "argument to `len` not supported, got {}",
            arg.value_type()
        )),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{arg}");
    }
    Value::null()
}

fn first(args: &[Value]) -> Value {
    let [arg] = args else {
        return wrong_arity(args, 1);
    };
    match arg.kind() {
        ValueKind::Array(values) => values.first().cloned().unwrap_or_else(Value::null),
        ValueKind::String(text) => text
            .chars()
            .next()
            .map(|ch| Value::string(ch.to_string()))
            .unwrap_or_else(Value::null),
        _ => Value::error(format!(
            "argument to `first` must be ARRAY or STRING, got {}",
            arg.value_type()
        )),
    }
}

fn last(args: &[Value]) -> Value {
    let [arg] = args else {
        return wrong_arity(args, 1);
    };
    match arg.kind() {
        ValueKind::Array(values) => values.last().cloned().unwrap_or_else(Value::null),
        ValueKind::String(text) => text
            .chars()
            .next_back()
            .map(|ch| Value::string(ch.to_string()))
            .unwrap_or_else(Value::null),
        _ => Value::error(format!(
            "argument to `last` must be ARRAY or STRING, got {}",
            arg.value_type()
        )),
    }
}

fn rest(args: &[Value]) -> Value {
    let [arg] = args else {
        return wrong_arity(args, 1);
    };
    match arg.kind() {
        ValueKind::Array(values) => match values.split_first() {
            Some((_, tail)) => Value::array(tail.to_vec()),
            None => Value::null(),
        },
        _ => Value::error(format!(
            "argument to `rest` must be ARRAY, got {}",
            arg.value_type()
        )),
    }
}

fn push(args: &[Value]) -> Value {
    let [target, item] = args else {
        return wrong_arity(args, 2);
    };
    match target.kind() {
        ValueKind::Array(values) => {
            let mut extended = values.clone();
            extended.push(item.clone());
            Value::array(extended)
        }
        _ => Value::error(format!(
            "argument to `push` must be ARRAY, got {}",
            target.value_type()
        )),
    }
}
