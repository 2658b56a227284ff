use std::{
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::{ast::FunctionLiteral, environment::EnvironmentRef};

/// Runtime type tags, spelled the way error messages print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Integer,
    Double,
    Boolean,
    String,
    Array,
    Hash,
    Range,
    Function,
    Builtin,
    ReturnValue,
    Error,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Null => "NULL",
            ValueType::Integer => "INTEGER",
            ValueType::Double => "DOUBLE",
            ValueType::Boolean => "BOOLEAN",
            ValueType::String => "STRING",
            ValueType::Array => "ARRAY",
            ValueType::Hash => "HASH",
            ValueType::Range => "RANGE",
            ValueType::Function => "FUNCTION",
            ValueType::Builtin => "BUILTIN",
            ValueType::ReturnValue => "RETURN_VALUE",
            ValueType::Error => "ERROR",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a hash-map key: the key's type plus a deterministic hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: ValueType,
    pub hash: u64,
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// Insertion-ordered so that display follows source order.
pub type HashPairs = IndexMap<HashKey, HashPair>;

#[derive(Clone)]
pub struct UserFunction {
    pub literal: Rc<FunctionLiteral>,
    pub env: EnvironmentRef,
}

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub callback: fn(&[Value]) -> Value,
}

impl NativeFunction {
    pub fn call(&self, args: &[Value]) -> Value {
        (self.callback)(args)
    }
}

#[derive(Clone)]
pub enum ValueKind {
    Null,
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Array(Vec<Value>),
    Hash(HashPairs),
    Range { lo: i64, hi: i64 },
    Function(UserFunction),
    Builtin(NativeFunction),
    /// Marks a pending `return`; absorbed at the nearest call boundary.
    ReturnSignal(Value),
    Error(String),
}

#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn null() -> Self {
        Self::new(ValueKind::Null)
    }

    pub fn integer(value: i64) -> Self {
        Self::new(ValueKind::Integer(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(ValueKind::Double(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ValueKind::Boolean(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()))
    }

    pub fn array(values: Vec<Value>) -> Self {
        Self::new(ValueKind::Array(values))
    }

    pub fn hash(pairs: HashPairs) -> Self {
        Self::new(ValueKind::Hash(pairs))
    }

    pub fn range(lo: i64, hi: i64) -> Self {
        Self::new(ValueKind::Range { lo, hi })
    }

    pub fn function(literal: Rc<FunctionLiteral>, env: EnvironmentRef) -> Self {
        Self::new(ValueKind::Function(UserFunction { literal, env }))
    }

    pub fn builtin(function: NativeFunction) -> Self {
        Self::new(ValueKind::Builtin(function))
    }

    pub fn return_signal(value: Value) -> Self {
        Self::new(ValueKind::ReturnSignal(value))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ValueKind::Error(message.into()))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.0
    }

    pub fn value_type(&self) -> ValueType {
        match &*self.0 {
            ValueKind::Null => ValueType::Null,
            ValueKind::Integer(_) => ValueType::Integer,
            ValueKind::Double(_) => ValueType::Double,
            ValueKind::Boolean(_) => ValueType::Boolean,
            ValueKind::String(_) => ValueType::String,
            ValueKind::Array(_) => ValueType::Array,
            ValueKind::Hash(_) => ValueType::Hash,
            ValueKind::Range { .. } => ValueType::Range,
            ValueKind::Function(_) => ValueType::Function,
            ValueKind::Builtin(_) => ValueType::Builtin,
            ValueKind::ReturnSignal(_) => ValueType::ReturnValue,
            ValueKind::Error(_) => ValueType::Error,
        }
    }

    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match &*self.0 {
            ValueKind::Null => false,
            ValueKind::Boolean(b) => *b,
            _ => true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(&*self.0, ValueKind::Error(_))
    }

    pub fn is_return_signal(&self) -> bool {
        matches!(&*self.0, ValueKind::ReturnSignal(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(&*self.0, ValueKind::Null)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &*self.0 {
            ValueKind::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Strips one `ReturnSignal` layer, if present.
    pub fn unwrap_return(self) -> Value {
        if let ValueKind::ReturnSignal(inner) = &*self.0 {
            return inner.clone();
        }
        self
    }

    /// `None` for values that cannot key a hash.
    pub fn hash_key(&self) -> Option<HashKey> {
        let hash = match &*self.0 {
            ValueKind::Integer(n) => *n as u64,
            ValueKind::Boolean(b) => u64::from(*b),
            ValueKind::String(s) => {
                // FxHasher carries no per-process seed, so keys are stable across runs.
                let mut hasher = FxHasher::default();
                s.hash(&mut hasher);
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            kind: self.value_type(),
            hash,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (ValueKind::Null, ValueKind::Null) => true,
            (ValueKind::Integer(a), ValueKind::Integer(b)) => a == b,
            (ValueKind::Double(a), ValueKind::Double(b)) => a == b,
            (ValueKind::Integer(a), ValueKind::Double(b))
            | (ValueKind::Double(b), ValueKind::Integer(a)) => *a as f64 == *b,
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Array(a), ValueKind::Array(b)) => a == b,
            (ValueKind::Hash(a), ValueKind::Hash(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, pair)| {
                        b.get(key)
                            .map(|rhs| pair.value == rhs.value)
                            .unwrap_or(false)
                    })
            }
            (
                ValueKind::Range { lo: a_lo, hi: a_hi },
                ValueKind::Range { lo: b_lo, hi: b_hi },
            ) => a_lo == b_lo && a_hi == b_hi,
            (ValueKind::Function(_), ValueKind::Function(_)) => Rc::ptr_eq(&self.0, &other.0),
            (ValueKind::Builtin(a), ValueKind::Builtin(b)) => a.name == b.name,
            (ValueKind::ReturnSignal(a), ValueKind::ReturnSignal(b)) => a == b,
            (ValueKind::Error(a), ValueKind::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::String(s) => write!(f, "{s:?}"),
            ValueKind::Array(values) => f.debug_list().entries(values.iter()).finish(),
            ValueKind::Hash(pairs) => f
                .debug_map()
                .entries(pairs.values().map(|pair| (&pair.key, &pair.value)))
                .finish(),
            ValueKind::Function(fun) => write!(f, "<fn/{}>", fun.literal.parameters.len()),
            ValueKind::Builtin(fun) => write!(f, "<builtin {}>", fun.name),
            ValueKind::ReturnSignal(inner) => write!(f, "Return({inner:?})"),
            ValueKind::Error(message) => write!(f, "Error({message:?})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Integer(n) => write!(f, "{n}"),
            ValueKind::Double(n) => write!(f, "{n:?}"),
            ValueKind::Boolean(b) => write!(f, "{b}"),
            ValueKind::String(s) => write!(f, "{s}"),
            ValueKind::Array(values) => {
                write!(f, "[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            ValueKind::Hash(pairs) => {
                write!(f, "{{")?;
                for (idx, pair) in pairs.values().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            ValueKind::Range { lo, hi } => write!(f, "{lo}..{hi}"),
            ValueKind::Function(fun) => {
                write!(f, "fn(")?;
                for (idx, param) in fun.literal.parameters.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") {{\n{}\n}}", fun.literal.body)
            }
            ValueKind::Builtin(_) => write!(f, "builtin function"),
            ValueKind::ReturnSignal(inner) => write!(f, "{inner}"),
            ValueKind::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}
