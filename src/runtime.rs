use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    ast::{
        BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
    },
    diagnostics::{MarmosetError, Result},
    environment::{Environment, EnvironmentRef},
    parser,
    stdlib::Builtins,
    value::{HashPair, HashPairs, Value, ValueKind},
};

/// Returns early from the enclosing evaluation when a sub-result is an
/// `Error` or a pending `return`; otherwise yields the value.
macro_rules! propagate {
    ($value:expr) => {{
        let value = $value;
        if value.is_error() || value.is_return_signal() {
            return value;
        }
        value
    }};
}

/// Owns a persistent root scope so that successive inputs (REPL lines,
/// script chunks) see each other's bindings.
pub struct Interpreter {
    env: EnvironmentRef,
    builtins: &'static Builtins,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_builtins(Builtins::global())
    }

    pub fn with_builtins(builtins: &'static Builtins) -> Self {
        Self {
            env: Environment::new_root(),
            builtins,
        }
    }

    pub fn env(&self) -> &EnvironmentRef {
        &self.env
    }

    /// Parses and evaluates `source`. Parse errors come back as
    /// `MarmosetError::Parse`; language errors come back as `Ok` holding an
    /// `Error` value.
    pub fn eval_source(&mut self, source: &str) -> Result<Value> {
        let (program, errors) = parser::parse_program(source);
        if !errors.is_empty() {
            debug!(errors = errors.len(), "refusing to evaluate program");
            return Err(MarmosetError::Parse(errors));
        }
        Ok(self.eval_program(&program))
    }

    pub fn eval_program(&mut self, program: &Program) -> Value {
        debug!(statements = program.statements.len(), "evaluating program");
        Evaluator::new(self.builtins).eval_program(program, &self.env)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tree-walking evaluator. Stateless apart from the builtin table; every
/// call receives the scope to evaluate in.
pub struct Evaluator<'a> {
    builtins: &'a Builtins,
}

impl<'a> Evaluator<'a> {
    pub fn new(builtins: &'a Builtins) -> Self {
        Self { builtins }
    }

    /// The top level behaves like a function body: a `return` ends it and
    /// yields the returned value.
    pub fn eval_program(&self, program: &Program, env: &EnvironmentRef) -> Value {
        let mut result = Value::null();
        for stmt in &program.statements {
            result = self.eval_statement(stmt, env);
            if result.is_return_signal() {
                return result.unwrap_return();
            }
            if result.is_error() {
                return result;
            }
        }
        result
    }

    pub fn eval_block(&self, block: &BlockStatement, env: &EnvironmentRef) -> Value {
        let mut result = Value::null();
        for stmt in &block.statements {
            result = self.eval_statement(stmt, env);
            if result.is_return_signal() || result.is_error() {
                return result;
            }
        }
        result
    }

    pub fn eval_statement(&self, stmt: &Statement, env: &EnvironmentRef) -> Value {
        match stmt {
            Statement::Let { name, value } => {
                let value = propagate!(self.eval_expression(value, env));
                env.borrow_mut().bind(name.name.clone(), value.clone());
                value
            }
            Statement::Return(Some(expr)) => {
                let value = propagate!(self.eval_expression(expr, env));
                Value::return_signal(value)
            }
            Statement::Return(None) => Value::return_signal(Value::null()),
            Statement::Expression(expr) => self.eval_expression(expr, env),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }

    pub fn eval_expression(&self, expr: &Expression, env: &EnvironmentRef) -> Value {
        match expr {
            Expression::Identifier(ident) => self.eval_identifier(ident, env),
            Expression::Integer(n) => Value::integer(*n),
            Expression::Double(n) => Value::double(*n),
            Expression::String(s) => Value::string(s.clone()),
            Expression::Boolean(b) => Value::boolean(*b),
            Expression::Range { lo, hi } => {
                let lo = propagate!(self.eval_expression(lo, env));
                let hi = propagate!(self.eval_expression(hi, env));
                match (lo.kind(), hi.kind()) {
                    (ValueKind::Integer(lo), ValueKind::Integer(hi)) => Value::range(*lo, *hi),
                    _ => operator_error("..", &lo, &hi),
                }
            }
            Expression::Array(elements) => match self.eval_expressions(elements, env) {
                Ok(values) => Value::array(values),
                Err(interrupt) => interrupt,
            },
            Expression::Hash(entries) => self.eval_hash(entries, env),
            Expression::Prefix { operator, operand } => {
                let operand = propagate!(self.eval_expression(operand, env));
                eval_prefix(*operator, &operand)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = propagate!(self.eval_expression(left, env));
                let right = propagate!(self.eval_expression(right, env));
                eval_infix(*operator, &left, &right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let test = propagate!(self.eval_expression(condition, env));
                if test.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Value::null()
                }
            }
            Expression::While { condition, body } => {
                loop {
                    let test = propagate!(self.eval_expression(condition, env));
                    if !test.is_truthy() {
                        break;
                    }
                    propagate!(self.eval_block(body, env));
                }
                Value::null()
            }
            Expression::Function(literal) => Value::function(Rc::clone(literal), Rc::clone(env)),
            Expression::Call { callee, arguments } => {
                let callee = propagate!(self.eval_expression(callee, env));
                match self.eval_expressions(arguments, env) {
                    Ok(args) => self.apply_function(&callee, args),
                    Err(interrupt) => interrupt,
                }
            }
            Expression::Index { collection, index } => {
                let collection = propagate!(self.eval_expression(collection, env));
                let index = propagate!(self.eval_expression(index, env));
                eval_index(&collection, &index)
            }
        }
    }

    /// Left to right; stops at the first error or pending return.
    fn eval_expressions(
        &self,
        exprs: &[Expression],
        env: &EnvironmentRef,
    ) -> std::result::Result<Vec<Value>, Value> {
        exprs
            .iter()
            .map(|expr| {
                let value = self.eval_expression(expr, env);
                if value.is_error() || value.is_return_signal() {
                    Err(value)
                } else {
                    Ok(value)
                }
            })
            .collect()
    }

    fn eval_identifier(&self, ident: &Identifier, env: &EnvironmentRef) -> Value {
        if let Some(value) = Environment::lookup(env, &ident.name) {
            return value;
        }
        if let Some(builtin) = self.builtins.get(&ident.name) {
            return builtin;
        }
        Value::error(format!("identifier not found: {}", ident.name))
    }

    fn eval_hash(&self, entries: &[(Expression, Expression)], env: &EnvironmentRef) -> Value {
        let mut pairs = HashPairs::with_capacity(entries.len());
        for (key_expr, value_expr) in entries {
            let key = propagate!(self.eval_expression(key_expr, env));
            let Some(hash_key) = key.hash_key() else {
                return Value::error(format!("unusable as hash key: {}", key.value_type()));
            };
            let value = propagate!(self.eval_expression(value_expr, env));
            pairs.insert(hash_key, HashPair { key, value });
        }
        Value::hash(pairs)
    }

    fn apply_function(&self, callee: &Value, args: Vec<Value>) -> Value {
        match callee.kind() {
            ValueKind::Function(function) => {
                trace!(
                    params = function.literal.parameters.len(),
                    args = args.len(),
                    "calling function"
                );
                let frame = Environment::new_child(&function.env);
                {
                    let mut scope = frame.borrow_mut();
                    // Extra arguments are dropped; missing ones stay unbound.
                    for (param, arg) in function.literal.parameters.iter().zip(args) {
                        scope.bind(param.name.clone(), arg);
                    }
                }
                self.eval_block(&function.literal.body, &frame)
                    .unwrap_return()
            }
            ValueKind::Builtin(native) => {
                trace!(builtin = native.name, args = args.len(), "calling builtin");
                native.call(&args)
            }
            _ => Value::error(format!("not a function: {}", callee.value_type())),
        }
    }
}

fn eval_prefix(operator: PrefixOperator, operand: &Value) -> Value {
    match (operator, operand.kind()) {
        (PrefixOperator::Not, _) => Value::boolean(!operand.is_truthy()),
        (PrefixOperator::Negate, ValueKind::Integer(n)) => match n.checked_neg() {
            Some(negated) => Value::integer(negated),
            None => Value::error(format!("integer overflow: -{n}")),
        },
        (PrefixOperator::Negate, ValueKind::Double(n)) => Value::double(-n),
        (PrefixOperator::Negate, _) => {
            Value::error(format!("unknown operator: -{}", operand.value_type()))
        }
    }
}

fn eval_infix(operator: InfixOperator, left: &Value, right: &Value) -> Value {
    use ValueKind as K;

    let result = match (left.kind(), right.kind()) {
        (K::Integer(a), K::Integer(b)) => integer_infix(operator, *a, *b),
        (K::Integer(a), K::Double(b)) => double_infix(operator, *a as f64, *b),
        (K::Double(a), K::Integer(b)) => double_infix(operator, *a, *b as f64),
        (K::Double(a), K::Double(b)) => double_infix(operator, *a, *b),
        (K::String(a), K::String(b)) => string_infix(operator, a, b),
        (K::String(a), K::Integer(n)) => string_integer_infix(operator, a, *n),
        (K::Array(a), K::Array(b)) => array_infix(operator, a, b),
        (K::Hash(a), K::Hash(b)) => hash_infix(operator, a, b),
        (K::Hash(pairs), _) if operator == InfixOperator::Sub => right.hash_key().map(|key| {
            let mut remaining = pairs.clone();
            remaining.shift_remove(&key);
            Value::hash(remaining)
        }),
        (K::Boolean(a), K::Boolean(b)) => match operator {
            InfixOperator::And => Some(Value::boolean(*a && *b)),
            InfixOperator::Or => Some(Value::boolean(*a || *b)),
            _ => None,
        },
        _ => None,
    };

    if let Some(value) = result {
        return value;
    }
    match operator {
        InfixOperator::Equal => Value::boolean(left == right),
        InfixOperator::NotEqual => Value::boolean(left != right),
        _ => operator_error(operator.symbol(), left, right),
    }
}

fn operator_error(symbol: &str, left: &Value, right: &Value) -> Value {
    let (left_type, right_type) = (left.value_type(), right.value_type());
    if left_type != right_type {
        Value::error(format!("type mismatch: {left_type} {symbol} {right_type}"))
    } else {
        Value::error(format!("unknown operator: {left_type} {symbol} {right_type}"))
    }
}

fn integer_infix(operator: InfixOperator, a: i64, b: i64) -> Option<Value> {
    let checked = |result: Option<i64>| match result {
        Some(value) => Value::integer(value),
        None => Value::error(format!("integer overflow: {a} {operator} {b}")),
    };
    let value = match operator {
        InfixOperator::Add => checked(a.checked_add(b)),
        InfixOperator::Sub => checked(a.checked_sub(b)),
        InfixOperator::Mul => checked(a.checked_mul(b)),
        InfixOperator::Div | InfixOperator::Mod if b == 0 => {
            Value::error(format!("division by zero: {a} {operator} {b}"))
        }
        InfixOperator::Div => checked(a.checked_div(b)),
        InfixOperator::Mod => checked(a.checked_rem(b)),
        InfixOperator::Less => Value::boolean(a < b),
        InfixOperator::LessEqual => Value::boolean(a <= b),
        InfixOperator::Greater => Value::boolean(a > b),
        InfixOperator::GreaterEqual => Value::boolean(a >= b),
        InfixOperator::Equal => Value::boolean(a == b),
        InfixOperator::NotEqual => Value::boolean(a != b),
        InfixOperator::And | InfixOperator::Or => return None,
    };
    Some(value)
}

fn double_infix(operator: InfixOperator, a: f64, b: f64) -> Option<Value> {
    let value = match operator {
        InfixOperator::Add => Value::double(a + b),
        InfixOperator::Sub => Value::double(a - b),
        InfixOperator::Mul => Value::double(a * b),
        InfixOperator::Div => Value::double(a / b),
        InfixOperator::Mod => Value::double(a % b),
        InfixOperator::Less => Value::boolean(a < b),
        InfixOperator::LessEqual => Value::boolean(a <= b),
        InfixOperator::Greater => Value::boolean(a > b),
        InfixOperator::GreaterEqual => Value::boolean(a >= b),
        InfixOperator::Equal => Value::boolean(a == b),
        InfixOperator::NotEqual => Value::boolean(a != b),
        InfixOperator::And | InfixOperator::Or => return None,
    };
    Some(value)
}

fn string_infix(operator: InfixOperator, a: &str, b: &str) -> Option<Value> {
    let value = match operator {
        InfixOperator::Add => Value::string(format!("{a}{b}")),
        InfixOperator::Less => Value::boolean(a < b),
        InfixOperator::LessEqual => Value::boolean(a <= b),
        InfixOperator::Greater => Value::boolean(a > b),
        InfixOperator::GreaterEqual => Value::boolean(a >= b),
        InfixOperator::Equal => Value::boolean(a == b),
        InfixOperator::NotEqual => Value::boolean(a != b),
        _ => return None,
    };
    Some(value)
}

fn string_integer_infix(operator: InfixOperator, text: &str, n: i64) -> Option<Value> {
    match operator {
        InfixOperator::Add => Some(Value::string(format!("{text}{n}"))),
        InfixOperator::Mul => {
            // A negative count repeats zero times.
            let count = usize::try_from(n).unwrap_or(0);
            let fits = text
                .len()
                .checked_mul(count)
                .is_some_and(|bytes| bytes <= isize::MAX as usize);
            if fits {
                Some(Value::string(text.repeat(count)))
            } else {
                Some(Value::error(format!(
                    "string repetition overflow: {} * {n}",
                    text.len()
                )))
            }
        }
        _ => None,
    }
}

fn array_infix(operator: InfixOperator, a: &[Value], b: &[Value]) -> Option<Value> {
    match operator {
        InfixOperator::Add => Some(Value::array(a.iter().chain(b).cloned().collect())),
        InfixOperator::Sub => {
            let mut remaining = a.to_vec();
            for item in b {
                if let Some(pos) = remaining.iter().position(|candidate| candidate == item) {
                    remaining.remove(pos);
                }
            }
            Some(Value::array(remaining))
        }
        _ => None,
    }
}

fn hash_infix(operator: InfixOperator, a: &HashPairs, b: &HashPairs) -> Option<Value> {
    match operator {
        InfixOperator::Add => {
            let mut merged = a.clone();
            for (key, pair) in b {
                merged.insert(*key, pair.clone());
            }
            Some(Value::hash(merged))
        }
        InfixOperator::Sub => {
            let mut remaining = a.clone();
            for key in b.keys() {
                remaining.shift_remove(key);
            }
            Some(Value::hash(remaining))
        }
        _ => None,
    }
}

fn eval_index(collection: &Value, index: &Value) -> Value {
    match (collection.kind(), index.kind()) {
        (ValueKind::Array(values), ValueKind::Integer(idx)) => {
            let len = values.len() as i64;
            let position = if *idx < 0 { len + idx } else { *idx };
            if (0..len).contains(&position) {
                values[position as usize].clone()
            } else {
                Value::null()
            }
        }
        (ValueKind::Array(values), ValueKind::Range { lo, hi }) => {
            let len = values.len() as i64;
            if *lo < 0 || *hi >= len || lo > hi {
                Value::null()
            } else {
                Value::array(values[*lo as usize..=*hi as usize].to_vec())
            }
        }
        (ValueKind::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or_else(Value::null),
            None => Value::error(format!("unusable as hash key: {}", index.value_type())),
        },
        _ => Value::error(format!(
            "index operator not supported: {}",
            collection.value_type()
        )),
    }
}
