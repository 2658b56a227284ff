use std::{fmt, rc::Rc};

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: Identifier, value: Expression },
    Return(Option<Expression>),
    Expression(Expression),
    Block(BlockStatement),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl InfixOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Sub => "-",
            InfixOperator::Mul => "*",
            InfixOperator::Div => "/",
            InfixOperator::Mod => "%",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::Less => "<",
            InfixOperator::LessEqual => "<=",
            InfixOperator::Greater => ">",
            InfixOperator::GreaterEqual => ">=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
        }
    }
}

impl PrefixOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOperator::Not => "!",
            PrefixOperator::Negate => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(i64),
    Double(f64),
    String(String),
    Boolean(bool),
    Range {
        lo: Box<Expression>,
        hi: Box<Expression>,
    },
    Array(Vec<Expression>),
    /// Key/value pairs in source order.
    Hash(Vec<(Expression, Expression)>),
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    While {
        condition: Box<Expression>,
        body: BlockStatement,
    },
    /// Shared so that function values can hold on to their body without
    /// copying the tree.
    Function(Rc<FunctionLiteral>),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        collection: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value};"),
            Statement::Return(Some(value)) => write!(f, "return {value};"),
            Statement::Return(None) => write!(f, "return;"),
            Statement::Expression(expr) => write!(f, "{expr}"),
            Statement::Block(block) => write!(f, "{block}"),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        write_separated(f, &self.parameters)?;
        write!(f, ") {{ {} }}", self.body)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::Integer(n) => write!(f, "{n}"),
            Expression::Double(n) => write!(f, "{n:?}"),
            Expression::String(s) => write!(f, "\"{s}\""),
            Expression::Boolean(b) => write!(f, "{b}"),
            Expression::Range { lo, hi } => write!(f, "({lo}..{hi})"),
            Expression::Array(elements) => {
                write!(f, "[")?;
                write_separated(f, elements)?;
                write!(f, "]")
            }
            Expression::Hash(pairs) => {
                write!(f, "{{")?;
                for (idx, (key, value)) in pairs.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expression::Prefix { operator, operand } => write!(f, "({operator}{operand})"),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {condition} {{ {consequence} }}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{ {alternative} }}")?;
                }
                Ok(())
            }
            Expression::While { condition, body } => {
                write!(f, "while {condition} {{ {body} }}")
            }
            Expression::Function(literal) => write!(f, "{literal}"),
            Expression::Call { callee, arguments } => {
                write!(f, "{callee}(")?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { collection, index } => write!(f, "({collection}[{index}])"),
        }
    }
}

fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
