//! Descriptions of the operations performed on an object under test.
use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A value returned by an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// No value, such as the result of polling an empty queue.
    Nil,
    Bool(bool),
    Int(i64),
}

impl Value {
    /// Returns the value as an optional integer, where [`Value::Nil`] is `None`.
    ///
    /// Returns `None` if the value is a boolean.
    pub fn as_optional_int(&self) -> Option<Option<i64>> {
        match self {
            Value::Nil => Some(None),
            Value::Int(value) => Some(Some(*value)),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            Value::Int(value) => usize::try_from(*value).ok(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<Option<i64>> for Value {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Value::Nil, Value::Int)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
        }
    }
}

/// The argument of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    Int(i64),
    /// A key and a value.
    Pair(i64, i64),
}

impl Argument {
    /// The number of parameters this argument supplies.
    pub fn arity(&self) -> usize {
        match self {
            Argument::Int(_) => 1,
            Argument::Pair(_, _) => 2,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Int(value) => write!(f, "{value}"),
            Argument::Pair(key, value) => write!(f, "{key}, {value}"),
        }
    }
}

/// The failure of an operation, raised by the object under test.
///
/// A fault is data about the object, not an error of the framework: it is
/// recorded as the operation's response.
#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
#[error("{message}")]
pub struct Fault {
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a fault from the payload of a panic.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_owned()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "operation panicked".to_owned()
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The response of an operation.
pub type Outcome = Result<Value, Fault>;

/// How a method affects the object it is called on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Adds its argument to the object (`offer`, `put`, `add`).
    Insert,
    /// Takes something out of the object (`poll`, `remove`).
    Remove,
    /// Observes the object without changing it (`peek`, `get`, `contains`).
    Read,
}

impl MethodKind {
    pub fn is_mutator(&self) -> bool {
        !matches!(self, MethodKind::Read)
    }
}

/// A method bound by a [`Handle`](crate::handle::Handle).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub(crate) name: &'static str,
    pub(crate) arity: usize,
    pub(crate) kind: MethodKind,
    // Position of the method in its handle's dispatch table.
    pub(crate) slot: usize,
}

impl MethodRef {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn is_mutator(&self) -> bool {
        self.kind.is_mutator()
    }
}

/// The call of a method, with its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperationCall {
    argument: Option<Argument>,
    method: MethodRef,
}

impl OperationCall {
    pub fn new(method: MethodRef, argument: Option<Argument>) -> Self {
        Self { argument, method }
    }

    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    pub fn argument(&self) -> Option<Argument> {
        self.argument
    }

    /// Returns whether the argument supplies exactly as many parameters as the method takes.
    pub fn has_valid_arity(&self) -> bool {
        self.argument.map_or(0, |argument| argument.arity()) == self.method.arity
    }
}

impl fmt::Display for OperationCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument {
            Some(argument) => write!(f, "{}({argument})", self.method.name),
            None => write!(f, "{}()", self.method.name),
        }
    }
}
