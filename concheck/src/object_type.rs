//! The kinds of objects that can be verified, and their sequential semantics.
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use concheck_utils::specifications::deque::{DequeOperation, DequeSpecification, End};
use concheck_utils::specifications::map::{MapOperation, MapSpecification};
use concheck_utils::specifications::queue::{QueueOperation, QueueSpecification};
use concheck_utils::specifications::set::{SetOperation, SetSpecification};
use concheck_utils::{Action, CheckError, Specification, WGLChecker};
use tracing::warn;

use crate::error::Error;
use crate::history::{Event, History};
use crate::operation::{Argument, OperationCall, Value};

/// The kind of object an implementation claims to be, which determines the
/// sequential behavior its history is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// A first-in-first-out queue.
    Queue,
    /// A map from keys to values, in which puts overwrite.
    Map,
    /// A set, in which adds and removes are idempotent.
    Set,
    /// A double-ended queue.
    Deque,
}

const QUEUE_METHODS: &[&str] = &["offer", "add", "poll", "peek", "size", "is_empty"];
const MAP_METHODS: &[&str] = &["put", "remove", "get", "contains_key", "size", "is_empty"];
const SET_METHODS: &[&str] = &["add", "remove", "contains", "size", "is_empty"];
const DEQUE_METHODS: &[&str] = &[
    "offer_first",
    "offer_last",
    "poll_first",
    "poll_last",
    "peek_first",
    "peek_last",
    "size",
    "is_empty",
];

impl ObjectType {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Queue => "queue",
            ObjectType::Map => "map",
            ObjectType::Set => "set",
            ObjectType::Deque => "deque",
        }
    }

    /// Returns the names of the methods understood by the sequential model.
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            ObjectType::Queue => QUEUE_METHODS,
            ObjectType::Map => MAP_METHODS,
            ObjectType::Set => SET_METHODS,
            ObjectType::Deque => DEQUE_METHODS,
        }
    }

    pub fn supports(&self, method: &str) -> bool {
        self.methods().contains(&method)
    }

    /// Checks whether `history` is linearizable with respect to the sequential
    /// model of this object type.
    ///
    /// Operations that raised a fault may or may not have taken effect, but
    /// if they did, it was before their fault was recorded. A response whose value has the
    /// wrong shape for its method cannot be explained by any sequential
    /// execution, so the history is not linearizable.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] if the checker explores more than
    /// `max_states` states, or is still searching at `deadline`.
    pub fn check(
        &self,
        history: &History,
        max_states: usize,
        deadline: Option<Instant>,
    ) -> Result<bool, CheckError> {
        match self {
            ObjectType::Queue => check_with(
                QueueSpecification::<i64>::new(),
                history,
                queue_operation,
                max_states,
                deadline,
            ),
            ObjectType::Map => check_with(
                MapSpecification::<i64, i64>::new(),
                history,
                map_operation,
                max_states,
                deadline,
            ),
            ObjectType::Set => check_with(
                SetSpecification::<i64>::new(),
                history,
                set_operation,
                max_states,
                deadline,
            ),
            ObjectType::Deque => check_with(
                DequeSpecification::<i64>::new(),
                history,
                deque_operation,
                max_states,
                deadline,
            ),
        }
    }
}

impl AsRef<str> for ObjectType {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queue" => Ok(ObjectType::Queue),
            "map" => Ok(ObjectType::Map),
            "set" => Ok(ObjectType::Set),
            "deque" => Ok(ObjectType::Deque),
            _ => Err(Error::Configuration(format!("unknown object type '{s}'"))),
        }
    }
}

/// A recorded operation that cannot be expressed in the sequential model.
#[derive(Debug, thiserror::Error)]
enum Malformed {
    #[error("{call} returned {value}, which is not {expected}")]
    Response {
        call: OperationCall,
        value: Value,
        expected: &'static str,
    },
    #[error("{call} does not have the argument its method takes")]
    Argument { call: OperationCall },
    #[error("{call} is not understood by the model")]
    Method { call: OperationCall },
}

type Converter<Op> = fn(&OperationCall, Option<&Value>) -> Result<Op, Malformed>;

fn check_with<S: Specification>(
    spec: S,
    history: &History,
    convert: Converter<S::Operation>,
    max_states: usize,
    deadline: Option<Instant>,
) -> Result<bool, CheckError> {
    let mut actions = Vec::with_capacity(2 * history.len());
    // Every operation is given its own process. Program order is already
    // captured by the stamps.
    for (process, event) in history.events() {
        let action = match event {
            Event::Invocation(record) => convert(&record.call, None).map(Action::Call),
            Event::Response(record) => match &record.outcome {
                Ok(value) => convert(&record.call, Some(value)).map(Action::Response),
                Err(_) => convert(&record.call, None).map(Action::Fault),
            },
        };
        match action {
            Ok(action) => actions.push((process, action)),
            Err(malformed) => {
                warn!(%malformed, "history cannot be explained by the model");
                return Ok(false);
            }
        }
    }

    let mut checker = WGLChecker::new(spec).with_max_states(max_states);
    if let Some(deadline) = deadline {
        checker = checker.with_deadline(deadline);
    }
    checker.check(concheck_utils::History::from_actions(actions))
}

fn int_argument(call: &OperationCall) -> Result<i64, Malformed> {
    match call.argument() {
        Some(Argument::Int(value)) => Ok(value),
        _ => Err(Malformed::Argument { call: *call }),
    }
}

fn pair_argument(call: &OperationCall) -> Result<(i64, i64), Malformed> {
    match call.argument() {
        Some(Argument::Pair(key, value)) => Ok((key, value)),
        _ => Err(Malformed::Argument { call: *call }),
    }
}

fn boolean(call: &OperationCall, result: Option<&Value>) -> Result<Option<bool>, Malformed> {
    result
        .map(|value| {
            value.as_bool().ok_or(Malformed::Response {
                call: *call,
                value: *value,
                expected: "a boolean",
            })
        })
        .transpose()
}

/// Like [`boolean`], but a method that returns nothing is taken to have
/// accepted its element.
fn acceptance(call: &OperationCall, result: Option<&Value>) -> Result<Option<bool>, Malformed> {
    match result {
        Some(Value::Nil) => Ok(Some(true)),
        _ => boolean(call, result),
    }
}

fn element(call: &OperationCall, result: Option<&Value>) -> Result<Option<Option<i64>>, Malformed> {
    result
        .map(|value| {
            value.as_optional_int().ok_or(Malformed::Response {
                call: *call,
                value: *value,
                expected: "an integer or nil",
            })
        })
        .transpose()
}

fn count(call: &OperationCall, result: Option<&Value>) -> Result<Option<usize>, Malformed> {
    result
        .map(|value| {
            value.as_count().ok_or(Malformed::Response {
                call: *call,
                value: *value,
                expected: "a count",
            })
        })
        .transpose()
}

fn queue_operation(
    call: &OperationCall,
    result: Option<&Value>,
) -> Result<QueueOperation<i64>, Malformed> {
    Ok(match call.method().name() {
        "offer" | "add" => QueueOperation::Offer(int_argument(call)?, acceptance(call, result)?),
        "poll" => QueueOperation::Poll(element(call, result)?),
        "peek" => QueueOperation::Peek(element(call, result)?),
        "size" => QueueOperation::Size(count(call, result)?),
        "is_empty" => QueueOperation::IsEmpty(boolean(call, result)?),
        _ => return Err(Malformed::Method { call: *call }),
    })
}

fn map_operation(
    call: &OperationCall,
    result: Option<&Value>,
) -> Result<MapOperation<i64, i64>, Malformed> {
    Ok(match call.method().name() {
        "put" => {
            let (key, value) = pair_argument(call)?;
            MapOperation::Put(key, value, element(call, result)?)
        }
        "get" => MapOperation::Get(int_argument(call)?, element(call, result)?),
        "remove" => MapOperation::Remove(int_argument(call)?, element(call, result)?),
        "contains_key" => MapOperation::ContainsKey(int_argument(call)?, boolean(call, result)?),
        "size" => MapOperation::Size(count(call, result)?),
        "is_empty" => MapOperation::IsEmpty(boolean(call, result)?),
        _ => return Err(Malformed::Method { call: *call }),
    })
}

fn set_operation(
    call: &OperationCall,
    result: Option<&Value>,
) -> Result<SetOperation<i64>, Malformed> {
    Ok(match call.method().name() {
        "add" => SetOperation::Add(int_argument(call)?, boolean(call, result)?),
        "remove" => SetOperation::Remove(int_argument(call)?, boolean(call, result)?),
        "contains" => SetOperation::Contains(int_argument(call)?, boolean(call, result)?),
        "size" => SetOperation::Size(count(call, result)?),
        "is_empty" => SetOperation::IsEmpty(boolean(call, result)?),
        _ => return Err(Malformed::Method { call: *call }),
    })
}

fn deque_operation(
    call: &OperationCall,
    result: Option<&Value>,
) -> Result<DequeOperation<i64>, Malformed> {
    let end = |name: &str| {
        if name.ends_with("_first") {
            End::First
        } else {
            End::Last
        }
    };
    let name = call.method().name();
    Ok(match name {
        "offer_first" | "offer_last" => {
            DequeOperation::Offer(end(name), int_argument(call)?, acceptance(call, result)?)
        }
        "poll_first" | "poll_last" => DequeOperation::Poll(end(name), element(call, result)?),
        "peek_first" | "peek_last" => DequeOperation::Peek(end(name), element(call, result)?),
        "size" => DequeOperation::Size(count(call, result)?),
        "is_empty" => DequeOperation::IsEmpty(boolean(call, result)?),
        _ => return Err(Malformed::Method { call: *call }),
    })
}
