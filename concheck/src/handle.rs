//! Binding an implementation under test to the methods that may be called on it.
use std::any::type_name;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::Error;
use crate::operation::{Argument, Fault, MethodKind, MethodRef, OperationCall, Outcome};

/// A function that calls a method of `T`.
pub type Invoker<T> = fn(&T, Option<Argument>) -> Outcome;

/// The definition of a method that can be called on an object of type `T`.
pub struct MethodDef<T> {
    pub name: &'static str,
    pub arity: usize,
    pub kind: MethodKind,
    pub invoker: Invoker<T>,
}

impl<T> MethodDef<T> {
    pub fn new(name: &'static str, arity: usize, kind: MethodKind, invoker: Invoker<T>) -> Self {
        Self {
            name,
            arity,
            kind,
            invoker,
        }
    }
}

/// A concurrent object that can be tested for linearizability.
///
/// The object is shared by every worker thread of a run, and must therefore
/// synchronize itself, if it synchronizes at all.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use concheck::handle::{ConcurrentObject, Handle, MethodDef};
/// use concheck::operation::{Fault, MethodKind, Value};
///
/// struct Counter(AtomicI64);
///
/// impl ConcurrentObject for Counter {
///     fn instantiate() -> Result<Self, Fault> {
///         Ok(Counter(AtomicI64::new(0)))
///     }
///
///     fn methods() -> Vec<MethodDef<Self>> {
///         vec![MethodDef::new("increment", 0, MethodKind::Insert, |counter: &Counter, _| {
///             Ok(Value::Int(counter.0.fetch_add(1, Ordering::SeqCst) + 1))
///         })]
///     }
/// }
///
/// let handle = Handle::new::<Counter>(&["increment"]).unwrap();
/// assert_eq!(handle.methods().len(), 1);
/// assert!(Handle::new::<Counter>(&["decrement"]).is_err());
/// ```
pub trait ConcurrentObject: Send + Sync + Sized + 'static {
    /// Creates a new, empty, object.
    fn instantiate() -> Result<Self, Fault>;

    /// Returns every method that can be called on the object.
    fn methods() -> Vec<MethodDef<Self>>;
}

/// An object under test, with its dispatch table.
pub trait Instance: Send + Sync {
    /// Calls the method in `slot` of the dispatch table.
    fn invoke(&self, slot: usize, argument: Option<Argument>) -> Outcome;
}

struct Bound<T> {
    object: T,
    table: Arc<[Invoker<T>]>,
}

impl<T: ConcurrentObject> Instance for Bound<T> {
    fn invoke(&self, slot: usize, argument: Option<Argument>) -> Outcome {
        (self.table[slot])(&self.object, argument)
    }
}

type Factory = Box<dyn Fn() -> Result<Arc<dyn Instance>, Fault> + Send + Sync>;

/// An implementation under test, bound to a whitelist of its methods.
///
/// The dispatch table is resolved once, when the handle is created, so that
/// invoking a method is a single indexed call.
pub struct Handle {
    type_name: &'static str,
    methods: Vec<MethodRef>,
    factory: Factory,
}

impl Handle {
    /// Binds the methods of `T` with the given names.
    ///
    /// An empty list of names binds every method of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if an object of type `T` cannot be
    /// instantiated, or if `T` has no method with one of the given names.
    pub fn new<T: ConcurrentObject>(names: &[&str]) -> Result<Self, Error> {
        let type_name = type_name::<T>();
        let definitions = T::methods();

        let selected: Vec<&MethodDef<T>> = if names.is_empty() {
            definitions.iter().collect()
        } else {
            let mut selected = Vec::with_capacity(names.len());
            for name in names {
                match definitions.iter().find(|def| def.name == *name) {
                    Some(def) if !selected.iter().any(|s: &&MethodDef<T>| s.name == def.name) => {
                        selected.push(def)
                    }
                    Some(_) => {}
                    None => {
                        return Err(Error::Configuration(format!(
                            "{type_name} has no method named '{name}'"
                        )))
                    }
                }
            }
            selected
        };

        let methods = selected
            .iter()
            .enumerate()
            .map(|(slot, def)| MethodRef {
                name: def.name,
                arity: def.arity,
                kind: def.kind,
                slot,
            })
            .collect();
        let table: Arc<[Invoker<T>]> = selected.iter().map(|def| def.invoker).collect();

        let factory: Factory = Box::new(move || {
            let object = T::instantiate()?;
            Ok(Arc::new(Bound {
                object,
                table: table.clone(),
            }) as Arc<dyn Instance>)
        });

        // Fail now, rather than in the middle of a run.
        if let Err(fault) = factory() {
            return Err(Error::Configuration(format!(
                "{type_name} cannot be instantiated: {fault}"
            )));
        }

        Ok(Self {
            type_name,
            methods,
            factory,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the bound methods, for generating schedules.
    pub fn methods(&self) -> &[MethodRef] {
        &self.methods
    }

    /// Returns the bound method with the given name.
    pub fn method(&self, name: &str) -> Option<MethodRef> {
        self.methods.iter().find(|method| method.name == name).copied()
    }

    /// Returns a call of the bound method with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no such method is bound, or if the
    /// argument does not match the method's arity.
    pub fn call(&self, name: &str, argument: Option<Argument>) -> Result<OperationCall, Error> {
        let method = self.method(name).ok_or_else(|| {
            Error::Configuration(format!("method '{name}' is not bound by this handle"))
        })?;
        let call = OperationCall::new(method, argument);
        if !call.has_valid_arity() {
            return Err(Error::Configuration(format!(
                "'{call}' does not match the arity of '{name}', which is {}",
                method.arity
            )));
        }
        Ok(call)
    }

    /// Returns whether `call` refers to a method bound by this handle.
    pub fn binds(&self, call: &OperationCall) -> bool {
        self.methods.get(call.method().slot) == Some(call.method())
    }

    /// Creates a new object to test.
    pub fn instantiate(&self) -> Result<Arc<dyn Instance>, Error> {
        (self.factory)().map_err(|fault| {
            Error::Configuration(format!("{} cannot be instantiated: {fault}", self.type_name))
        })
    }

    /// Performs a call on the object, returning its result or fault.
    ///
    /// Panics raised by the object are caught and returned as faults.
    pub fn invoke(&self, instance: &dyn Instance, call: &OperationCall) -> Outcome {
        let slot = call.method().slot;
        let argument = call.argument();
        catch_unwind(AssertUnwindSafe(|| instance.invoke(slot, argument)))
            .unwrap_or_else(|payload| Err(Fault::from_panic(payload)))
    }
}
