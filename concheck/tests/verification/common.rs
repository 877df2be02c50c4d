use std::sync::Mutex;

use concheck::handle::{ConcurrentObject, MethodDef};
use concheck::operation::{Argument, Fault, MethodKind, Value};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("concheck=debug")
        .with_test_writer()
        .try_init();
}

/// A queue whose every third poll removes an element and then fails.
pub struct FlakyQueue {
    queue: Mutex<(Vec<i64>, usize)>,
}

impl FlakyQueue {
    fn offer(&self, argument: Option<Argument>) -> Result<Value, Fault> {
        let Some(Argument::Int(value)) = argument else {
            return Err(Fault::new("offer takes an integer"));
        };
        let mut guard = self.queue.lock().unwrap();
        guard.0.push(value);
        Ok(Value::Bool(true))
    }

    fn poll(&self, _: Option<Argument>) -> Result<Value, Fault> {
        let mut guard = self.queue.lock().unwrap();
        let head = if guard.0.is_empty() {
            None
        } else {
            Some(guard.0.remove(0))
        };
        guard.1 += 1;
        if guard.1 % 3 == 0 {
            return Err(Fault::new("connection reset"));
        }
        Ok(Value::from(head))
    }
}

impl ConcurrentObject for FlakyQueue {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self {
            queue: Mutex::new((Vec::new(), 0)),
        })
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("offer", 1, MethodKind::Insert, Self::offer),
            MethodDef::new("poll", 0, MethodKind::Remove, Self::poll),
        ]
    }
}
