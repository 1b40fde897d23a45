use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A callable task: positional JSON arguments in, a JSON value or an error message out.
pub type TaskFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Functions callable by name on the workers, registered by the hosting runtime.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskFn>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, task: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.tasks.insert(name.into(), Arc::new(task));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TaskFn> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.names())
            .finish()
    }
}
