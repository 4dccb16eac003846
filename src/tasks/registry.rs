//! # Task registry - explicit name → factory mapping.
//!
//! The registry replaces directory-scanning dynamic discovery with an
//! explicitly constructed table, populated at startup and passed into the
//! controller (no process-wide singletons). Each resolve produces a fresh
//! task instance via the registered factory; the controller itself is
//! agnostic to how the table was filled.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::tasks::task::{Runnable, TaskRef};

type TaskFactory = Arc<dyn Fn() -> TaskRef + Send + Sync>;

/// Mapping from task name to a factory producing task instances.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskFactory>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under the given name, replacing any previous
    /// registration.
    pub fn register<F, T>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
        T: Runnable,
    {
        self.tasks.insert(
            name.into(),
            Arc::new(move || {
                let task: TaskRef = factory();
                task
            }),
        );
    }

    /// Registers a single shared task instance under the given name.
    ///
    /// Convenience for stateless tasks where every resolve may return the
    /// same handle.
    pub fn register_task(&mut self, name: impl Into<String>, task: TaskRef) {
        self.tasks.insert(name.into(), Arc::new(move || task.clone()));
    }

    /// Resolves a name to a task instance.
    pub fn resolve(&self, name: &str) -> Result<TaskRef, RegistryError> {
        let factory = self.tasks.get(name).ok_or_else(|| RegistryError::UnknownTask {
            name: name.to_string(),
        })?;
        Ok(factory())
    }

    /// True if a task is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Returns the sorted list of registered task names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;
    use tokio_util::sync::CancellationToken;

    fn noop() -> TaskRef {
        TaskFn::arc(|_worker: u32, _cancel: CancellationToken| async {
            Ok::<(), crate::error::TaskError>(())
        })
    }

    #[test]
    fn resolves_registered_tasks() {
        let mut reg = TaskRegistry::new();
        reg.register("a", || {
            TaskFn::arc(|_worker: u32, _cancel: CancellationToken| async {
                Ok::<(), crate::error::TaskError>(())
            })
        });
        reg.register_task("b", noop());

        assert!(reg.resolve("a").is_ok());
        assert!(reg.resolve("b").is_ok());
        assert!(reg.contains("a"));
        assert_eq!(reg.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let reg = TaskRegistry::new();
        match reg.resolve("ghost") {
            Err(RegistryError::UnknownTask { name }) => assert_eq!(name, "ghost"),
            Ok(_) => panic!("resolve of unregistered name succeeded"),
        }
    }
}
