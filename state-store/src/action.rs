//! Callable fields carried inside state records
//!
//! Stores commonly expose their mutations as fields of the state itself
//! (`increment`, `login`, ...). An [`Action`] is the clonable, comparable
//! wrapper those fields use. Actions usually close over the bound
//! [`SetState`](crate::SetState) and [`GetState`](crate::GetState) handles
//! passed to the store initializer.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A shared zero-argument procedure stored on a state record
///
/// Cloning an action is cheap and yields the same procedure. Two actions are
/// equal only when they share the same allocation, so a merged record that
/// kept its action fields still compares equal on them.
#[derive(Clone)]
pub struct Action {
    name: &'static str,
    f: Arc<dyn Fn() -> Result<()> + Send + Sync>,
}

impl Action {
    /// Wrap a procedure under a name used for logging and `Debug`
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name,
            f: Arc::new(f),
        }
    }

    /// An action that does nothing, useful as a placeholder in tests
    pub fn noop(name: &'static str) -> Self {
        Self::new(name, || Ok(()))
    }

    /// Run the procedure
    pub fn call(&self) -> Result<()> {
        tracing::trace!(action = self.name, "Invoking action");
        (self.f)()
    }

    /// The name given at construction
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl Eq for Action {}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.name)
    }
}
