use crate::unit::Step;

/// A single scope on the context stack.
///
/// Holds the context's human-readable name (the implicit root has none) and
/// the setup and teardown steps declared directly inside it, in declaration
/// order. Contexts only come into existence through
/// [`ContextStack::push`](crate::ContextStack::push) and are discarded when
/// popped.
pub struct Context<S> {
    name: Option<String>,
    setups: Vec<Step<S>>,
    teardowns: Vec<Step<S>>,
}

impl<S> Context<S> {
    pub(crate) fn new(name: Option<String>) -> Self {
        Self {
            name,
            setups: Vec::new(),
            teardowns: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.name.is_none()
    }

    pub fn setups(&self) -> &[Step<S>] {
        &self.setups
    }

    pub fn teardowns(&self) -> &[Step<S>] {
        &self.teardowns
    }

    pub(crate) fn add_setup(&mut self, step: Step<S>) {
        self.setups.push(step);
    }

    pub(crate) fn add_teardown(&mut self, step: Step<S>) {
        self.teardowns.push(step);
    }
}

// Manual impl: steps are shared `Arc`s, so `S` itself need not be `Clone`.
impl<S> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            setups: self.setups.clone(),
            teardowns: self.teardowns.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Context<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("setups", &self.setups.len())
            .field("teardowns", &self.teardowns.len())
            .finish()
    }
}
