use crate::context::Context;
use crate::unit::Step;
use itertools::Itertools;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Anything that owns a [`ContextStack`] and can be handed to a context body.
///
/// Lets the suite reuse the stack's scoped push while its bodies still
/// receive the whole suite.
pub(crate) trait StackOwner<S> {
    fn stack_mut(&mut self) -> &mut ContextStack<S>;
}

/// Chain of contexts currently being declared, bottom to top.
///
/// The bottom entry is always the implicit, unnamed root context, so there
/// is always a current context to attach steps to.
pub struct ContextStack<S> {
    contexts: Vec<Context<S>>,
}

impl<S> Default for ContextStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StackOwner<S> for ContextStack<S> {
    fn stack_mut(&mut self) -> &mut ContextStack<S> {
        self
    }
}

impl<S> ContextStack<S> {
    pub fn new() -> Self {
        Self {
            contexts: vec![Context::root()],
        }
    }

    /// Open a context named `name`, run `body` with it on top, then close it.
    ///
    /// The context is popped on every exit path: when `body` returns and
    /// when it panics (the panic is resumed afterwards).
    pub fn push<T>(&mut self, name: impl Into<String>, body: impl FnOnce(&mut Self) -> T) -> T {
        Self::scoped(self, Some(name.into()), body)
    }

    pub(crate) fn scoped<O, T>(
        owner: &mut O,
        name: Option<String>,
        body: impl FnOnce(&mut O) -> T,
    ) -> T
    where
        O: StackOwner<S>,
    {
        let depth = {
            let stack = owner.stack_mut();
            debug!(context = ?name, depth = stack.depth() + 1, "push context");
            stack.contexts.push(Context::new(name));
            stack.contexts.len()
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *owner)));

        let stack = owner.stack_mut();
        stack.contexts.truncate(depth - 1);
        debug!(depth = stack.depth(), unwinding = result.is_err(), "pop context");

        match result {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// The innermost open context. The root is returned at the top level.
    pub fn current(&self) -> Option<&Context<S>> {
        self.contexts.last()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Context<S>> {
        self.contexts.last_mut()
    }

    /// Number of opened contexts above the root.
    pub fn depth(&self) -> usize {
        self.contexts.len().saturating_sub(1)
    }

    /// True when nothing but the root is left on the stack.
    pub fn is_balanced(&self) -> bool {
        self.depth() == 0
    }

    /// Names of the open contexts joined by spaces, e.g. `"a User that is an admin"`.
    pub fn path(&self) -> String {
        self.contexts.iter().filter_map(Context::name).join(" ")
    }

    /// Point-in-time copy of the stack, bottom to top.
    pub fn snapshot(&self) -> Snapshot<S> {
        Snapshot {
            contexts: self.contexts.clone(),
        }
    }

    /// `prefix`, then every named context followed by a space, then `own`.
    pub fn build_name(&self, prefix: &str, own: &str) -> String {
        compose_name(prefix, self.contexts.iter().filter_map(Context::name), own)
    }
}

/// Frozen view of the stack taken when a test is declared.
pub struct Snapshot<S> {
    contexts: Vec<Context<S>>,
}

impl<S> Snapshot<S> {
    pub fn contexts(&self) -> &[Context<S>] {
        &self.contexts
    }

    pub fn names(&self) -> Vec<&str> {
        self.contexts.iter().filter_map(Context::name).collect_vec()
    }

    pub fn build_name(&self, prefix: &str, own: &str) -> String {
        compose_name(prefix, self.contexts.iter().filter_map(Context::name), own)
    }

    /// Every context's setups, outer to inner. No de-duplication.
    pub fn setup_chain(&self) -> Vec<Step<S>> {
        self.contexts
            .iter()
            .flat_map(|context| context.setups().iter().cloned())
            .collect_vec()
    }

    /// Every context's teardowns, outer to inner.
    pub fn teardown_chain(&self) -> Vec<Step<S>> {
        self.contexts
            .iter()
            .flat_map(|context| context.teardowns().iter().cloned())
            .collect_vec()
    }
}

fn compose_name<'a>(prefix: &str, names: impl Iterator<Item = &'a str>, own: &str) -> String {
    let mut full = String::from(prefix);
    for name in names {
        full.push_str(name);
        full.push(' ');
    }
    full.push_str(own);
    full
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn starts_with_only_the_root() {
        let stack: ContextStack<()> = ContextStack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.is_balanced());
        assert!(stack.current().is_some_and(Context::is_root));
    }

    #[test]
    fn push_exposes_context_and_pops_it() {
        let mut stack: ContextStack<()> = ContextStack::new();
        let seen = stack.push("a User", |stack| {
            assert_eq!(stack.depth(), 1);
            stack.current().and_then(Context::name).map(str::to_owned)
        });
        assert_eq!(seen.as_deref(), Some("a User"));
        assert!(stack.is_balanced());
    }

    #[test]
    fn builds_names_outer_to_inner() {
        let mut stack: ContextStack<()> = ContextStack::new();
        assert_eq!(stack.build_name("test ", "some name"), "test some name");
        let name = stack.push("a Context", |stack| {
            stack.push("that has a nested Context", |stack| stack.build_name("test ", "works"))
        });
        assert_eq!(name, "test a Context that has a nested Context works");
        assert_eq!(stack.path(), "");
    }

    #[test]
    fn pops_when_body_panics() {
        let mut stack: ContextStack<()> = ContextStack::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            stack.push("a Context", |stack| {
                stack.push("that blows up", |_| panic!("declaration failed"));
            })
        }));
        assert!(result.is_err());
        assert!(stack.is_balanced());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_pushes() {
        let mut stack: ContextStack<u8> = ContextStack::new();
        let snapshot = stack.push("a Context", |stack| {
            if let Some(context) = stack.current_mut() {
                context.add_setup(Arc::new(|n: &mut u8| *n += 1));
            }
            let snapshot = stack.snapshot();
            if let Some(context) = stack.current_mut() {
                context.add_setup(Arc::new(|n: &mut u8| *n += 10));
            }
            snapshot
        });
        assert_eq!(snapshot.names(), vec!["a Context"]);
        assert_eq!(snapshot.setup_chain().len(), 1);
        assert!(snapshot.teardown_chain().is_empty());
    }
}
