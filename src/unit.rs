use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{trace, warn};

/// A zero-argument step run against the per-test scope.
///
/// Setup steps, teardown steps and test bodies all share this shape; a panic
/// inside one is a failure of the phase it belongs to.
pub type Step<S> = Arc<dyn Fn(&mut S) + Send + Sync>;

/// Which part of a unit was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Body,
    Teardown,
}

/// Result of executing one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { phase: Phase, message: String },
    Skipped { reason: String },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }
}

enum Kind<S> {
    Runnable(Step<S>),
    Pending { reason: String },
}

/// A fully resolved test, ready to hand to the host.
///
/// Name and chains are copied out of the context stack when the test is
/// declared, so a unit never observes later declarations.
pub struct TestUnit<S> {
    name: String,
    setups: Vec<Step<S>>,
    teardowns: Vec<Step<S>>,
    kind: Kind<S>,
}

impl<S> TestUnit<S> {
    pub(crate) fn runnable(
        name: String,
        setups: Vec<Step<S>>,
        teardowns: Vec<Step<S>>,
        body: Step<S>,
    ) -> Self {
        Self {
            name,
            setups,
            teardowns,
            kind: Kind::Runnable(body),
        }
    }

    pub(crate) fn pending(name: String, reason: String) -> Self {
        Self {
            name,
            setups: Vec::new(),
            teardowns: Vec::new(),
            kind: Kind::Pending { reason },
        }
    }

    /// The qualified name, e.g. `"test a User that has no friends is lonely"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.kind, Kind::Pending { .. })
    }

    pub fn setup_chain(&self) -> &[Step<S>] {
        &self.setups
    }

    pub fn teardown_chain(&self) -> &[Step<S>] {
        &self.teardowns
    }

    /// Run the unit against `scope`.
    ///
    /// Setups run in order and stop at the first failure, in which case the
    /// body is not run. Every teardown runs regardless of what happened
    /// before it. The first failure wins; teardown failures that follow it
    /// are only logged.
    pub fn execute(&self, scope: &mut S) -> Outcome {
        let body = match &self.kind {
            Kind::Pending { reason } => {
                return Outcome::Skipped {
                    reason: reason.clone(),
                }
            }
            Kind::Runnable(body) => body,
        };

        let mut failure: Option<(Phase, String)> = None;

        for (idx, step) in self.setups.iter().enumerate() {
            trace!(test = %self.name, idx, "setup");
            if let Err(message) = guarded(step, scope) {
                failure = Some((Phase::Setup, message));
                break;
            }
        }

        if failure.is_none() {
            trace!(test = %self.name, "body");
            if let Err(message) = guarded(body, scope) {
                failure = Some((Phase::Body, message));
            }
        }

        for (idx, step) in self.teardowns.iter().enumerate() {
            trace!(test = %self.name, idx, "teardown");
            if let Err(message) = guarded(step, scope) {
                match failure {
                    None => failure = Some((Phase::Teardown, message)),
                    Some(_) => warn!(
                        test = %self.name,
                        idx,
                        %message,
                        "teardown failed after earlier failure"
                    ),
                }
            }
        }

        match failure {
            None => Outcome::Passed,
            Some((phase, message)) => Outcome::Failed { phase, message },
        }
    }
}

impl<S> std::fmt::Debug for TestUnit<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestUnit")
            .field("name", &self.name)
            .field("setups", &self.setups.len())
            .field("teardowns", &self.teardowns.len())
            .field("pending", &self.is_pending())
            .finish()
    }
}

fn guarded<S>(step: &Step<S>, scope: &mut S) -> Result<(), String> {
    panic::catch_unwind(AssertUnwindSafe(|| step(scope))).map_err(panic_message)
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
