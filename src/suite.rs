use crate::articles::ArticleTable;
use crate::config::SuiteConfig;
use crate::errors::{Result, SuiteError};
use crate::host::{Host, Registry};
use crate::stack::{ContextStack, StackOwner};
use crate::unit::TestUnit;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Declaration surface for one suite.
///
/// Owns the context stack for the duration of the declaration phase and
/// forwards every declared test, fully resolved, to its [`Host`].
///
/// ```
/// use context_suite::Suite;
///
/// #[derive(Default)]
/// struct World {
///     friends: Vec<String>,
/// }
///
/// let registry = Suite::<World>::build(|s| {
///     s.a("User", |s| {
///         s.that("has no friends", |s| {
///             s.setup(|w| w.friends.clear());
///             s.test("is lonely", |w| assert!(w.friends.is_empty()));
///             Ok(())
///         })
///     })
/// })
/// .unwrap();
///
/// assert_eq!(registry.names(), vec!["test a User that has no friends is lonely"]);
/// ```
pub struct Suite<S, H = Registry<S>> {
    stack: ContextStack<S>,
    articles: ArticleTable,
    config: SuiteConfig,
    host: H,
}

impl<S> Default for Suite<S, Registry<S>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Suite<S, Registry<S>> {
    pub fn new() -> Self {
        Self::with_config(SuiteConfig::default())
    }

    pub fn with_config(config: SuiteConfig) -> Self {
        Self::with_host(config, Registry::new())
    }

    /// Declare a whole suite and hand back its registry.
    ///
    /// Errors from `body` propagate; nothing is returned for a partially
    /// declared suite.
    pub fn build<F>(body: F) -> Result<Registry<S>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut suite = Self::new();
        body(&mut suite)?;
        suite.finish()
    }
}

impl<S, H> StackOwner<S> for Suite<S, H> {
    fn stack_mut(&mut self) -> &mut ContextStack<S> {
        &mut self.stack
    }
}

impl<S, H: Host<S>> Suite<S, H> {
    pub fn with_host(config: SuiteConfig, host: H) -> Self {
        Self {
            stack: ContextStack::new(),
            articles: config.article_table(),
            config,
            host,
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn stack(&self) -> &ContextStack<S> {
        &self.stack
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Make another opener alias available to [`article`](Self::article).
    pub fn register_article(&mut self, alias: &str) {
        self.articles.register(alias);
    }

    /// Open a context named `"<label> <name>"` for the alias `article`.
    pub fn article<F>(&mut self, article: &str, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let name = self.articles.compose(article, name)?;
        self.open(name, body)
    }

    pub fn a<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.article("a", name, body)
    }

    pub fn an<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.article("an", name, body)
    }

    pub fn the<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.article("the", name, body)
    }

    pub fn that<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.article("that", name, body)
    }

    pub fn and_also<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.article("and_also", name, body)
    }

    fn open<F>(&mut self, name: String, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        ContextStack::<S>::scoped(self, Some(name), |suite| {
            body(suite).map_err(|err| suite.declaration_error(err))
        })
    }

    // Attach the innermost context path, once, to errors leaving a body.
    fn declaration_error(&self, err: SuiteError) -> SuiteError {
        match err {
            SuiteError::Declaration { .. } => err,
            other => {
                let context = self.stack.path();
                debug!(%context, error = %other, "context declaration failed");
                SuiteError::Declaration {
                    context,
                    message: other.to_string(),
                }
            }
        }
    }

    /// Run `step` before every test declared later in the current context
    /// or below it.
    ///
    /// At the top level the step lands on the implicit root context and so
    /// applies to every test declared after it.
    pub fn setup<F>(&mut self, step: F)
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        match self.stack.current_mut() {
            Some(context) => context.add_setup(Arc::new(step)),
            None => warn!("setup declared outside of any context; ignored"),
        }
    }

    /// Run `step` after every test declared later in the current context or
    /// below it.
    pub fn teardown<F>(&mut self, step: F)
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        match self.stack.current_mut() {
            Some(context) => context.add_teardown(Arc::new(step)),
            None => warn!("teardown declared outside of any context; ignored"),
        }
    }

    pub fn test<F>(&mut self, name: &str, body: F)
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        let snapshot = self.stack.snapshot();
        let unit = TestUnit::runnable(
            snapshot.build_name(&self.config.test_prefix, name),
            snapshot.setup_chain(),
            snapshot.teardown_chain(),
            Arc::new(body),
        );
        self.host.register(unit);
    }

    /// Declare a test that is reported as skipped and never run.
    ///
    /// Takes the same arguments as [`test`](Self::test) so a test can be
    /// parked and revived by renaming the call. The body is dropped unrun.
    pub fn pending_test<F>(&mut self, name: &str, _body: F)
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        let own = self.config.pending_name(name);
        let unit = TestUnit::pending(
            self.stack.build_name(&self.config.test_prefix, &own),
            self.config.pending_reason.clone(),
        );
        self.host.register(unit);
    }

    /// The qualified name a test called `own` would get right now.
    pub fn build_test_name(&self, own: &str) -> String {
        self.stack.build_name(&self.config.test_prefix, own)
    }

    /// End the declaration phase and hand over the host.
    pub fn finish(self) -> Result<H> {
        let depth = self.stack.depth();
        if depth != 0 {
            return Err(SuiteError::Unbalanced { depth });
        }
        info!("suite declared");
        Ok(self.host)
    }
}
