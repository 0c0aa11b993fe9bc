//! Request middleware.
//!
//! Each middleware sees a request before it is routed and may rewrite its
//! params or refuse it. After a successful call every middleware observes
//! the result. Lower priorities run first.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::debug;

/// Outcome of [`Middleware::before`].
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Route the request with these params.
    Proceed(Option<Value>),
    /// Refuse the request; the reason is sent to the client.
    Block(String),
}

pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> i32 {
        0
    }

    fn before(&self, method: &str, params: Option<Value>) -> impl Future<Output = Verdict> + Send;

    fn observe(&self, _method: &str, _result: &Value) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Traces each request and counts the persistence warnings in its result.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn priority(&self) -> i32 {
        -100
    }

    async fn before(&self, method: &str, params: Option<Value>) -> Verdict {
        debug!("-> {method}");
        Verdict::Proceed(params)
    }

    async fn observe(&self, method: &str, result: &Value) {
        match result.get("warnings").and_then(Value::as_array) {
            Some(warnings) => debug!("<- {method} ({} persistence warning(s))", warnings.len()),
            None => debug!("<- {method}"),
        }
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Dyn-compatible face of [`Middleware`] so the chain can hold mixed types.
trait ErasedMiddleware: Send + Sync {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;
    fn before<'a>(&'a self, method: &'a str, params: Option<Value>) -> BoxFuture<'a, Verdict>;
    fn observe<'a>(&'a self, method: &'a str, result: &'a Value) -> BoxFuture<'a, ()>;
}

impl<M: Middleware> ErasedMiddleware for M {
    fn name(&self) -> &str {
        Middleware::name(self)
    }

    fn priority(&self) -> i32 {
        Middleware::priority(self)
    }

    fn before<'a>(&'a self, method: &'a str, params: Option<Value>) -> BoxFuture<'a, Verdict> {
        Box::pin(Middleware::before(self, method, params))
    }

    fn observe<'a>(&'a self, method: &'a str, result: &'a Value) -> BoxFuture<'a, ()> {
        Box::pin(Middleware::observe(self, method, result))
    }
}

#[derive(Default)]
pub struct MiddlewareChain {
    entries: Vec<Box<dyn ErasedMiddleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equal priorities keep insertion order.
    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.entries.push(Box::new(middleware));
        self.entries.sort_by_key(|m| m.priority());
    }

    /// Thread `params` through every middleware. Stops at the first block.
    pub async fn run_before(&self, method: &str, mut params: Option<Value>) -> Result<Option<Value>, String> {
        for entry in &self.entries {
            match entry.before(method, params).await {
                Verdict::Proceed(next) => params = next,
                Verdict::Block(reason) => {
                    debug!("{method} blocked by {}", entry.name());
                    return Err(reason);
                }
            }
        }
        Ok(params)
    }

    pub async fn observe(&self, method: &str, result: &Value) {
        for entry in &self.entries {
            entry.observe(method, result).await;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
