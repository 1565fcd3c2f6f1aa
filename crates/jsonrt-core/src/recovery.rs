//! Pluggable policy for what happens when a parse fails.
//!
//! The parser itself never recovers. [`RecoveringParser`] wraps it with two
//! strategies: an observer that is told about every failure, and a fallback
//! parser that may still produce a tree. Both default to doing nothing, so a
//! default `RecoveringParser` behaves exactly like [`crate::parse`].

use crate::error::{ParseError, Result};
use crate::parser::{revive_tree, Holder, ParseOptions, Parser, Reviver};
use crate::value::Value;
use tracing::{debug, warn};

/// Receives diagnostics for failed parses.
pub trait ParseFailureObserver {
    fn on_parse_failure(&self, error: &ParseError, text: &str);
}

/// Ignores failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ParseFailureObserver for NoopObserver {
    fn on_parse_failure(&self, _error: &ParseError, _text: &str) {}
}

/// Reports failures as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ParseFailureObserver for TracingObserver {
    fn on_parse_failure(&self, error: &ParseError, text: &str) {
        warn!(
            kind = %error.kind,
            position = error.position,
            line = error.line,
            column = error.column,
            input_bytes = text.len(),
            "JSON parse failed"
        );
    }
}

/// A second parser consulted after the primary one fails.
pub trait FallbackParser {
    /// `None` declines, and the original error is reported to the caller.
    fn fallback(&self, text: &str) -> Option<Value>;
}

/// Never recovers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackParser for NoFallback {
    fn fallback(&self, _text: &str) -> Option<Value> {
        None
    }
}

/// Retries with `serde_json`, with member order preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonFallback;

impl FallbackParser for SerdeJsonFallback {
    fn fallback(&self, text: &str) -> Option<Value> {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => Some(Value::from(value)),
            Err(err) => {
                debug!(error = %err, "serde_json fallback rejected input");
                None
            }
        }
    }
}

/// A parser with failure reporting and an optional fallback.
pub struct RecoveringParser {
    options: ParseOptions,
    observer: Box<dyn ParseFailureObserver + Send + Sync>,
    fallback: Box<dyn FallbackParser + Send + Sync>,
}

impl Default for RecoveringParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveringParser {
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
            observer: Box::new(NoopObserver),
            fallback: Box::new(NoFallback),
        }
    }

    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: ParseFailureObserver + Send + Sync + 'static,
    {
        self.observer = Box::new(observer);
        self
    }

    pub fn fallback<P>(mut self, fallback: P) -> Self
    where
        P: FallbackParser + Send + Sync + 'static,
    {
        self.fallback = Box::new(fallback);
        self
    }

    pub fn parse(&self, text: &str) -> Result<Value> {
        let result = Parser::with_options(text, self.options).parse();
        self.recover(text, result, None)
    }

    /// Parse with a reviver. A tree recovered by the fallback is revived
    /// after the fact, in the same order the parser would have used. Members
    /// parsed before the primary failure will have been seen once already.
    pub fn parse_with_reviver<F>(&self, text: &str, mut reviver: F) -> Result<Value>
    where
        F: FnMut(Holder<'_>, &str, Value) -> Value,
    {
        let result = Parser::with_options(text, self.options).parse_with_reviver(&mut reviver);
        self.recover(text, result, Some(&mut reviver as &mut dyn Reviver))
    }

    fn recover(
        &self,
        text: &str,
        result: Result<Value>,
        reviver: Option<&mut dyn Reviver>,
    ) -> Result<Value> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        self.observer.on_parse_failure(&err, text);

        match self.fallback.fallback(text) {
            Some(value) => {
                warn!(error = %err, "recovered JSON through fallback parser");
                Ok(match reviver {
                    Some(reviver) => revive_tree(value, reviver),
                    None => value,
                })
            }
            None => Err(err),
        }
    }
}
