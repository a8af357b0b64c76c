//! Deferred effect producers.
//!
//! A producer captures a rule element's configuration and, when invoked,
//! asynchronously produces an ephemeral effect or nothing. Invocation
//! timing is entirely up to the caller: a producer may be invoked zero,
//! one, or many times, and every invocation is independent.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::RollOptions;
use crate::items::ItemSource;
use crate::rules::Resolvables;

/// Run-time parameters for a producer invocation.
#[derive(Clone, Debug, Default)]
pub struct InvocationParams {
    /// Roll options to test the predicate against instead of the actor's.
    pub test: Option<RollOptions>,
    /// Named values for resolving alteration value expressions.
    pub resolvables: Resolvables,
}

impl InvocationParams {
    /// Create empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the roll options used for predicate testing.
    #[must_use]
    pub fn with_test(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.test = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Add a resolvable value.
    #[must_use]
    pub fn with_resolvable(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.resolvables.insert(name.into(), value);
        self
    }
}

type ProducerFn =
    dyn Fn(InvocationParams) -> BoxFuture<'static, Option<ItemSource>> + Send + Sync;

/// A shareable, repeatedly invocable effect producer.
///
/// Cloning is cheap and yields the same producer (see [`DeferredEffect::ptr_eq`]).
///
/// ```
/// use ephemeral_effects::items::{ItemKind, ItemSource};
/// use ephemeral_effects::synthetics::{DeferredEffect, InvocationParams};
/// use futures::FutureExt;
///
/// let producer = DeferredEffect::new(|_params| {
///     async { Some(ItemSource::new("Effect: Aid", ItemKind::Effect)) }.boxed()
/// });
///
/// let produced = futures::executor::block_on(producer.invoke(InvocationParams::new()));
/// assert_eq!(produced.unwrap().name, "Effect: Aid");
/// ```
#[derive(Clone)]
pub struct DeferredEffect(Arc<ProducerFn>);

impl DeferredEffect {
    /// Wrap a producer function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(InvocationParams) -> BoxFuture<'static, Option<ItemSource>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the producer.
    pub fn invoke(&self, params: InvocationParams) -> BoxFuture<'static, Option<ItemSource>> {
        (self.0)(params)
    }

    /// Are both handles the same producer?
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for DeferredEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DeferredEffect")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
