use std::sync::Arc;
use std::time::Duration;

use failsafe::backoff::Exponential;
use failsafe::failure_policy::{consecutive_failures, ConsecutiveFailures};
use failsafe::futures::CircuitBreaker;
pub use failsafe::FailurePredicate;
use failsafe::{backoff, Config, StateMachine};
use futures_core::TryFuture;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

pub type Error<E> = failsafe::Error<E>;
type FailurePolicy = ConsecutiveFailures<Exponential>;

/// Controls when an endpoint is taken out of rotation and for how long.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Number of consecutive failures after which the endpoint is skipped
    pub consecutive_failures: u32,

    #[serde_as(as = "DurationSeconds<u64>")]
    pub backoff_initial: Duration,

    #[serde_as(as = "DurationSeconds<u64>")]
    pub backoff_max: Duration,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            consecutive_failures: 3,
            backoff_initial: Duration::from_secs(10),
            backoff_max: Duration::from_secs(60),
        }
    }
}

struct Fallback<T> {
    value: Arc<T>,
    state_machine: StateMachine<FailurePolicy, ()>,
}

impl<T: Clone> Clone for Fallback<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::from(self.value.as_ref().clone()),
            state_machine: self.state_machine.clone(),
        }
    }
}

impl<E, T: FailurePredicate<E>> FailurePredicate<E> for &Fallback<T> {
    fn is_err(&self, err: &E) -> bool {
        self.value.is_err(err)
    }
}

impl<T> Fallback<T> {
    fn new(value: T, policy: &FallbackPolicy) -> Self {
        Self {
            value: value.into(),

            state_machine: Config::new()
                .failure_policy(consecutive_failures(
                    policy.consecutive_failures,
                    backoff::exponential(policy.backoff_initial, policy.backoff_max),
                ))
                .build(),
        }
    }

    async fn call<F>(&self, f: impl FnOnce(Arc<T>) -> F) -> Result<F::Ok, Error<F::Error>>
    where
        F: TryFuture,
        T: FailurePredicate<F::Error>,
    {
        self.state_machine.call_with(self, f(self.value.clone())).await
    }

    fn is_call_permitted(&self) -> bool {
        self.state_machine.is_call_permitted()
    }
}

/// Ordered list of interchangeable values (typically RPC endpoints), each guarded by its own
/// circuit breaker.
#[derive(Clone)]
pub struct WithFallback<T> {
    policy: FallbackPolicy,
    values: Vec<Fallback<T>>,
}

impl<T> Default for WithFallback<T> {
    fn default() -> Self {
        Self {
            policy: FallbackPolicy::default(),
            values: vec![],
        }
    }
}

impl<T> WithFallback<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `policy` for every value added afterward
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with(mut self, alternative: T) -> Self {
        self.values.push(Fallback::new(alternative, &self.policy));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Executes `f` with the first value whose circuit is closed and returns its result,
    /// successful or not. Returns [`Error::Rejected`] when no value is permitted.
    ///
    /// Use this for non-idempotent operations (e.g. submitting a transaction) which must not be
    /// replayed on another value.
    pub async fn call<F>(&self, f: impl FnOnce(Arc<T>) -> F) -> Result<F::Ok, Error<F::Error>>
    where
        F: TryFuture,
        T: FailurePredicate<F::Error> + Clone,
    {
        for value in self.values.iter() {
            if value.is_call_permitted() {
                return value.call(f).await;
            }
        }

        Err(Error::Rejected)
    }

    /// Executes `f` with each permitted value in order until one succeeds.
    ///
    /// When every permitted value fails, the error of the last attempt is returned. When no
    /// value is permitted, returns [`Error::Rejected`].
    pub async fn call_all<F>(&self, f: impl Fn(Arc<T>) -> F) -> Result<F::Ok, Error<F::Error>>
    where
        F: TryFuture,
        T: FailurePredicate<F::Error> + Clone,
    {
        let mut last_error = None;
        for value in self.values.iter() {
            if !value.is_call_permitted() {
                continue;
            }

            match value.call(&f).await {
                Ok(value) => return Ok(value),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(Error::Rejected))
    }
}
