//! Lifecycle hook contracts.
//!
//! A hook may answer right away, hand back a future, or hand back a stream.
//! [`HookResult`] carries all three shapes and [`HookResult::resolve`] turns
//! any of them into a single awaited value before the pipeline looks at it:
//!
//! - `Ready` resolves to its value.
//! - `Pending` resolves when the future does.
//! - `Stream` resolves to its first item; a stream that ends without an item
//!   resolves to the default value ([`HookOutput::Undefined`] for lifecycle
//!   hooks).
//!
//! ```
//! use navigator_pipeline::{HookOutput, HookResult};
//!
//! let ready: HookResult = false.into();
//! let output = pollster::block_on(ready.resolve()).unwrap();
//! assert_eq!(output, HookOutput::Bool(false));
//!
//! let pending: HookResult = HookResult::pending(async { Ok(HookOutput::Undefined) });
//! assert_eq!(pollster::block_on(pending.resolve()).unwrap(), HookOutput::Undefined);
//! ```

use crate::commands::NavigationCommand;
use crate::config::{ActivationStrategy, RouteConfig, RouterConfiguration};
use crate::error::{Result, RouterError};
use crate::instruction::{LifecycleArgs, NavigationInstruction};
use crate::router::Router;
use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::fmt;
use std::future::Future;

/// Value a lifecycle hook answers with.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HookOutput {
    /// No opinion: the pipeline continues.
    #[default]
    Undefined,
    /// Continue (`true`) or cancel (`false`).
    Bool(bool),
    /// Take over the navigation.
    Command(NavigationCommand),
}

impl From<bool> for HookOutput {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<()> for HookOutput {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl From<NavigationCommand> for HookOutput {
    fn from(command: NavigationCommand) -> Self {
        Self::Command(command)
    }
}

/// A hook's answer in one of three shapes.
pub enum HookResult<T = HookOutput> {
    Ready(Result<T>),
    Pending(BoxFuture<'static, Result<T>>),
    Stream(BoxStream<'static, Result<T>>),
}

impl<T> HookResult<T> {
    pub fn value(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    pub fn error(error: RouterError) -> Self {
        Self::Ready(Err(error))
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Wait for the answer. `None` means a stream ended without an item.
    pub async fn settle(self) -> Result<Option<T>> {
        match self {
            Self::Ready(result) => result.map(Some),
            Self::Pending(future) => future.await.map(Some),
            Self::Stream(mut stream) => stream.next().await.transpose(),
        }
    }
}

impl<T: Default> HookResult<T> {
    /// Wait for the answer, treating an empty stream as the default value.
    pub async fn resolve(self) -> Result<T> {
        self.settle().await.map(Option::unwrap_or_default)
    }
}

impl<T: Default> Default for HookResult<T> {
    fn default() -> Self {
        Self::value(T::default())
    }
}

impl<T> From<Result<T>> for HookResult<T> {
    fn from(result: Result<T>) -> Self {
        Self::Ready(result)
    }
}

impl From<bool> for HookResult {
    fn from(value: bool) -> Self {
        Self::value(HookOutput::Bool(value))
    }
}

impl From<HookOutput> for HookResult {
    fn from(output: HookOutput) -> Self {
        Self::value(output)
    }
}

impl From<NavigationCommand> for HookResult {
    fn from(command: NavigationCommand) -> Self {
        Self::value(HookOutput::Command(command))
    }
}

impl<T> fmt::Debug for HookResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("HookResult::Ready"),
            Self::Pending(_) => f.write_str("HookResult::Pending"),
            Self::Stream(_) => f.write_str("HookResult::Stream"),
        }
    }
}

/// Gate run before a component is activated.
pub trait CanActivate: Send + Sync + 'static {
    fn can_activate(&self, args: &LifecycleArgs) -> HookResult;
}

impl<F> CanActivate for F
where
    F: Fn(&LifecycleArgs) -> HookResult + Send + Sync + 'static,
{
    fn can_activate(&self, args: &LifecycleArgs) -> HookResult {
        self(args)
    }
}

/// Runs once activation is certain. The answer's value is ignored; an error
/// still cancels.
pub trait Activate: Send + Sync + 'static {
    fn activate(&self, args: &LifecycleArgs) -> HookResult;
}

impl<F> Activate for F
where
    F: Fn(&LifecycleArgs) -> HookResult + Send + Sync + 'static,
{
    fn activate(&self, args: &LifecycleArgs) -> HookResult {
        self(args)
    }
}

/// Gate run before a component is left.
pub trait CanDeactivate: Send + Sync + 'static {
    fn can_deactivate(&self) -> HookResult;
}

impl<F> CanDeactivate for F
where
    F: Fn() -> HookResult + Send + Sync + 'static,
{
    fn can_deactivate(&self) -> HookResult {
        self()
    }
}

/// Runs once leaving is certain. The answer's value is ignored; an error
/// still cancels.
pub trait Deactivate: Send + Sync + 'static {
    fn deactivate(&self) -> HookResult;
}

impl<F> Deactivate for F
where
    F: Fn() -> HookResult + Send + Sync + 'static,
{
    fn deactivate(&self) -> HookResult {
        self()
    }
}

/// Lets a component choose how it is reused for the next navigation.
pub trait DetermineActivationStrategy: Send + Sync + 'static {
    fn determine_activation_strategy(&self, args: &LifecycleArgs) -> ActivationStrategy;
}

impl<F> DetermineActivationStrategy for F
where
    F: Fn(&LifecycleArgs) -> ActivationStrategy + Send + Sync + 'static,
{
    fn determine_activation_strategy(&self, args: &LifecycleArgs) -> ActivationStrategy {
        self(args)
    }
}

/// Makes a component host a child router.
pub trait ConfigureRouter: Send + Sync + 'static {
    fn configure_router(&self, config: &mut RouterConfiguration, router: &Router)
        -> HookResult<()>;
}

impl<F> ConfigureRouter for F
where
    F: Fn(&mut RouterConfiguration, &Router) -> HookResult<()> + Send + Sync + 'static,
{
    fn configure_router(
        &self,
        config: &mut RouterConfiguration,
        router: &Router,
    ) -> HookResult<()> {
        self(config, router)
    }
}

/// Computes the route config for a navigation at instruction-creation time.
pub trait NavigationStrategy: Send + Sync + 'static {
    fn resolve(&self, instruction: &NavigationInstruction) -> HookResult<RouteConfig>;
}

impl<F> NavigationStrategy for F
where
    F: Fn(&NavigationInstruction) -> HookResult<RouteConfig> + Send + Sync + 'static,
{
    fn resolve(&self, instruction: &NavigationInstruction) -> HookResult<RouteConfig> {
        self(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_ready_value() {
        let result: HookResult = true.into();
        assert_eq!(
            pollster::block_on(result.resolve()).unwrap(),
            HookOutput::Bool(true)
        );
    }

    #[test]
    fn test_ready_error() {
        let result: HookResult = HookResult::error(RouterError::hook("nope"));
        assert_eq!(
            pollster::block_on(result.resolve()),
            Err(RouterError::hook("nope"))
        );
    }

    #[test]
    fn test_stream_takes_first_item() {
        let result: HookResult = HookResult::stream(stream::iter(vec![
            Ok(HookOutput::Bool(false)),
            Ok(HookOutput::Bool(true)),
        ]));
        assert_eq!(
            pollster::block_on(result.resolve()).unwrap(),
            HookOutput::Bool(false)
        );
    }

    #[test]
    fn test_empty_stream_is_undefined() {
        let result: HookResult = HookResult::stream(stream::empty());
        assert_eq!(
            pollster::block_on(result.resolve()).unwrap(),
            HookOutput::Undefined
        );
    }

    #[test]
    fn test_stream_error_rejects() {
        let result: HookResult =
            HookResult::stream(stream::iter(vec![Err(RouterError::hook("stream"))]));
        assert!(pollster::block_on(result.resolve()).is_err());
    }

    #[test]
    fn test_settle_reports_empty_stream() {
        let result: HookResult<u8> = HookResult::stream(stream::empty());
        assert_eq!(pollster::block_on(result.settle()).unwrap(), None);
    }
}
