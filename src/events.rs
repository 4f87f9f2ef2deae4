//! Navigation events.
//!
//! The application router publishes one [`NavigationEvent`] per queue
//! transition to every registered [`EventSink`]:
//!
//! | Event          | Name                                    | When                                 |
//! |----------------|-----------------------------------------|--------------------------------------|
//! | `Processing`   | `router:navigation:processing`          | a top-level request starts           |
//! | `Error`        | `router:navigation:error`               | it ended with an error output        |
//! | `Canceled`     | `router:navigation:canceled`            | it was canceled without an error     |
//! | `Success`      | `router:navigation:success`             | it committed                         |
//! | `Complete`     | `router:navigation:complete`            | always last, after one of the three  |
//! | `ChildComplete`| `router:navigation:child:complete`      | a redirect or retry attempt finished |
//!
//! # Creating sinks
//!
//! | Approach                 | When to use                         |
//! |--------------------------|-------------------------------------|
//! | Implement [`EventSink`]  | Full control, named                 |
//! | [`event_sink_fn`]        | Quick one-off from a closure        |
//! | [`LoggingEventSink`]     | Log every publication (the default) |
//!
//! ```
//! use navigator_pipeline::events::{event_sink_fn, NavigationEvent};
//!
//! let sink = event_sink_fn(|event, args| {
//!     if event == NavigationEvent::Success {
//!         println!("now at {}", args.fragment);
//!     }
//! });
//! # let _ = sink;
//! ```

use crate::pipeline::PipelineResult;
use crate::{info_log, trace_log};
use std::fmt;

/// Named navigation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationEvent {
    Processing,
    Error,
    Canceled,
    Success,
    Complete,
    ChildComplete,
}

impl NavigationEvent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Processing => "router:navigation:processing",
            Self::Error => "router:navigation:error",
            Self::Canceled => "router:navigation:canceled",
            Self::Success => "router:navigation:success",
            Self::Complete => "router:navigation:complete",
            Self::ChildComplete => "router:navigation:child:complete",
        }
    }
}

impl fmt::Display for NavigationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload published with every event.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEventArgs {
    pub fragment: String,
    pub query_string: String,
    /// Pipeline result; absent for `Processing`.
    pub result: Option<PipelineResult>,
}

/// Receiver of navigation events.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, event: NavigationEvent, args: &NavigationEventArgs);

    /// Sink name for debugging.
    fn name(&self) -> &'static str {
        "EventSink"
    }
}

/// Create a sink from a closure.
pub const fn event_sink_fn<F>(f: F) -> FnEventSink<F>
where
    F: Fn(NavigationEvent, &NavigationEventArgs) + Send + Sync + 'static,
{
    FnEventSink { f }
}

/// Sink created from a closure.
pub struct FnEventSink<F> {
    f: F,
}

impl<F> EventSink for FnEventSink<F>
where
    F: Fn(NavigationEvent, &NavigationEventArgs) + Send + Sync + 'static,
{
    fn publish(&self, event: NavigationEvent, args: &NavigationEventArgs) {
        (self.f)(event, args);
    }

    fn name(&self) -> &'static str {
        "FnEventSink"
    }
}

/// Logs each publication.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn publish(&self, event: NavigationEvent, args: &NavigationEventArgs) {
        match event {
            NavigationEvent::Success => {
                info_log!("{}: '{}'", event, args.fragment);
            }
            _ => {
                trace_log!("{}: '{}'", event, args.fragment);
            }
        }
    }

    fn name(&self) -> &'static str {
        "LoggingEventSink"
    }
}
