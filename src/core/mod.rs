//! Core types: the actor view consumed by rule elements and the
//! non-throwing diagnostics channel.
//!
//! Rule elements never own an actor. They hold an `Arc<dyn ActorContext>`
//! and read roll options and injection data at the moment they need them,
//! so a producer invoked long after preparation still sees current data.

pub mod actor;
pub mod diagnostics;

pub use actor::{Actor, ActorContext, ActorState, RollOptions};
pub use diagnostics::{Diagnostic, DiagnosticLog, ValidationReporter};
