//! Event reporting hook

use sml_core::SmlEvent;

/// Receiver for parser events
///
/// Implemented for any `FnMut(&SmlEvent) + Send` closure.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send {
    fn on_event(&mut self, event: &SmlEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&SmlEvent) + Send,
{
    fn on_event(&mut self, event: &SmlEvent) {
        self(event)
    }
}
