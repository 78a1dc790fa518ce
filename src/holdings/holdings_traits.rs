use super::holdings_model::CgtEvent;

/// Sink for realized-gain events, supplied by the caller (e.g. a
/// persistence or audit layer). Events are delivered synchronously,
/// exactly one per realized gain, before the triggering call returns.
pub trait GainListenerTrait {
    fn on_gain_event(&mut self, security_id: &str, event: &CgtEvent);
}

/// Listener that simply collects events, for callers that prefer to drain
/// a log after the operation (and for tests).
#[derive(Debug, Default)]
pub struct CgtEventCollector {
    pub events: Vec<CgtEvent>,
}

impl CgtEventCollector {
    pub fn new() -> Self {
        CgtEventCollector::default()
    }
}

impl GainListenerTrait for CgtEventCollector {
    fn on_gain_event(&mut self, _security_id: &str, event: &CgtEvent) {
        self.events.push(event.clone());
    }
}
