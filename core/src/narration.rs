//! Turning what happened into sentences for the speech sink.

use std::sync::{Arc, Mutex};

use crate::{
    clock::month_name,
    event::SimEvent,
    step::StepSignal,
    words::{narrate_numbers, to_words},
};

/// Whatever renders status text for the player.
pub trait Announcer: Send {
    fn announce(&mut self, text: &str);
}

/// Announces through the `log` facade.
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&mut self, text: &str) {
        log::info!("{text}");
    }
}

/// Keeps every announcement. Clones share one buffer, so a handle kept
/// outside the engine sees what the engine announced.
#[derive(Debug, Default, Clone)]
pub struct RecordingAnnouncer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingAnnouncer {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&mut self, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(text.to_string());
        }
    }
}

fn amount(v: f64) -> String {
    to_words(v.max(0.0).round())
}

/// The sentence for one step signal.
pub fn describe_signal(signal: &StepSignal) -> String {
    match signal {
        StepSignal::Bankruptcy { shortfall } => format!(
            "You are bankrupt. You are short {} gold and the bank will lend no more.",
            amount(*shortfall)
        ),
        StepSignal::AutomaticLoan { amount: a } => format!(
            "Not enough cash. The bank has lent you {} gold.",
            amount(*a)
        ),
        StepSignal::DebtWarning { .. } => {
            "Warning: your debt is becoming more than the bank will support.".to_string()
        }
        StepSignal::HealthExhausted { herd } => format!("Your {} are dying of neglect.", herd.label()),
        StepSignal::HealthRestored { herd } => format!("Your {} are in perfect health.", herd.label()),
        StepSignal::ContractDue { slot } => format!("Contract {} is due.", to_words(*slot as f64 + 1.0)),
        StepSignal::PyramidComplete => "Your pyramid is complete!".to_string(),
    }
}

/// The sentence for an event, if it is one the player hears about.
pub fn describe_event(event: &SimEvent) -> Option<String> {
    match event {
        SimEvent::Signal { signal, .. } => Some(describe_signal(signal)),
        SimEvent::Plague { plague, deaths, .. } => Some(format!(
            "A plague of {plague} has struck. {} slaves have died.",
            amount(*deaths)
        )),
        SimEvent::Locusts { wheat_destroyed, .. } => Some(format!(
            "Locusts devour {} bushels of your crop.",
            amount(*wheat_destroyed)
        )),
        SimEvent::MonthClosed { month, year, .. } => Some(narrate_numbers(&format!(
            "It is now {} of year {}.",
            month_name(*month),
            year
        ))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Herd;

    #[test]
    fn month_close_is_spoken_in_words() {
        let event = SimEvent::MonthClosed {
            tick: 1,
            month: 2.0,
            year: 12.0,
            gold: 0.0,
            loan: 0.0,
            wheat: 0.0,
            slaves: 0.0,
            oxen: 0.0,
            horses: 0.0,
            wk_eff: 1.0,
        };
        assert_eq!(describe_event(&event).unwrap(), "It is now February of year twelve.");
    }

    #[test]
    fn engine_bookkeeping_is_silent() {
        assert!(describe_event(&SimEvent::TickStarted { tick: 3 }).is_none());
    }

    #[test]
    fn signals_render_amounts_in_words() {
        let text = describe_signal(&StepSignal::AutomaticLoan { amount: 1500.0 });
        assert_eq!(text, "Not enough cash. The bank has lent you one thousand five hundred gold.");
        let text = describe_signal(&StepSignal::HealthExhausted { herd: Herd::Oxen });
        assert_eq!(text, "Your oxen are dying of neglect.");
    }

    #[test]
    fn recorder_keeps_order() {
        let handle = RecordingAnnouncer::default();
        let mut rec = handle.clone();
        rec.announce("one");
        rec.announce("two");
        assert_eq!(handle.lines(), vec!["one", "two"]);
    }
}
