use crate::simulation::Simulator;
use crate::Event;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

pub type OutputReceiver = Receiver<Arc<Event>>;

/// One-to-many output queue: every registered [`super::OutputHandler`] subscribes its
/// own [`OutputReceiver`], and [`OutputQueue::propagate_output`] fans each ejected
/// event out to every still-connected subscriber. `std::sync::mpsc` has no built-in
/// broadcast channel, so this is a plain `Vec` of senders standing in for the
/// teacher's `tokio::sync::broadcast`.
#[derive(Debug, Default)]
pub struct OutputQueue(Vec<Sender<Arc<Event>>>);

impl OutputQueue {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn subscribe(&mut self) -> OutputReceiver {
        let (tx, rx) = channel();
        self.0.push(tx);
        rx
    }

    pub fn propagate_output<T: Simulator>(&mut self, component: &T) {
        // Safety: ejecting this cycle's output events, from the coordinator's thread.
        let events: Vec<_> = unsafe { component.get_component().eject() }.collect();
        self.0.retain(|tx| {
            for event in &events {
                tracing::info!(%event, "propagating output event");
                if tx.send(Arc::new(event.clone())).is_err() {
                    tracing::warn!("an output handler has disconnected");
                    return false;
                }
            }
            true
        });
    }
}
