use crate::simulation::Simulator;
use crate::Event;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, SystemTime};

pub type InputSender = Sender<Event>;

/// Many-producer input queue feeding the top-level model's injection path. Every
/// registered [`super::InputHandler`] gets its own [`InputSender`] clone; all of them
/// funnel into the single receiver [`RealTimeCoordinator`](super::RealTimeCoordinator)
/// polls between simulation cycles.
#[derive(Debug)]
pub struct InputQueue {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    window: Option<Duration>,
}

impl InputQueue {
    pub fn new(window: Option<Duration>) -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            window,
        }
    }

    pub fn subscribe(&self) -> InputSender {
        self.sender.clone()
    }

    /// Blocks until either `t_next` (wall-clock) is reached or an external event
    /// arrives, injecting every event it receives. If a batching `window` was
    /// configured, keeps draining further events for up to `window` once the first
    /// event (or the deadline) has been handled, so a burst of near-simultaneous
    /// events lands in a single transition.
    pub fn wait_event<T: Simulator>(&mut self, t_next: Option<SystemTime>, component: &T) {
        tracing::debug!("waiting for external events");
        let duration = match t_next {
            Some(t_next) => t_next.duration_since(SystemTime::now()).unwrap_or_default(),
            None => Duration::MAX,
        };
        self.inject_timeout(duration, component);
        if let Some(window) = self.window {
            tracing::debug!("waiting for more external events within the window");
            let t_max = match t_next {
                Some(t_next) => std::cmp::min(t_next, SystemTime::now() + window),
                None => SystemTime::now() + window,
            };
            while let Ok(duration) = t_max.duration_since(SystemTime::now()) {
                self.inject_timeout(duration, component);
            }
        }
    }

    fn inject_timeout<T: Simulator>(&mut self, duration: Duration, component: &T) {
        match self.receiver.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!("timeout expired without any external events");
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::error!("all input handlers have disconnected");
            }
            Ok(event) => {
                tracing::info!(%event, "injecting input event");
                // Safety: injecting event between cycles, from the coordinator's thread.
                match unsafe { component.get_component().inject(&event) } {
                    Ok(()) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "failed to inject event, skipping");
                    }
                }
            }
        }
    }
}
