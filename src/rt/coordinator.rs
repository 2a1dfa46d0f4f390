use super::input::{InputQueue, InputSender};
use super::output::{OutputQueue, OutputReceiver};
use crate::error::RealTimeError;
use crate::simulation::Simulator;
use crate::transducer::Transducer;
use std::collections::HashSet;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

/// Runs on its own [`std::thread`], consuming external events off an [`InputSender`]
/// clone and forwarding them (parsed into [`crate::Event`]s) into the shared input
/// queue. Implementations typically wrap a socket, a filesystem watch, or a CLI prompt.
pub trait InputHandler: Send + 'static {
    fn run(self, tx: InputSender);
}

/// Runs on its own [`std::thread`], draining an [`OutputReceiver`] and doing whatever
/// the deployment needs with ejected events (printing, publishing, persisting).
pub trait OutputHandler: Send + 'static {
    fn run(self, rx: OutputReceiver);
}

/// Configuration for a [`RealTimeCoordinator`], grounded on the teacher's
/// `simulation/real_time.rs`/`simulation/rt.rs` constructor parameters (spec.md
/// §4.7). Validated once at construction instead of on every `sleep` call (spec.md
/// §7: "non-positive time_scale...rejected at manager construction").
#[derive(Debug, Clone, Copy)]
pub struct RealTimeConfig {
    /// Real seconds per virtual second. Must be strictly positive.
    pub time_scale: f64,
    /// Absolute tolerance between intended and actual wake time. Exceeding it is
    /// fatal (spec.md §7 "Real-time errors").
    pub max_jitter: Option<Duration>,
    /// Real-time duration after the first asynchronous arrival during which further
    /// arrivals are batched into the same cycle.
    pub event_window: Option<Duration>,
}

impl RealTimeConfig {
    pub fn new(
        time_scale: f64,
        max_jitter: Option<Duration>,
        event_window: Option<Duration>,
    ) -> Result<Self, RealTimeError> {
        if !(time_scale > 0.) {
            return Err(RealTimeError::InvalidConfig("time_scale must be > 0"));
        }
        Ok(Self {
            time_scale,
            max_jitter,
            event_window,
        })
    }
}

impl Default for RealTimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.,
            max_jitter: None,
            event_window: None,
        }
    }
}

/// Root coordinator for wall-clock-paced simulations with pluggable input/output
/// handler threads. Mirrors the teacher's `async_rt` `RootCoordinator`, generalized
/// from tokio tasks to `std::thread`s and from tokio channels to `std::sync::mpsc`
/// (spec.md §4.6/§5: the kernel's concurrency model is expressed in terms of threads
/// and blocking channels, not an async runtime).
#[derive(Debug)]
pub struct RealTimeCoordinator<T> {
    model: T,
    config: RealTimeConfig,
    input_queue: Option<InputQueue>,
    output_queue: Option<OutputQueue>,
    handlers: Vec<JoinHandle<()>>,
    transducers: Vec<Transducer>,
}

impl<T: Simulator> RealTimeCoordinator<T> {
    pub fn new(model: T, config: RealTimeConfig) -> Self {
        Self {
            model,
            config,
            input_queue: None,
            output_queue: None,
            handlers: Vec::new(),
            transducers: Vec::new(),
        }
    }

    /// Registers a transducer to be triggered alongside the real-time simulation.
    pub fn add_transducer(&mut self, transducer: Transducer) {
        self.transducers.push(transducer);
    }

    pub fn transducers(&self) -> &[Transducer] {
        &self.transducers
    }

    /// Opens the shared input queue, batching events that arrive within
    /// `config.event_window` of each other into the same simulation cycle. Must be
    /// called before [`RealTimeCoordinator::spawn_input`].
    pub fn open_input(&mut self) {
        if self.input_queue.is_some() {
            panic!("input queue already created");
        }
        self.input_queue = Some(InputQueue::new(self.config.event_window));
    }

    /// Opens the output fan-out queue. Must be called before
    /// [`RealTimeCoordinator::spawn_output`].
    pub fn open_output(&mut self) {
        if self.output_queue.is_some() {
            panic!("output queue already created");
        }
        self.output_queue = Some(OutputQueue::new());
    }

    /// Spawns an input handler thread subscribed to the shared input queue.
    pub fn spawn_input<H: InputHandler>(&mut self, handler: H) {
        let tx = self
            .input_queue
            .as_ref()
            .expect("call open_input before spawn_input")
            .subscribe();
        self.handlers.push(std::thread::spawn(move || handler.run(tx)));
    }

    /// Spawns an output handler thread subscribed to the output fan-out queue.
    pub fn spawn_output<H: OutputHandler>(&mut self, handler: H) {
        let rx = self
            .output_queue
            .as_mut()
            .expect("call open_output before spawn_output")
            .subscribe();
        self.handlers.push(std::thread::spawn(move || handler.run(rx)));
    }

    /// Runs the simulation until virtual time `t_stop`, pacing transitions to
    /// wall-clock time and injecting/ejecting through whatever handlers were spawned.
    /// Panics if the wall-clock drift ever exceeds `config.max_jitter`.
    pub fn simulate(mut self, t_stop: f64) {
        tracing::info!("starting real-time simulation");
        for transducer in &mut self.transducers {
            transducer.initialize();
        }

        let mut last_vt = 0.;
        let mut next_vt = f64::min(self.model.start(last_vt), t_stop);

        let start_rt = SystemTime::now();
        let mut last_rt = start_rt;

        while last_vt < t_stop {
            tracing::debug!(last_vt, next_vt, "simulation step");
            let duration = if next_vt.is_infinite() {
                Duration::MAX
            } else {
                Duration::from_secs_f64((next_vt - last_vt) * self.config.time_scale)
            };
            let next_rt = last_rt.checked_add(duration);

            match &mut self.input_queue {
                Some(input_queue) => {
                    input_queue.wait_event(next_rt, &self.model);
                }
                None => {
                    let sleep_for = match next_rt {
                        Some(next_rt) => next_rt.duration_since(SystemTime::now()).unwrap_or_default(),
                        None => Duration::MAX,
                    };
                    tracing::debug!(?sleep_for, "sleeping");
                    std::thread::sleep(sleep_for);
                }
            }

            let t = SystemTime::now();
            let jitter = next_rt.and_then(|next_rt| t.duration_since(next_rt).ok());
            match jitter {
                Some(jitter) => {
                    tracing::debug!(?jitter, "jitter");
                    if let Some(max_jitter) = self.config.max_jitter {
                        if jitter > max_jitter {
                            tracing::error!(?jitter, ?max_jitter, "jitter exceeds configured maximum");
                            panic!(
                                "{}",
                                RealTimeError::JitterExceeded {
                                    jitter,
                                    max: max_jitter,
                                }
                            );
                        }
                    }
                    last_rt = next_rt.unwrap();
                    last_vt = next_vt;
                }
                None => {
                    last_rt = t;
                    last_vt = last_rt.duration_since(start_rt).unwrap().as_secs_f64() / self.config.time_scale;
                }
            }
            tracing::debug!(last_vt, "simulation step reached");

            if last_vt >= next_vt {
                self.model.collection(last_vt);
            } else if unsafe { self.model.get_component().is_input_empty() } {
                tracing::warn!("spurious external transition, ignoring");
                continue;
            }
            next_vt = f64::min(self.model.transition(last_vt), t_stop);
            if let Some(output_queue) = &mut self.output_queue {
                output_queue.propagate_output(&self.model);
            }
            if !self.transducers.is_empty() {
                let mut imminent = HashSet::new();
                self.model.imminent(last_vt, &mut imminent);
                for transducer in &mut self.transducers {
                    transducer.trigger(last_vt, &imminent);
                }
            }
            self.model.clear_ports();
        }
        self.model.stop(t_stop);
        for transducer in &mut self.transducers {
            transducer.exit();
        }

        drop(self.input_queue);
        drop(self.output_queue);
        for handler in self.handlers {
            let _ = handler.join();
        }
        tracing::info!("real-time simulation completed");
    }
}
