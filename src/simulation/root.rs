use super::Simulator;
use crate::error::InjectionRejected;
use crate::modeling::port::InPort;
use crate::modeling::PortVal;
use crate::transducer::Transducer;
use std::collections::HashSet;

/// Root coordinator for virtual-time simulations: drives a model from `t=0` to a
/// bound, without any wall-clock pacing. Mirrors `xdevs.py`'s `Coordinator.simulate*`
/// family of scheduler modes. Also owns the registered [`Transducer`]s (spec.md
/// §4.4 "Root-only operations") and exposes the one-shot [`RootCoordinator::inject`]
/// API (spec.md §4.4 "Injection API").
#[derive(Debug)]
pub struct RootCoordinator<T> {
    model: T,
    transducers: Vec<Transducer>,
}

impl<T: Simulator> RootCoordinator<T> {
    /// Creates a new root coordinator from a DEVS-compliant model.
    pub fn new(model: T) -> Self {
        Self {
            model,
            transducers: Vec::new(),
        }
    }

    /// Registers a transducer to be driven alongside the simulation.
    pub fn add_transducer(&mut self, transducer: Transducer) {
        self.transducers.push(transducer);
    }

    /// Returns a reference to the model under simulation.
    pub fn model(&self) -> &T {
        &self.model
    }

    /// Returns a mutable reference to the model under simulation.
    pub fn model_mut(&mut self) -> &mut T {
        &mut self.model
    }

    /// Returns the registered transducers, to drain their accumulated records.
    pub fn transducers(&self) -> &[Transducer] {
        &self.transducers
    }

    /// Injects `values` into `port` as if an external stimulus arrived `e` seconds
    /// after the model's last transition, then runs one `δ` cycle and clears ports
    /// (spec.md §4.4). Rejects (returning `Err` without mutating the model) when
    /// `time_last + e` falls outside `[time_last, time_next]`.
    pub fn inject<V: PortVal>(
        &mut self,
        port: &InPort<V>,
        values: impl IntoIterator<Item = V>,
        e: f64,
    ) -> Result<(), InjectionRejected> {
        let time_last = self.model.get_t_last();
        let time_next = self.model.get_t_next();
        let t = time_last + e;
        if e < 0. || t > time_next {
            return Err(InjectionRejected {
                time: t,
                time_last,
                time_next,
            });
        }
        for value in values {
            // Safety: pushing an external stimulus directly onto an input port of the
            // top-level model, immediately followed by a one-shot delta cycle below.
            unsafe { port.push_external(value) };
        }
        self.model.transition(t);
        self.trigger_transducers(t);
        self.model.clear_ports();
        Ok(())
    }

    /// Runs one lambda/delta/clear cycle, returning the new `t_next`.
    fn cycle(&mut self, t: f64) -> f64 {
        self.model.collection(t);
        let t_next = self.model.transition(t);
        self.trigger_transducers(t);
        self.model.clear_ports();
        t_next
    }

    fn trigger_transducers(&mut self, t: f64) {
        if self.transducers.is_empty() {
            return;
        }
        let mut imminent = HashSet::new();
        self.model.imminent(t, &mut imminent);
        for transducer in &mut self.transducers {
            transducer.trigger(t, &imminent);
        }
    }

    fn initialize_transducers(&mut self) {
        for transducer in &mut self.transducers {
            transducer.initialize();
        }
    }

    fn exit_transducers(&mut self) {
        for transducer in &mut self.transducers {
            transducer.exit();
        }
    }

    /// Runs the simulation until virtual time reaches `t_end`.
    #[tracing::instrument(skip(self), fields(model = self.model.get_name()))]
    pub fn simulate(&mut self, t_end: f64) {
        tracing::info!(t_end, "starting virtual-time simulation");
        self.initialize_transducers();
        let mut t_next = self.model.start(0.);
        while t_next < t_end {
            t_next = self.cycle(t_next);
        }
        self.model.stop(t_next.min(t_end));
        self.exit_transducers();
        tracing::info!("virtual-time simulation completed");
    }

    /// Runs the simulation for a bounded number of cycles (or until `t_next` becomes
    /// infinity, whichever happens first).
    #[tracing::instrument(skip(self), fields(model = self.model.get_name()))]
    pub fn simulate_iters(&mut self, max_iters: usize) {
        tracing::info!(max_iters, "starting bounded-iteration simulation");
        self.initialize_transducers();
        let mut t = self.model.start(0.);
        let mut last_t = 0.;
        for _ in 0..max_iters {
            if t.is_infinite() {
                break;
            }
            last_t = t;
            t = self.cycle(t);
        }
        self.model.stop(last_t);
        self.exit_transducers();
        tracing::info!("bounded-iteration simulation completed");
    }

    /// Runs the simulation until `t_next` becomes infinity (the model has nothing left
    /// to do). Use with models that are guaranteed to terminate.
    #[tracing::instrument(skip(self), fields(model = self.model.get_name()))]
    pub fn simulate_inf(&mut self) {
        tracing::info!("starting unbounded simulation");
        self.initialize_transducers();
        let mut t_next = self.model.start(0.);
        while t_next.is_finite() {
            t_next = self.cycle(t_next);
        }
        self.model.stop(t_next);
        self.exit_transducers();
        tracing::info!("unbounded simulation completed");
    }
}
