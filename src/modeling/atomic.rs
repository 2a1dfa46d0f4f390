use crate::modeling::Component;

/// Interface for atomic DEVS models.
///
/// An atomic model owns a [`Component`] (its ports and simulation clock) plus whatever
/// state its `delta_int`/`delta_ext`/`lambda`/`ta` functions close over. Implementers
/// get a [`crate::simulation::Simulator`] impl for free via [`impl_atomic!`].
pub trait Atomic: std::fmt::Debug {
    /// Returns a reference to the component wrapped by this atomic model.
    fn get_component(&self) -> &Component;

    /// Returns a mutable reference to the component wrapped by this atomic model.
    fn get_component_mut(&mut self) -> &mut Component;

    /// Output function. May only read `self`'s state and write to output ports.
    fn lambda(&self);

    /// Internal transition function, triggered when `ta() == 0` has elapsed.
    fn delta_int(&mut self);

    /// External transition function. `e` is the elapsed time since the last state
    /// transition of the model.
    fn delta_ext(&mut self, e: f64);

    /// Time advance function: how long until the next internal transition, absent any
    /// external event.
    fn ta(&self) -> f64;

    /// Confluent transition function, triggered when an external event arrives exactly
    /// at the model's own `t_next`. By default it runs [`Atomic::delta_int`] followed
    /// by [`Atomic::delta_ext`] with elapsed time `0`; implementers that need a
    /// different ordering (e.g. to prioritize the external event) may override it.
    fn delta_con(&mut self) {
        self.delta_int();
        self.delta_ext(0.);
    }
}

/// Implements the [`super::super::simulation::Simulator`] lifecycle (`start`/`stop`/
/// `collection`/`transition`/`clear_ports`) for an [`Atomic`] model from its `ta`/
/// `delta_int`/`delta_ext`/`delta_con`/`lambda` definitions. Factored out of
/// [`impl_atomic!`] so both the macro and, if ever needed, a hand-written impl can
/// reuse the same dispatch logic.
pub fn start<T: Atomic>(this: &mut T, t_start: f64) -> f64 {
    let t_next = t_start + this.ta();
    this.get_component_mut().set_sim_t(t_start, t_next);
    t_next
}

pub fn stop<T: Atomic>(this: &mut T, t_stop: f64) {
    this.get_component_mut().set_sim_t(t_stop, f64::INFINITY);
}

pub fn collection<T: Atomic>(this: &mut T, t: f64) {
    if t >= this.get_component().get_t_next() {
        this.lambda();
    }
}

pub fn transition<T: Atomic>(this: &mut T, t: f64) -> f64 {
    let t_next = this.get_component().get_t_next();
    // Safety: called by a Simulator/Coordinator cycle, after EIC/IC propagation for
    // this time step and before clear_ports; ports reflect this step's inputs.
    if !unsafe { this.get_component().is_input_empty() } {
        if t == t_next {
            this.delta_con();
        } else {
            let e = t - this.get_component().get_t_last();
            this.delta_ext(e);
        }
    } else if t == t_next {
        this.delta_int();
    } else {
        return t_next;
    }
    let t_next = t + this.ta();
    this.get_component_mut().set_sim_t(t, t_next);
    t_next
}

pub fn clear_ports<T: Atomic>(this: &mut T) {
    // Safety: called once per cycle, after lambda/collection and transition/delta have
    // both run for this step, so every reader has already observed this step's values.
    unsafe {
        this.get_component_mut().clear_input();
        this.get_component_mut().clear_output();
    }
}

pub fn imminent<T: Atomic>(this: &T, t: f64, out: &mut std::collections::HashSet<String>) {
    let comp = this.get_component();
    // Safety: called after this cycle's transition, before clear_ports.
    let has_input = !unsafe { comp.is_input_empty() };
    // `transition` already advanced `t_last` to `t` iff it actually fired this cycle
    // (internal, external, or confluent); `get_t_next()` is the *next* scheduled
    // event by this point, not the one that just happened, so it can't be the test.
    if t == comp.get_t_last() || has_input {
        out.insert(comp.get_name().to_string());
    }
    unsafe {
        for name in comp.used_in_ports() {
            out.insert(format!("{}.{}", comp.get_name(), name));
        }
        for name in comp.used_out_ports() {
            out.insert(format!("{}.{}", comp.get_name(), name));
        }
    }
}

/// Implements [`Atomic`] (by forwarding to the inherent methods of the same name) and
/// [`super::super::simulation::Simulator`] (via the free functions above) for a type
/// that already defines `lambda`/`delta_int`/`delta_ext`/`ta` inherently and holds a
/// `component: Component` field.
#[macro_export]
macro_rules! impl_atomic {
    ($($ATOMIC:ident),+ $(,)?) => {
        $(
            impl $crate::simulation::Simulator for $ATOMIC {
                fn get_component(&self) -> &$crate::modeling::Component {
                    $crate::modeling::Atomic::get_component(self)
                }
                fn get_component_mut(&mut self) -> &mut $crate::modeling::Component {
                    $crate::modeling::Atomic::get_component_mut(self)
                }
                fn start(&mut self, t_start: f64) -> f64 {
                    $crate::modeling::atomic::start(self, t_start)
                }
                fn stop(&mut self, t_stop: f64) {
                    $crate::modeling::atomic::stop(self, t_stop)
                }
                fn collection(&mut self, t: f64) {
                    $crate::modeling::atomic::collection(self, t)
                }
                fn transition(&mut self, t: f64) -> f64 {
                    $crate::modeling::atomic::transition(self, t)
                }
                fn clear_ports(&mut self) {
                    $crate::modeling::atomic::clear_ports(self)
                }
                fn imminent(&self, t: f64, out: &mut ::std::collections::HashSet<String>) {
                    $crate::modeling::atomic::imminent(self, t, out)
                }
            }
        )+
    };
}
