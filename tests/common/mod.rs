use xdevs_kernel::impl_atomic;
use xdevs_kernel::modeling::{Atomic, Component, InPort, OutPort};

/// A trivial atomic model: whatever arrives on `input` within a cycle is copied onto
/// `output` at the next internal transition, `delay` virtual seconds later. Used by
/// every integration test in this directory as a minimal, deterministic building
/// block instead of re-deriving `gpt`'s richer behavior each time.
#[derive(Debug)]
pub struct Relay {
    component: Component,
    delay: f64,
    sigma: f64,
    pending: Vec<i32>,
    input: InPort<i32>,
    output: OutPort<i32>,
}

impl Relay {
    pub fn new(name: &str, delay: f64) -> Self {
        let mut component = Component::new(name);
        let input = component.add_in_port::<i32>("input");
        let output = component.add_out_port::<i32>("output");
        Self {
            component,
            delay,
            sigma: f64::INFINITY,
            pending: Vec::new(),
            input,
            output,
        }
    }

    pub fn input_port(&self) -> InPort<i32> {
        self.input.clone()
    }

    pub fn output_port(&self) -> OutPort<i32> {
        self.output.clone()
    }
}

impl Atomic for Relay {
    fn get_component(&self) -> &Component {
        &self.component
    }

    fn get_component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    fn lambda(&self) {
        // Safety: adding messages on atomic model's output port at lambda.
        unsafe { self.output.add_values(&self.pending) };
    }

    fn delta_int(&mut self) {
        self.pending.clear();
        self.sigma = f64::INFINITY;
    }

    fn delta_ext(&mut self, e: f64) {
        self.sigma -= e;
        // Safety: reading messages on atomic model's input port at delta_ext.
        self.pending = unsafe { self.input.get_values() }.clone();
        self.sigma = self.delay;
    }

    fn ta(&self) -> f64 {
        self.sigma
    }
}

impl_atomic!(Relay);

/// Counts how many times each of its own transition kinds has fired, so tests can
/// assert on transition dispatch (spec.md property 4) without inspecting private
/// state.
#[derive(Debug)]
pub struct Counter {
    component: Component,
    period: f64,
    sigma: f64,
    pub int_count: usize,
    pub ext_count: usize,
    pub con_count: usize,
    input: InPort<i32>,
}

impl Counter {
    pub fn new(name: &str, period: f64) -> Self {
        let mut component = Component::new(name);
        let input = component.add_in_port::<i32>("input");
        Self {
            component,
            period,
            sigma: period,
            int_count: 0,
            ext_count: 0,
            con_count: 0,
            input,
        }
    }

    pub fn input_port(&self) -> InPort<i32> {
        self.input.clone()
    }
}

impl Atomic for Counter {
    fn get_component(&self) -> &Component {
        &self.component
    }

    fn get_component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    fn lambda(&self) {}

    fn delta_int(&mut self) {
        self.int_count += 1;
        self.sigma = self.period;
    }

    fn delta_ext(&mut self, e: f64) {
        self.ext_count += 1;
        self.sigma -= e;
    }

    fn delta_con(&mut self) {
        self.con_count += 1;
        self.sigma = self.period;
    }

    fn ta(&self) -> f64 {
        self.sigma
    }
}

impl_atomic!(Counter);

/// Echoes whatever arrives on `input` straight back onto `output` from inside
/// `delta_ext` itself, rather than waiting for the next `lambda`. Exists only to make
/// the output-delivery-vs-`delta` ordering externally observable in `tests/real_time.rs`:
/// a coordinator that ejects a cycle's output before running `delta` would drop this
/// model's writes entirely, since nothing is on the port until `delta_ext` runs.
#[derive(Debug)]
pub struct EchoOnExternal {
    component: Component,
    input: InPort<i32>,
    output: OutPort<i32>,
}

impl EchoOnExternal {
    pub fn new(name: &str) -> Self {
        let mut component = Component::new(name);
        let input = component.add_in_port::<i32>("input");
        let output = component.add_out_port::<i32>("output");
        Self {
            component,
            input,
            output,
        }
    }
}

impl Atomic for EchoOnExternal {
    fn get_component(&self) -> &Component {
        &self.component
    }

    fn get_component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    fn lambda(&self) {}

    fn delta_int(&mut self) {}

    fn delta_ext(&mut self, _e: f64) {
        // Safety: reading this cycle's input and writing this cycle's output from
        // delta_ext, not lambda, solely to probe delivery ordering from the outside.
        unsafe {
            for value in self.input.get_values().clone() {
                self.output.add_value(value);
            }
        }
    }

    fn ta(&self) -> f64 {
        f64::INFINITY
    }
}

impl_atomic!(EchoOnExternal);
