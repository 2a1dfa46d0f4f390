//! Property 2 / Scenario E (spec.md §8): a three-level hierarchy with one IC at each
//! level plus an EIC -> IC -> EOC chain must produce the same output trace whether it
//! is simulated as-is or after `flatten()`.

mod common;

use common::Relay;
use std::cell::RefCell;
use std::rc::Rc;
use xdevs_kernel::impl_atomic;
use xdevs_kernel::modeling::{Atomic, Component, Coupled, InPort};
use xdevs_kernel::simulation::Simulator;

/// Records every value it receives, tagged with the virtual time it arrived, so the
/// test can compare the two runs' output traces without hand-deriving the exact
/// timing of a four-hop relay chain.
#[derive(Debug)]
struct Recorder {
    component: Component,
    input: InPort<i32>,
    log: Rc<RefCell<Vec<(f64, i32)>>>,
}

impl Recorder {
    fn new(name: &str, log: Rc<RefCell<Vec<(f64, i32)>>>) -> Self {
        let mut component = Component::new(name);
        let input = component.add_in_port::<i32>("input");
        Self {
            component,
            input,
            log,
        }
    }
}

impl Atomic for Recorder {
    fn get_component(&self) -> &Component {
        &self.component
    }
    fn get_component_mut(&mut self) -> &mut Component {
        &mut self.component
    }
    fn lambda(&self) {}
    fn delta_int(&mut self) {}
    fn delta_ext(&mut self, e: f64) {
        let t = self.component.get_t_last() + e;
        for v in unsafe { self.input.get_values() } {
            self.log.borrow_mut().push((t, *v));
        }
    }
    fn ta(&self) -> f64 {
        f64::INFINITY
    }
}

impl_atomic!(Recorder);

/// Three levels deep: `top` contains `mid` (which contains `inner`, which contains
/// two relays joined by an IC) plus a relay `d` at the top level, joined to `mid` by
/// another IC, and the whole chain bridged end-to-end by `top`'s own EIC/EOC. Every
/// relay delays by exactly one virtual second, so a value takes four seconds to cross
/// `a -> b -> c -> d`.
fn build_hierarchy(flatten: bool) -> (Coupled, xdevs_kernel::modeling::InPort<i32>, Rc<RefCell<Vec<(f64, i32)>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut inner = Coupled::new("inner");
    inner.add_in_port::<i32>("in");
    inner.add_out_port::<i32>("out");
    inner.add_component(Box::new(Relay::new("a", 1.0)));
    inner.add_component(Box::new(Relay::new("b", 1.0)));
    inner.add_eic("in", "a", "input");
    inner.add_ic("a", "output", "b", "input");
    inner.add_eoc("b", "output", "out");

    let mut mid = Coupled::new("mid");
    mid.add_in_port::<i32>("in");
    mid.add_out_port::<i32>("out");
    mid.add_component(Box::new(inner));
    mid.add_component(Box::new(Relay::new("c", 1.0)));
    mid.add_eic("in", "inner", "in");
    mid.add_ic("inner", "out", "c", "input");
    mid.add_eoc("c", "output", "out");

    let mut top = Coupled::new("top");
    let top_in = top.add_in_port::<i32>("in");
    top.add_out_port::<i32>("out");
    top.add_component(Box::new(mid));
    top.add_component(Box::new(Relay::new("d", 1.0)));
    top.add_component(Box::new(Recorder::new("recorder", log.clone())));
    top.add_eic("in", "mid", "in");
    top.add_ic("mid", "out", "d", "input");
    top.add_eoc("d", "output", "out");
    // Extra IC tapping the same source port as the EOC above, so the test can observe
    // what reaches the boundary without reading back a model's own output port.
    top.add_ic("d", "output", "recorder", "input");

    if flatten {
        let inlined = top.flatten();
        assert_eq!(inlined, 2, "two coupled levels (mid, inner) should collapse");
        assert_eq!(
            top.n_components(),
            5,
            "a, b, c, d, and recorder should all live directly under the root"
        );
    }

    (top, top_in, log)
}

// `Coupled` has its own crate-private `collection`/`transition`/`clear_ports` methods
// that shadow the `Simulator` trait methods of the same name, so calls from outside
// the crate must go through the trait explicitly rather than as a method call.
fn drive(model: &mut Coupled, input: &xdevs_kernel::modeling::InPort<i32>, inputs: &[(f64, i32)], until: u32) {
    let mut next = 0;
    for step in 0..=until {
        let t = step as f64;
        while next < inputs.len() && inputs[next].0 == t {
            unsafe { input.push_external(inputs[next].1) };
            next += 1;
        }
        Simulator::collection(model, t);
        Simulator::transition(model, t);
        Simulator::clear_ports(model);
    }
}

#[test]
fn flattening_preserves_the_end_to_end_output_trace() {
    let inputs = [(0.0, 1), (5.0, 2)];

    let (mut hierarchical, in_h, log_h) = build_hierarchy(false);
    drive(&mut hierarchical, &in_h, &inputs, 10);

    let (mut flattened, in_f, log_f) = build_hierarchy(true);
    drive(&mut flattened, &in_f, &inputs, 10);

    assert_eq!(*log_h.borrow(), *log_f.borrow());
    // Four one-second relay hops (a -> b -> c -> d) after the first injection at t=0.
    assert_eq!(log_h.borrow().first(), Some(&(4.0, 1)));
    assert_eq!(log_h.borrow().get(1), Some(&(9.0, 2)));
}

#[test]
fn flatten_collapses_every_nested_coupled_and_keeps_coupling_counts() {
    let (top, _in, _log) = build_hierarchy(true);
    assert_eq!(top.n_eics(), 1);
    assert_eq!(top.n_eocs(), 1);
    // a->b, inner.out->c (now c's direct predecessor), mid.out->d, d->recorder.
    assert_eq!(top.n_ics(), 4);
}
