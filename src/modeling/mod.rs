//! The modeling layer: components, ports, atomic models, and coupled models.
//!
//! This module defines the *static* DEVS vocabulary (what a model is made of); the
//! [`crate::simulation`] module defines how models are driven through a simulation
//! cycle.

pub(crate) mod atomic;
mod component;
mod coupled;
pub(crate) mod port;

pub use atomic::Atomic;
pub use component::Component;
pub use coupled::Coupled;
pub use port::{CouplingHost, InPort, OutPort, PortVal};

/// Implements [`Simulator`](crate::simulation::Simulator) for a newtype wrapper around
/// a [`Coupled`] field, delegating every method to it. Use this for a concrete coupled
/// model (e.g. an experimental frame wiring a generator, a processor, and a transducer
/// together) that exposes its own constructor and keeps `coupled: Coupled` private.
#[macro_export]
macro_rules! impl_coupled {
    ($($COUPLED:ident),+ $(,)?) => {
        $(
            impl $crate::simulation::Simulator for $COUPLED {
                fn get_component(&self) -> &$crate::modeling::Component {
                    self.coupled.get_component()
                }
                fn get_component_mut(&mut self) -> &mut $crate::modeling::Component {
                    self.coupled.get_component_mut()
                }
                fn start(&mut self, t_start: f64) -> f64 {
                    self.coupled.start(t_start)
                }
                fn stop(&mut self, t_stop: f64) {
                    self.coupled.stop(t_stop)
                }
                fn collection(&mut self, t: f64) {
                    self.coupled.collection(t)
                }
                fn transition(&mut self, t: f64) -> f64 {
                    self.coupled.transition(t)
                }
                fn clear_ports(&mut self) {
                    self.coupled.clear_ports()
                }
                fn imminent(&self, t: f64, out: &mut ::std::collections::HashSet<String>) {
                    self.coupled.imminent(t, out)
                }
            }

            impl ::std::convert::From<$COUPLED> for $crate::modeling::Coupled {
                fn from(wrapper: $COUPLED) -> Self {
                    wrapper.coupled
                }
            }
        )+
    };
}
