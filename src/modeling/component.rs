use crate::modeling::port::{new_bag, InPort, OutPort, Port, PortVal, Shared};
#[cfg(feature = "rt")]
use crate::{error::PortError, Event};
use std::collections::HashMap;

/// DEVS component. Models must comprise a component to fulfill the
/// [`crate::simulation::Simulator`] trait.
#[derive(Debug)]
pub struct Component {
    /// Name of the DEVS component.
    name: String,
    /// Time of the last component state transition.
    t_last: f64,
    /// Time for the next component state transition.
    t_next: f64,
    /// Input ports map. Keys are the port IDs, and values correspond to the index of the port in `in_ports`.
    in_map: HashMap<String, usize>,
    /// Output ports map. Keys are the port IDs, and values correspond to the index of the port in `out_ports`.
    out_map: HashMap<String, usize>,
    /// Input port set of the DEVS component (serialized for better performance).
    in_ports: Vec<Shared<dyn Port>>,
    /// Output port set of the DEVS component (serialized for better performance).
    out_ports: Vec<Shared<dyn Port>>,
}

impl std::fmt::Debug for dyn Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<port>")
    }
}

impl Component {
    /// It creates a new component with the provided name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            t_last: 0.,
            t_next: f64::INFINITY,
            in_map: HashMap::new(),
            out_map: HashMap::new(),
            in_ports: Vec::new(),
            out_ports: Vec::new(),
        }
    }

    /// Returns name of the component.
    #[inline]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the time for the last component state transition.
    #[inline]
    pub fn get_t_last(&self) -> f64 {
        self.t_last
    }

    /// Returns the time for the next component state transition.
    #[inline]
    pub fn get_t_next(&self) -> f64 {
        self.t_next
    }

    /// Sets the time for the for the last and next component state transitions.
    #[inline]
    pub(crate) fn set_sim_t(&mut self, t_last: f64, t_next: f64) {
        self.t_last = t_last;
        self.t_next = t_next;
    }

    /// Adds a new input port of type `T` and returns a reference to it.
    /// It panics if there is already an input port with the same name.
    pub fn add_in_port<T: PortVal>(&mut self, name: &str) -> InPort<T> {
        if self.in_map.contains_key(name) {
            panic!("component already contains input port with the name provided");
        }
        self.in_map.insert(name.to_string(), self.in_ports.len());
        let bag = new_bag();
        self.in_ports.push(bag.clone());
        InPort(bag)
    }

    /// Adds a new output port of type `T` and returns a reference to it.
    /// It panics if there is already an output port with the same name.
    pub fn add_out_port<T: PortVal>(&mut self, name: &str) -> OutPort<T> {
        if self.out_map.contains_key(name) {
            panic!("component already contains output port with the name provided");
        }
        self.out_map.insert(name.to_string(), self.out_ports.len());
        let bag = new_bag();
        self.out_ports.push(bag.clone());
        OutPort(bag)
    }

    /// Adds a new input port whose concrete value type matches `like` (an existing
    /// port, typically on another component), without the caller naming that type.
    /// Used to synthesize a boundary port for a document-loaded coupling (spec.md §6).
    /// Panics if an input port with this name already exists.
    pub(crate) fn add_in_port_dyn(&mut self, name: &str, like: &Shared<dyn Port>) -> Shared<dyn Port> {
        if self.in_map.contains_key(name) {
            panic!("component already contains input port with the name provided");
        }
        let bag = like.new_like();
        self.in_map.insert(name.to_string(), self.in_ports.len());
        self.in_ports.push(bag.clone());
        bag
    }

    /// Output-port counterpart of [`Component::add_in_port_dyn`].
    pub(crate) fn add_out_port_dyn(&mut self, name: &str, like: &Shared<dyn Port>) -> Shared<dyn Port> {
        if self.out_map.contains_key(name) {
            panic!("component already contains output port with the name provided");
        }
        let bag = like.new_like();
        self.out_map.insert(name.to_string(), self.out_ports.len());
        self.out_ports.push(bag.clone());
        bag
    }

    /// Returns `true` if all the input ports of the model are empty.
    ///
    /// # Safety
    ///
    /// This method can only be executed when implementing the [`crate::simulation::Simulator::transition`]
    /// method to determine whether to execute the internal, external, or confluent transition function.
    #[inline]
    pub(crate) unsafe fn is_input_empty(&self) -> bool {
        self.in_ports.iter().all(|p| p.is_empty())
    }

    /// Returns `true` if all the output ports of the model are empty.
    #[inline]
    pub(crate) unsafe fn is_output_empty(&self) -> bool {
        self.out_ports.iter().all(|p| p.is_empty())
    }

    /// Returns an iterator over the non-empty input ports of the model, by name.
    ///
    /// # Safety
    ///
    /// Same invariants as [`Component::is_input_empty`].
    pub(crate) unsafe fn used_in_ports(&self) -> impl Iterator<Item = &str> {
        self.in_map.iter().filter_map(move |(name, &i)| {
            (!self.in_ports[i].is_empty()).then_some(name.as_str())
        })
    }

    /// Returns an iterator over the non-empty output ports of the model, by name.
    ///
    /// # Safety
    ///
    /// Same invariants as [`Component::is_output_empty`].
    pub(crate) unsafe fn used_out_ports(&self) -> impl Iterator<Item = &str> {
        self.out_map.iter().filter_map(move |(name, &i)| {
            (!self.out_ports[i].is_empty()).then_some(name.as_str())
        })
    }

    /// Returns a reference to an input port with the given name.
    /// If the component does not have any input port with this name, it returns [`None`].
    #[inline]
    pub(crate) fn get_in_port(&self, port_name: &str) -> Option<Shared<dyn Port>> {
        let i = *self.in_map.get(port_name)?;
        Some(self.in_ports.get(i)?.clone())
    }

    /// Returns a reference to an output port with the given name.
    /// If the component does not have any output port with this name, it returns [`None`].
    #[inline]
    pub(crate) fn get_out_port(&self, port_name: &str) -> Option<Shared<dyn Port>> {
        let i = *self.out_map.get(port_name)?;
        Some(self.out_ports.get(i)?.clone())
    }

    /// Clears all the input ports of the model.
    ///
    /// # Safety
    ///
    /// This method can only be executed when implementing [`crate::simulation::Simulator::clear_ports`] method.
    #[inline]
    pub(crate) unsafe fn clear_input(&mut self) {
        self.in_ports.iter_mut().for_each(|p| p.clear());
    }

    /// Clears all the output ports of the model.
    ///
    /// # Safety
    ///
    /// This method can only be executed when implementing [`crate::simulation::Simulator::clear_ports`] method.
    #[inline]
    pub(crate) unsafe fn clear_output(&mut self) {
        self.out_ports.iter_mut().for_each(|p| p.clear());
    }

    /// Parses `event`'s value and pushes it onto the input port it names.
    ///
    /// # Safety
    ///
    /// The caller must ensure this component is the top-level model of a
    /// [`crate::rt::RealTimeCoordinator`] and that injection happens between cycles.
    #[cfg(feature = "rt")]
    pub(crate) unsafe fn inject(&self, event: &Event) -> Result<(), PortError> {
        let port = self
            .get_in_port(event.port())
            .ok_or_else(|| PortError::UnknownPort(event.port().to_string()))?;
        port.inject(event.value()).map_err(|_| PortError::TypeMismatch {
            port: event.port().to_string(),
            value: event.value().to_string(),
        })
    }

    /// Drains every output port, returning each value tagged with its port name.
    ///
    /// # Safety
    ///
    /// Same invariants as [`Component::clear_output`].
    #[cfg(feature = "rt")]
    pub(crate) unsafe fn eject(&self) -> impl Iterator<Item = Event> + '_ {
        self.out_map.iter().flat_map(|(port_name, &n)| {
            self.out_ports[n]
                .eject()
                .into_iter()
                .map(move |value| Event::new(port_name.to_string(), value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "component already contains input port with the name provided")]
    fn test_duplicate_in_port() {
        let mut a = Component::new("component_a");
        let _port = a.add_in_port::<i32>("i32");
        let _port = a.add_in_port::<i32>("i32");
    }

    #[test]
    #[should_panic(expected = "component already contains output port with the name provided")]
    fn test_duplicate_out_port() {
        let mut a = Component::new("component_a");
        let _port = a.add_out_port::<i32>("i32");
        let _port = a.add_out_port::<f64>("i32");
    }

    #[test]
    fn test_component() {
        let mut a = Component::new("component_a");
        let in_i32 = a.add_in_port::<i32>("i32");
        let out_i32 = a.add_out_port::<i32>("i32");
        let out_f64 = a.add_out_port::<f64>("f64");

        assert_eq!("component_a", a.get_name());
        assert!(unsafe { a.is_input_empty() });
        assert!(unsafe { a.is_output_empty() });

        unsafe {
            out_i32.add_value(1);
            out_f64.add_values(&[1.0, 2.0]);
        }
        assert!(unsafe { a.is_input_empty() });
        assert!(!unsafe { a.is_output_empty() });

        unsafe { a.clear_output() };
        assert!(unsafe { a.is_output_empty() });
        assert!(unsafe { in_i32.is_empty() });
    }
}
