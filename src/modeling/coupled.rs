use crate::error::StructuralError;
use crate::modeling::port::{CouplingHost, Port, PortVal, Shared};
use crate::modeling::{Component, InPort, OutPort};
use crate::simulation::Simulator;
use std::collections::HashMap;

/// A resolved port-to-port link, plus an optional remote delegate (spec.md §3: "a
/// coupling's host is an optional external endpoint"). `Coupled::collection`/
/// `transition` propagate values along these every cycle.
#[derive(Debug, Clone)]
pub(crate) struct Coupling {
    pub(crate) to: Shared<dyn Port>,
    pub(crate) from: Shared<dyn Port>,
    pub(crate) host: Option<Shared<dyn CouplingHost>>,
}

impl Coupling {
    /// Propagates this cycle's values along the coupling: through the remote
    /// [`CouplingHost`] if one is set (spec.md §3), or by linking port bags directly
    /// otherwise. `to_name` is the destination port's name, forwarded to the host.
    ///
    /// # Safety
    ///
    /// Same invariants as [`Port::propagate`]/[`Port::peek_repr`].
    unsafe fn propagate(&self, to_name: &str) {
        match &self.host {
            Some(host) => host.deliver(to_name, &self.from.peek_repr()),
            None => self.from.propagate(&*self.to),
        }
    }
}

/// An external-input coupling: the coupled model's own `port_from` feeds
/// `comp_to`'s `port_to`.
#[derive(Debug)]
pub(crate) struct EicEntry {
    pub(crate) port_from: String,
    pub(crate) comp_to: String,
    pub(crate) port_to: String,
    pub(crate) coupling: Coupling,
}

/// An internal coupling: `comp_from`'s `port_from` feeds `comp_to`'s `port_to`.
#[derive(Debug)]
pub(crate) struct IcEntry {
    pub(crate) comp_from: String,
    pub(crate) port_from: String,
    pub(crate) comp_to: String,
    pub(crate) port_to: String,
    pub(crate) coupling: Coupling,
}

/// An external-output coupling: `comp_from`'s `port_from` feeds the coupled model's
/// own `port_to`.
#[derive(Debug)]
pub(crate) struct EocEntry {
    pub(crate) comp_from: String,
    pub(crate) port_from: String,
    pub(crate) port_to: String,
    pub(crate) coupling: Coupling,
}

/// Coupled DEVS model: a named set of components (atomic or coupled) wired together
/// by external-input (EIC), internal (IC), and external-output (EOC) couplings.
#[derive(Debug)]
pub struct Coupled {
    /// Component wrapped by the coupled model.
    pub(crate) component: Component,
    /// Components map. Keys are components' IDs.
    comps_map: HashMap<String, usize>,
    /// Components of the DEVS coupled model (serialized for better performance).
    pub(crate) components: Vec<Box<dyn Simulator>>,
    /// External input couplings.
    pub(crate) eics: Vec<EicEntry>,
    /// Internal couplings.
    pub(crate) ics: Vec<IcEntry>,
    /// External output couplings.
    pub(crate) eocs: Vec<EocEntry>,
}

impl Coupled {
    /// Creates a new coupled DEVS model with the provided name.
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name),
            comps_map: HashMap::new(),
            components: Vec::new(),
            eics: Vec::new(),
            ics: Vec::new(),
            eocs: Vec::new(),
        }
    }

    /// Returns name of the coupled model.
    #[inline]
    pub fn get_name(&self) -> &str {
        self.component.get_name()
    }

    /// Returns the number of components in the coupled model.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Returns the number of external input couplings in the coupled model.
    #[inline]
    pub fn n_eics(&self) -> usize {
        self.eics.len()
    }

    /// Returns the number of internal couplings in the coupled model.
    #[inline]
    pub fn n_ics(&self) -> usize {
        self.ics.len()
    }

    /// Returns the number of external output couplings in the coupled model.
    #[inline]
    pub fn n_eocs(&self) -> usize {
        self.eocs.len()
    }

    /// Returns an iterator over the names of the direct child components.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.comps_map.keys().map(|s| s.as_str())
    }

    /// Adds a new input port of type `T` and returns a reference to it.
    /// It panics if there is already an input port with the same name.
    #[inline]
    pub fn add_in_port<T: PortVal>(&mut self, name: &str) -> InPort<T> {
        self.component.add_in_port::<T>(name)
    }

    /// Adds a new output port of type `T` and returns a reference to it.
    /// It panics if there is already an output port with the same name.
    #[inline]
    pub fn add_out_port<T: PortVal>(&mut self, name: &str) -> OutPort<T> {
        self.component.add_out_port::<T>(name)
    }

    /// Adds a new component to the coupled model.
    /// It panics if there is already a component with the same name.
    pub fn add_component<T: Simulator>(&mut self, component: Box<T>) {
        let component_name = component.get_name();
        if self.comps_map.contains_key(component_name) {
            panic!("coupled model already contains component with the name provided")
        }
        self.comps_map
            .insert(component_name.to_string(), self.components.len());
        self.components.push(component);
    }

    /// Returns a reference to a component with the provided name.
    #[inline]
    fn get_component(&self, name: &str) -> Option<&Component> {
        let index = *self.comps_map.get(name)?;
        Some(self.components.get(index)?.get_component())
    }

    /// Returns a child component's input port, by component and port name.
    pub(crate) fn child_in_port(&self, component: &str, port: &str) -> Option<Shared<dyn Port>> {
        self.get_component(component)?.get_in_port(port)
    }

    /// Returns a child component's output port, by component and port name.
    pub(crate) fn child_out_port(&self, component: &str, port: &str) -> Option<Shared<dyn Port>> {
        self.get_component(component)?.get_out_port(port)
    }

    /// Returns this coupled model's own input port `name`, synthesizing one whose
    /// concrete value type matches `like` if it does not already exist (spec.md §6:
    /// "if the parent has no such input port yet, one is synthesized with the sink
    /// port's element type").
    pub(crate) fn ensure_in_port(&mut self, name: &str, like: &Shared<dyn Port>) -> Shared<dyn Port> {
        match self.component.get_in_port(name) {
            Some(port) => port,
            None => self.component.add_in_port_dyn(name, like),
        }
    }

    /// Output-port counterpart of [`Coupled::ensure_in_port`].
    pub(crate) fn ensure_out_port(&mut self, name: &str, like: &Shared<dyn Port>) -> Shared<dyn Port> {
        match self.component.get_out_port(name) {
            Some(port) => port,
            None => self.component.add_out_port_dyn(name, like),
        }
    }

    /// Adds a new EIC to the model.
    /// You must provide the input port name of the coupled model,
    /// the receiving component name, and its input port name.
    /// This method panics if:
    /// - the origin port does not exist.
    /// - the destination component does not exist.
    /// - the destination port does not exist.
    /// - ports are not compatible.
    /// - coupling already exists.
    pub fn add_eic(&mut self, port_from: &str, component_to: &str, port_to: &str) {
        self.try_add_eic(port_from, component_to, port_to)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible counterpart of [`Coupled::add_eic`].
    pub fn try_add_eic(
        &mut self,
        port_from: &str,
        component_to: &str,
        port_to: &str,
    ) -> Result<(), StructuralError> {
        self.try_add_eic_impl(port_from, component_to, port_to, None)
    }

    /// Like [`Coupled::try_add_eic`], but delegates delivery to `host` (spec.md §3's
    /// "optional remote host") instead of linking port bags.
    pub fn try_add_eic_remote(
        &mut self,
        port_from: &str,
        component_to: &str,
        port_to: &str,
        host: Box<dyn CouplingHost>,
    ) -> Result<(), StructuralError> {
        self.try_add_eic_impl(port_from, component_to, port_to, Some(Shared::from(host)))
    }

    fn try_add_eic_impl(
        &mut self,
        port_from: &str,
        component_to: &str,
        port_to: &str,
        host: Option<Shared<dyn CouplingHost>>,
    ) -> Result<(), StructuralError> {
        let p_from = self
            .component
            .get_in_port(port_from)
            .ok_or_else(|| StructuralError::UnknownInPort(port_from.to_string(), self.get_name().to_string()))?;
        let comp_to = self
            .get_component(component_to)
            .ok_or_else(|| StructuralError::UnknownComponent(component_to.to_string()))?;
        let p_to = comp_to
            .get_in_port(port_to)
            .ok_or_else(|| StructuralError::UnknownInPort(port_to.to_string(), component_to.to_string()))?;
        if !p_from.is_compatible(&*p_to) {
            return Err(StructuralError::TypeMismatch);
        }
        if self
            .eics
            .iter()
            .any(|e| e.port_from == port_from && e.comp_to == component_to && e.port_to == port_to)
        {
            return Err(StructuralError::DuplicateCoupling(format!(
                "{port_from}->{component_to}::{port_to}"
            )));
        }
        self.eics.push(EicEntry {
            port_from: port_from.to_string(),
            comp_to: component_to.to_string(),
            port_to: port_to.to_string(),
            coupling: Coupling {
                to: p_to,
                from: p_from,
                host,
            },
        });
        Ok(())
    }

    /// Adds a new IC to the model.
    /// You must provide the sending component name, its output port name,
    /// the receiving component name, and its input port name.
    /// This method panics if:
    /// - the origin component does not exist.
    /// - the origin port does not exist.
    /// - the destination component does not exist.
    /// - the destination port does not exist.
    /// - ports are not compatible.
    /// - coupling already exists.
    pub fn add_ic(
        &mut self,
        component_from: &str,
        port_from: &str,
        component_to: &str,
        port_to: &str,
    ) {
        self.try_add_ic(component_from, port_from, component_to, port_to)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible counterpart of [`Coupled::add_ic`].
    pub fn try_add_ic(
        &mut self,
        component_from: &str,
        port_from: &str,
        component_to: &str,
        port_to: &str,
    ) -> Result<(), StructuralError> {
        self.try_add_ic_impl(component_from, port_from, component_to, port_to, None)
    }

    /// Like [`Coupled::try_add_ic`], but delegates delivery to `host` (spec.md §3's
    /// "optional remote host") instead of linking port bags.
    pub fn try_add_ic_remote(
        &mut self,
        component_from: &str,
        port_from: &str,
        component_to: &str,
        port_to: &str,
        host: Box<dyn CouplingHost>,
    ) -> Result<(), StructuralError> {
        self.try_add_ic_impl(
            component_from,
            port_from,
            component_to,
            port_to,
            Some(Shared::from(host)),
        )
    }

    fn try_add_ic_impl(
        &mut self,
        component_from: &str,
        port_from: &str,
        component_to: &str,
        port_to: &str,
        host: Option<Shared<dyn CouplingHost>>,
    ) -> Result<(), StructuralError> {
        let comp_from = self
            .get_component(component_from)
            .ok_or_else(|| StructuralError::UnknownComponent(component_from.to_string()))?;
        let p_from = comp_from
            .get_out_port(port_from)
            .ok_or_else(|| StructuralError::UnknownOutPort(port_from.to_string(), component_from.to_string()))?;
        let comp_to = self
            .get_component(component_to)
            .ok_or_else(|| StructuralError::UnknownComponent(component_to.to_string()))?;
        let p_to = comp_to
            .get_in_port(port_to)
            .ok_or_else(|| StructuralError::UnknownInPort(port_to.to_string(), component_to.to_string()))?;
        if !p_from.is_compatible(&*p_to) {
            return Err(StructuralError::TypeMismatch);
        }
        if self.ics.iter().any(|e| {
            e.comp_from == component_from
                && e.port_from == port_from
                && e.comp_to == component_to
                && e.port_to == port_to
        }) {
            return Err(StructuralError::DuplicateCoupling(format!(
                "{component_from}::{port_from}->{component_to}::{port_to}"
            )));
        }
        self.ics.push(IcEntry {
            comp_from: component_from.to_string(),
            port_from: port_from.to_string(),
            comp_to: component_to.to_string(),
            port_to: port_to.to_string(),
            coupling: Coupling {
                to: p_to,
                from: p_from,
                host,
            },
        });
        Ok(())
    }

    /// Adds a new EOC to the model.
    /// You must provide the sending component name, its output port name,
    /// and the output port name of the coupled model.
    /// This method panics if:
    /// - the origin component does not exist.
    /// - the origin port does not exist.
    /// - the destination port does not exist.
    /// - ports are not compatible.
    /// - coupling already exists.
    pub fn add_eoc(&mut self, component_from: &str, port_from: &str, port_to: &str) {
        self.try_add_eoc(component_from, port_from, port_to)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible counterpart of [`Coupled::add_eoc`].
    pub fn try_add_eoc(
        &mut self,
        component_from: &str,
        port_from: &str,
        port_to: &str,
    ) -> Result<(), StructuralError> {
        self.try_add_eoc_impl(component_from, port_from, port_to, None)
    }

    /// Like [`Coupled::try_add_eoc`], but delegates delivery to `host` (spec.md §3's
    /// "optional remote host") instead of linking port bags.
    pub fn try_add_eoc_remote(
        &mut self,
        component_from: &str,
        port_from: &str,
        port_to: &str,
        host: Box<dyn CouplingHost>,
    ) -> Result<(), StructuralError> {
        self.try_add_eoc_impl(component_from, port_from, port_to, Some(Shared::from(host)))
    }

    fn try_add_eoc_impl(
        &mut self,
        component_from: &str,
        port_from: &str,
        port_to: &str,
        host: Option<Shared<dyn CouplingHost>>,
    ) -> Result<(), StructuralError> {
        let comp_from = self
            .get_component(component_from)
            .ok_or_else(|| StructuralError::UnknownComponent(component_from.to_string()))?;
        let p_from = comp_from
            .get_out_port(port_from)
            .ok_or_else(|| StructuralError::UnknownOutPort(port_from.to_string(), component_from.to_string()))?;
        let p_to = self
            .component
            .get_out_port(port_to)
            .ok_or_else(|| StructuralError::UnknownOutPort(port_to.to_string(), self.get_name().to_string()))?;
        if !p_from.is_compatible(&*p_to) {
            return Err(StructuralError::TypeMismatch);
        }
        if self
            .eocs
            .iter()
            .any(|e| e.comp_from == component_from && e.port_from == port_from && e.port_to == port_to)
        {
            return Err(StructuralError::DuplicateCoupling(format!(
                "{component_from}::{port_from}->{port_to}"
            )));
        }
        self.eocs.push(EocEntry {
            comp_from: component_from.to_string(),
            port_from: port_from.to_string(),
            port_to: port_to.to_string(),
            coupling: Coupling {
                to: p_to,
                from: p_from,
                host,
            },
        });
        Ok(())
    }

    // --- Simulator lifecycle, implemented directly on Coupled (the coordinator role) ---

    pub(crate) fn get_component(&self) -> &Component {
        &self.component
    }

    pub(crate) fn get_component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    pub(crate) fn start(&mut self, t_start: f64) -> f64 {
        #[cfg(feature = "par_start")]
        let t_next = {
            use rayon::prelude::*;
            self.components
                .par_iter_mut()
                .map(|c| c.start(t_start))
                .reduce(|| f64::INFINITY, f64::min)
        };
        #[cfg(not(feature = "par_start"))]
        let t_next = self
            .components
            .iter_mut()
            .fold(f64::INFINITY, |acc, c| acc.min(c.start(t_start)));
        self.component.set_sim_t(t_start, t_next);
        t_next
    }

    pub(crate) fn stop(&mut self, t_stop: f64) {
        self.components.iter_mut().for_each(|c| c.stop(t_stop));
        self.component.set_sim_t(t_stop, f64::INFINITY);
    }

    pub(crate) fn collection(&mut self, t: f64) {
        #[cfg(feature = "par_collection")]
        {
            use rayon::prelude::*;
            self.components.par_iter_mut().for_each(|c| c.collection(t));
        }
        #[cfg(not(feature = "par_collection"))]
        self.components.iter_mut().for_each(|c| c.collection(t));

        // Safety: propagating values produced by this step's lambda calls, along this
        // coupled model's own IC/EOC couplings.
        unsafe {
            for entry in self.ics.iter() {
                entry.coupling.propagate(&entry.port_to);
            }
            for entry in self.eocs.iter() {
                entry.coupling.propagate(&entry.port_to);
            }
        }
    }

    pub(crate) fn transition(&mut self, t: f64) -> f64 {
        // Safety: propagating this step's external inputs, before any child observes them.
        unsafe {
            for entry in self.eics.iter() {
                entry.coupling.propagate(&entry.port_to);
            }
        }
        #[cfg(feature = "par_transition")]
        let t_next = {
            use rayon::prelude::*;
            self.components
                .par_iter_mut()
                .map(|c| c.transition(t))
                .reduce(|| f64::INFINITY, f64::min)
        };
        #[cfg(not(feature = "par_transition"))]
        let t_next = self
            .components
            .iter_mut()
            .fold(f64::INFINITY, |acc, c| acc.min(c.transition(t)));
        self.component.set_sim_t(t, t_next);
        t_next
    }

    pub(crate) fn clear_ports(&mut self) {
        #[cfg(feature = "par_stop")]
        {
            use rayon::prelude::*;
            self.components.par_iter_mut().for_each(|c| c.clear_ports());
        }
        #[cfg(not(feature = "par_stop"))]
        self.components.iter_mut().for_each(|c| c.clear_ports());
        // Safety: called once per cycle, after every reader of this step's EIC/IC/EOC
        // deliveries (including transducers) has already observed them.
        unsafe {
            self.component.clear_input();
            self.component.clear_output();
        }
    }

    /// Flattens every level of hierarchy beneath this model: repeatedly replaces a
    /// direct child coupled model with its own children, rewriting couplings so the
    /// observable behavior of the overall model is unchanged. Mirrors the bottom-up
    /// flattening of `xdevs.py`'s `Coupled.flatten`, generalized to Rust's trait-object
    /// component model via [`Simulator::as_any`]/[`Simulator::into_any`].
    ///
    /// Atomic children, and any child that is not itself a [`Coupled`], are left
    /// untouched. Returns the number of coupled children inlined (at every depth).
    pub fn flatten(&mut self) -> usize {
        let mut inlined = 0;
        loop {
            let idx = self
                .components
                .iter()
                .position(|c| c.as_any().downcast_ref::<Coupled>().is_some());
            let Some(idx) = idx else { break };
            let name = self.components[idx].get_name().to_string();
            let boxed = self.components.remove(idx);
            self.comps_map.remove(&name);
            let child = *boxed
                .into_any()
                .downcast::<Coupled>()
                .expect("downcast_ref above confirmed this is a Coupled");
            self.inline_child(&name, child);
            self.rebuild_comps_map();
            inlined += 1;
        }
        inlined
    }

    fn inline_child(&mut self, child_name: &str, mut child: Coupled) {
        enum LeftSource {
            Eic { port_from: String },
            Ic { comp_from: String, port_from: String },
        }
        let left_feeds: Vec<(LeftSource, Shared<dyn Port>, String, Option<Shared<dyn CouplingHost>>)> = self
            .eics
            .iter()
            .filter(|e| e.comp_to == child_name)
            .map(|e| {
                (
                    LeftSource::Eic {
                        port_from: e.port_from.clone(),
                    },
                    e.coupling.from.clone(),
                    e.port_to.clone(),
                    e.coupling.host.clone(),
                )
            })
            .chain(self.ics.iter().filter(|e| e.comp_to == child_name).map(|e| {
                (
                    LeftSource::Ic {
                        comp_from: e.comp_from.clone(),
                        port_from: e.port_from.clone(),
                    },
                    e.coupling.from.clone(),
                    e.port_to.clone(),
                    e.coupling.host.clone(),
                )
            }))
            .collect();

        enum RightTarget {
            Ic { comp_to: String, port_to: String },
            Eoc { port_to: String },
        }
        let right_feeds: Vec<(RightTarget, Shared<dyn Port>, String, Option<Shared<dyn CouplingHost>>)> = self
            .ics
            .iter()
            .filter(|e| e.comp_from == child_name)
            .map(|e| {
                (
                    RightTarget::Ic {
                        comp_to: e.comp_to.clone(),
                        port_to: e.port_to.clone(),
                    },
                    e.coupling.to.clone(),
                    e.port_from.clone(),
                    e.coupling.host.clone(),
                )
            })
            .chain(self.eocs.iter().filter(|e| e.comp_from == child_name).map(|e| {
                (
                    RightTarget::Eoc {
                        port_to: e.port_to.clone(),
                    },
                    e.coupling.to.clone(),
                    e.port_from.clone(),
                    e.coupling.host.clone(),
                )
            }))
            .collect();

        // Remove every coupling at this level that touched `child_name`.
        self.eics.retain(|e| e.comp_to != child_name);
        self.ics
            .retain(|e| e.comp_from != child_name && e.comp_to != child_name);
        self.eocs.retain(|e| e.comp_from != child_name);

        // Couplings purely internal to `child` become couplings of this model.
        self.ics.extend(std::mem::take(&mut child.ics));

        // Left bridge: join each feed with the child's own EICs from the matching port.
        for (source, source_shared, child_in_port, host) in &left_feeds {
            for child_eic in child.eics.iter().filter(|e| &e.port_from == child_in_port) {
                let coupling = Coupling {
                    to: child_eic.coupling.to.clone(),
                    from: source_shared.clone(),
                    host: host.clone().or_else(|| child_eic.coupling.host.clone()),
                };
                match source {
                    LeftSource::Eic { port_from } => self.eics.push(EicEntry {
                        port_from: port_from.clone(),
                        comp_to: child_eic.comp_to.clone(),
                        port_to: child_eic.port_to.clone(),
                        coupling,
                    }),
                    LeftSource::Ic { comp_from, port_from } => self.ics.push(IcEntry {
                        comp_from: comp_from.clone(),
                        port_from: port_from.clone(),
                        comp_to: child_eic.comp_to.clone(),
                        port_to: child_eic.port_to.clone(),
                        coupling,
                    }),
                }
            }
        }

        // Right bridge: join each feed with the child's own EOCs from the matching port.
        for (target, target_shared, child_out_port, host) in &right_feeds {
            for child_eoc in child.eocs.iter().filter(|e| &e.port_to == child_out_port) {
                let coupling = Coupling {
                    to: target_shared.clone(),
                    from: child_eoc.coupling.from.clone(),
                    host: host.clone().or_else(|| child_eoc.coupling.host.clone()),
                };
                match target {
                    RightTarget::Ic { comp_to, port_to } => self.ics.push(IcEntry {
                        comp_from: child_eoc.comp_from.clone(),
                        port_from: child_eoc.port_from.clone(),
                        comp_to: comp_to.clone(),
                        port_to: port_to.clone(),
                        coupling,
                    }),
                    RightTarget::Eoc { port_to } => self.eocs.push(EocEntry {
                        comp_from: child_eoc.comp_from.clone(),
                        port_from: child_eoc.port_from.clone(),
                        port_to: port_to.clone(),
                        coupling,
                    }),
                }
            }
        }

        self.components.extend(std::mem::take(&mut child.components));
    }

    fn rebuild_comps_map(&mut self) {
        self.comps_map = self
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| (c.get_name().to_string(), i))
            .collect();
    }

    /// Collects the names of every child atomic and non-empty port imminent in the
    /// cycle that just ran at `t`, plus the coupled model's own used ports, for
    /// transducer triggering (spec.md §4.9). Must run after `transition`, before
    /// `clear_ports`.
    pub(crate) fn imminent(&self, t: f64, out: &mut std::collections::HashSet<String>) {
        for c in &self.components {
            c.imminent(t, out);
        }
        // Safety: called after this cycle's transition, before clear_ports.
        unsafe {
            for name in self.component.used_in_ports() {
                out.insert(format!("{}.{}", self.get_name(), name));
            }
            for name in self.component.used_out_ports() {
                out.insert(format!("{}.{}", self.get_name(), name));
            }
        }
    }
}

impl Simulator for Coupled {
    fn get_component(&self) -> &Component {
        Coupled::get_component(self)
    }

    fn get_component_mut(&mut self) -> &mut Component {
        Coupled::get_component_mut(self)
    }

    fn start(&mut self, t_start: f64) -> f64 {
        Coupled::start(self, t_start)
    }

    fn stop(&mut self, t_stop: f64) {
        Coupled::stop(self, t_stop)
    }

    fn collection(&mut self, t: f64) {
        Coupled::collection(self, t)
    }

    fn transition(&mut self, t: f64) -> f64 {
        Coupled::transition(self, t)
    }

    fn clear_ports(&mut self) {
        Coupled::clear_ports(self)
    }

    fn imminent(&self, t: f64, out: &mut std::collections::HashSet<String>) {
        Coupled::imminent(self, t, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_atomic;
    use crate::modeling::Atomic;

    #[derive(Debug)]
    struct Passthrough {
        component: Component,
        input: InPort<i32>,
        output: OutPort<i32>,
    }

    impl Passthrough {
        fn new(name: &str) -> Self {
            let mut component = Component::new(name);
            let input = component.add_in_port("in");
            let output = component.add_out_port("out");
            Self {
                component,
                input,
                output,
            }
        }
    }

    impl Atomic for Passthrough {
        fn get_component(&self) -> &Component {
            &self.component
        }
        fn get_component_mut(&mut self) -> &mut Component {
            &mut self.component
        }
        fn lambda(&self) {
            for v in unsafe { self.input.get_values() } {
                unsafe { self.output.add_value(*v) };
            }
        }
        fn delta_int(&mut self) {}
        fn delta_ext(&mut self, _e: f64) {}
        fn ta(&self) -> f64 {
            f64::INFINITY
        }
    }

    impl_atomic!(Passthrough);

    #[test]
    fn test_duplicate_component() {
        let mut top = Coupled::new("top");
        top.add_component(Box::new(Passthrough::new("a")));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut top = top;
            top.add_component(Box::new(Passthrough::new("a")));
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_eic_bad_component_to() {
        let mut top = Coupled::new("top");
        let _ = top.add_in_port::<i32>("in");
        top.add_component(Box::new(Passthrough::new("a")));
        let err = top.try_add_eic("in", "missing", "in").unwrap_err();
        assert!(matches!(err, StructuralError::UnknownComponent(_)));
    }

    #[test]
    fn test_eic_duplicate() {
        let mut top = Coupled::new("top");
        let _ = top.add_in_port::<i32>("in");
        top.add_component(Box::new(Passthrough::new("a")));
        top.add_eic("in", "a", "in");
        let err = top.try_add_eic("in", "a", "in").unwrap_err();
        assert!(matches!(err, StructuralError::DuplicateCoupling(_)));
    }

    #[test]
    fn test_flatten_bridges_eic_and_eoc() {
        let mut inner = Coupled::new("inner");
        let inner_in = inner.add_in_port::<i32>("in");
        let inner_out = inner.add_out_port::<i32>("out");
        inner.add_component(Box::new(Passthrough::new("leaf")));
        inner.add_eic("in", "leaf", "in");
        inner.add_eoc("leaf", "out", "out");
        let _ = (inner_in, inner_out);

        let mut top = Coupled::new("top");
        let _ = top.add_in_port::<i32>("in");
        let _ = top.add_out_port::<i32>("out");
        top.add_component(Box::new(inner));
        top.add_eic("in", "inner", "in");
        top.add_eoc("inner", "out", "out");

        let inlined = top.flatten();
        assert_eq!(inlined, 1);
        assert_eq!(top.n_components(), 1);
        assert_eq!(top.component_names().collect::<Vec<_>>(), vec!["leaf"]);
        assert_eq!(top.n_eics(), 1);
        assert_eq!(top.n_eocs(), 1);
        assert!(top.eics.iter().any(|e| e.comp_to == "leaf" && e.port_to == "in"));
        assert!(top.eocs.iter().any(|e| e.comp_from == "leaf" && e.port_from == "out"));
    }

    #[derive(Debug, Default)]
    struct RecordingHost(std::cell::RefCell<Vec<(String, Vec<String>)>>);

    impl crate::modeling::CouplingHost for RecordingHost {
        fn deliver(&self, port_to: &str, values: &[String]) {
            self.0.borrow_mut().push((port_to.to_string(), values.to_vec()));
        }
    }

    #[test]
    fn test_eoc_with_remote_host_bypasses_local_port() {
        let mut top = Coupled::new("top");
        let out = top.add_out_port::<i32>("out");
        let a = Passthrough::new("a");
        let a_output = a.output.clone();
        top.add_component(Box::new(a));
        let host = Shared::new(RecordingHost::default());
        top.try_add_eoc_remote("a", "out", "out", Box::new(RecordingHost::default()))
            .unwrap();
        // Swap in our own handle to the same host so we can inspect it after the fact;
        // try_add_eoc_remote already boxed an equivalent one above for the real coupling.
        top.eocs.last_mut().unwrap().coupling.host = Some(host.clone());

        // Safety: test drives lambda directly, as the atomic model's own collection
        // step would.
        unsafe { a_output.add_value(7) };
        top.collection(0.);

        assert_eq!(host.0.borrow().len(), 1);
        assert_eq!(host.0.borrow()[0].0, "out");
        assert_eq!(host.0.borrow()[0].1, vec!["7".to_string()]);
        // The local output port must stay empty: the host intercepted delivery.
        assert!(unsafe { out.0.is_empty() });
    }
}
