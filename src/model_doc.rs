//! In-memory document-model-tree loader, gated behind the `dmt` feature and
//! grounded on the teacher's `xdevs_utils::dmt` crate: a serializable tree of
//! components and couplings that gets turned into live [`Coupled`]/[`Simulator`]
//! objects rather than just validated.
//!
//! A [`ModelDoc`] node is either a leaf, naming a component type registered in
//! [`crate::registry`] plus its JSON configuration, or a branch, listing child
//! nodes by name and the couplings between them. [`build`] walks the tree bottom
//! up, resolving leaves through the registry and wiring couplings with
//! [`Coupled::try_add_eic`]/[`try_add_ic`](Coupled::try_add_ic)/[`try_add_eoc`](Coupled::try_add_eoc),
//! classified the same way the teacher's `dmt::Coupling::get_type` does: which
//! side names a component decides EIC, IC, or EOC.

use crate::error::StructuralError;
use crate::modeling::Coupled;
use crate::registry;
use crate::simulation::Simulator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One coupling entry in a [`ModelDoc`]. `component_from`/`component_to` being
/// `None` marks the boundary of the enclosing coupled model (an EIC source or an
/// EOC destination), exactly as in the teacher's `dmt::Coupling`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDoc {
    #[serde(default)]
    pub component_from: Option<String>,
    pub port_from: String,
    #[serde(default)]
    pub component_to: Option<String>,
    pub port_to: String,
}

/// One node of a document model tree: either a leaf (`type_name` set, no
/// `components`) resolved through the component registry, or a branch composed of
/// named child nodes and the couplings between them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelDoc {
    /// External input port names, declared as `String`-valued ports since a
    /// document has no way to name a Rust type for them.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// External output port names.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub components: HashMap<String, ModelDoc>,
    #[serde(default)]
    pub couplings: Vec<ConnectionDoc>,
    /// Registered component type this leaf resolves to. Ignored on branch nodes.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Configuration handed to the registered factory. Ignored on branch nodes.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl ModelDoc {
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    fn is_leaf(&self) -> bool {
        self.components.is_empty()
    }
}

/// Builds a live model from a document tree, naming the root `name`.
pub fn build(name: &str, doc: &ModelDoc) -> Result<Box<dyn Simulator>, StructuralError> {
    if doc.is_leaf() {
        let type_name = doc
            .type_name
            .as_deref()
            .ok_or(StructuralError::MissingConfig("type_name"))?;
        return registry::build_component(type_name, name, &doc.config);
    }

    let mut coupled = Coupled::new(name);
    for input in &doc.inputs {
        coupled.add_in_port::<String>(input);
    }
    for output in &doc.outputs {
        coupled.add_out_port::<String>(output);
    }
    for (child_name, child_doc) in &doc.components {
        coupled.add_component(build(child_name, child_doc)?);
    }
    for connection in &doc.couplings {
        wire(&mut coupled, connection)?;
    }
    Ok(Box::new(coupled))
}

fn wire(coupled: &mut Coupled, connection: &ConnectionDoc) -> Result<(), StructuralError> {
    match (&connection.component_from, &connection.component_to) {
        (None, Some(to)) => {
            // External input coupling: synthesize the parent's input port, typed like
            // the sink, if it wasn't declared up front (spec.md §6).
            let sink = coupled
                .child_in_port(to, &connection.port_to)
                .ok_or_else(|| StructuralError::UnknownInPort(connection.port_to.clone(), to.clone()))?;
            coupled.ensure_in_port(&connection.port_from, &sink);
            coupled.try_add_eic(&connection.port_from, to, &connection.port_to)
        }
        (Some(from), Some(to)) => {
            coupled.try_add_ic(from, &connection.port_from, to, &connection.port_to)
        }
        (Some(from), None) => {
            // External output coupling: synthesize the parent's output port, typed
            // like the source, if it wasn't declared up front (spec.md §6).
            let source = coupled
                .child_out_port(from, &connection.port_from)
                .ok_or_else(|| StructuralError::UnknownOutPort(connection.port_from.clone(), from.clone()))?;
            coupled.ensure_out_port(&connection.port_to, &source);
            coupled.try_add_eoc(from, &connection.port_from, &connection.port_to)
        }
        (None, None) => Err(StructuralError::InvalidCoupling(format!(
            "{}->{}",
            connection.port_from, connection.port_to
        ))),
    }
}
