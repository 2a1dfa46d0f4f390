//! Global plugin registries for building models and real-time handlers by name,
//! grounded on the Python original's `xdevs/rt_sim/input_handler.py` and
//! `output_handler.py` plugin-by-name lookup.
//!
//! Each registry is a `Mutex`-guarded map behind a `OnceLock`, populated by
//! `register_*` calls (typically from a `fn main` or a lazy-static-style call at
//! startup) and consulted by [`crate::model_doc`] when it resolves a document's
//! component leaves to concrete types.

use crate::error::StructuralError;
use crate::transducer::Transducer;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Builds one named [`Transducer`] instance. Feature-independent: unlike component
/// and coupled factories, transducers don't need a structured document to configure,
/// since their targets are closures declared in code.
pub type TransducerFactory = Box<dyn Fn(&str) -> Transducer + Send + Sync>;

fn transducer_registry() -> &'static Mutex<HashMap<String, TransducerFactory>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, TransducerFactory>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Registers a transducer factory under `name`. Fails if `name` is already taken.
pub fn register_transducer(name: &str, factory: TransducerFactory) -> Result<(), StructuralError> {
    let mut registry = transducer_registry().lock().unwrap();
    if registry.contains_key(name) {
        return Err(StructuralError::DuplicatePlugin(name.to_string()));
    }
    registry.insert(name.to_string(), factory);
    Ok(())
}

/// Builds a transducer previously registered under `type_name`, naming the instance
/// `instance_name`.
pub fn build_transducer(type_name: &str, instance_name: &str) -> Result<Transducer, StructuralError> {
    let registry = transducer_registry().lock().unwrap();
    let factory = registry
        .get(type_name)
        .ok_or_else(|| StructuralError::UnknownPlugin(type_name.to_string()))?;
    Ok(factory(instance_name))
}

#[cfg(feature = "rt")]
mod handlers {
    use super::*;
    use crate::rt::{InputHandler, OutputHandler};

    /// Builds a boxed input handler from a name and a free-form string configuration
    /// (e.g. a socket address, a file path).
    pub type InputHandlerFactory =
        Box<dyn Fn(&str, &HashMap<String, String>) -> Box<dyn InputHandler> + Send + Sync>;

    /// Builds a boxed output handler from a name and configuration.
    pub type OutputHandlerFactory =
        Box<dyn Fn(&str, &HashMap<String, String>) -> Box<dyn OutputHandler> + Send + Sync>;

    fn input_handler_registry() -> &'static Mutex<HashMap<String, InputHandlerFactory>> {
        static REGISTRY: OnceLock<Mutex<HashMap<String, InputHandlerFactory>>> = OnceLock::new();
        REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn output_handler_registry() -> &'static Mutex<HashMap<String, OutputHandlerFactory>> {
        static REGISTRY: OnceLock<Mutex<HashMap<String, OutputHandlerFactory>>> = OnceLock::new();
        REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
    }

    /// Registers an input handler factory under `name`. Fails if `name` is already
    /// taken.
    pub fn register_input_handler(name: &str, factory: InputHandlerFactory) -> Result<(), StructuralError> {
        let mut registry = input_handler_registry().lock().unwrap();
        if registry.contains_key(name) {
            return Err(StructuralError::DuplicatePlugin(name.to_string()));
        }
        registry.insert(name.to_string(), factory);
        Ok(())
    }

    /// Registers an output handler factory under `name`. Fails if `name` is already
    /// taken.
    pub fn register_output_handler(name: &str, factory: OutputHandlerFactory) -> Result<(), StructuralError> {
        let mut registry = output_handler_registry().lock().unwrap();
        if registry.contains_key(name) {
            return Err(StructuralError::DuplicatePlugin(name.to_string()));
        }
        registry.insert(name.to_string(), factory);
        Ok(())
    }

    /// Instantiates an input handler previously registered under `type_name`.
    pub fn build_input_handler(
        type_name: &str,
        config: &HashMap<String, String>,
    ) -> Result<Box<dyn InputHandler>, StructuralError> {
        let registry = input_handler_registry().lock().unwrap();
        let factory = registry
            .get(type_name)
            .ok_or_else(|| StructuralError::UnknownPlugin(type_name.to_string()))?;
        Ok(factory(type_name, config))
    }

    /// Instantiates an output handler previously registered under `type_name`.
    pub fn build_output_handler(
        type_name: &str,
        config: &HashMap<String, String>,
    ) -> Result<Box<dyn OutputHandler>, StructuralError> {
        let registry = output_handler_registry().lock().unwrap();
        let factory = registry
            .get(type_name)
            .ok_or_else(|| StructuralError::UnknownPlugin(type_name.to_string()))?;
        Ok(factory(type_name, config))
    }
}

#[cfg(feature = "rt")]
pub use handlers::*;

#[cfg(feature = "dmt")]
mod documents {
    use super::*;
    use crate::modeling::Coupled;
    use crate::simulation::Simulator;

    /// Builds one atomic model instance from a name and a free-form JSON
    /// configuration value (see [`crate::model_doc`]). Returns a boxed [`Simulator`]
    /// so the registry can host atomic factories of arbitrary concrete types behind
    /// one interface.
    pub type ComponentFactory = Box<dyn Fn(&str, &serde_json::Value) -> Box<dyn Simulator> + Send + Sync>;

    /// Builds a coupled model used as a reusable block (e.g. a library experimental
    /// frame) from a name and configuration.
    pub type CoupledFactory = Box<dyn Fn(&str, &serde_json::Value) -> Coupled + Send + Sync>;

    fn component_registry() -> &'static Mutex<HashMap<String, ComponentFactory>> {
        static REGISTRY: OnceLock<Mutex<HashMap<String, ComponentFactory>>> = OnceLock::new();
        REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn coupled_registry() -> &'static Mutex<HashMap<String, CoupledFactory>> {
        static REGISTRY: OnceLock<Mutex<HashMap<String, CoupledFactory>>> = OnceLock::new();
        REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
    }

    /// Registers an atomic-model factory under `name`. Fails if `name` is already
    /// taken.
    pub fn register_component(name: &str, factory: ComponentFactory) -> Result<(), StructuralError> {
        let mut registry = component_registry().lock().unwrap();
        if registry.contains_key(name) {
            return Err(StructuralError::DuplicatePlugin(name.to_string()));
        }
        registry.insert(name.to_string(), factory);
        Ok(())
    }

    /// Registers a reusable coupled-model factory under `name`. Fails if `name` is
    /// already taken.
    pub fn register_coupled(name: &str, factory: CoupledFactory) -> Result<(), StructuralError> {
        let mut registry = coupled_registry().lock().unwrap();
        if registry.contains_key(name) {
            return Err(StructuralError::DuplicatePlugin(name.to_string()));
        }
        registry.insert(name.to_string(), factory);
        Ok(())
    }

    /// Instantiates an atomic model previously registered under `type_name`.
    pub fn build_component(
        type_name: &str,
        instance_name: &str,
        config: &serde_json::Value,
    ) -> Result<Box<dyn Simulator>, StructuralError> {
        let registry = component_registry().lock().unwrap();
        let factory = registry
            .get(type_name)
            .ok_or_else(|| StructuralError::UnknownPlugin(type_name.to_string()))?;
        Ok(factory(instance_name, config))
    }

    /// Instantiates a coupled model previously registered under `type_name`.
    pub fn build_coupled(
        type_name: &str,
        instance_name: &str,
        config: &serde_json::Value,
    ) -> Result<Coupled, StructuralError> {
        let registry = coupled_registry().lock().unwrap();
        let factory = registry
            .get(type_name)
            .ok_or_else(|| StructuralError::UnknownPlugin(type_name.to_string()))?;
        Ok(factory(instance_name, config))
    }
}

#[cfg(feature = "dmt")]
pub use documents::*;
