//! Observation surface (spec.md §4.9): a [`Transducer`] attaches to a set of target
//! atomic components and/or ports, and emits one flat [`Record`] per target on every
//! `trigger`. The kernel drives the `initialize -> trigger(t) x N -> exit` lifecycle;
//! concrete logging backends (CSV, time series databases, …) are out of scope for this
//! crate and are built on top of [`Transducer::records`] (spec.md §1).
//!
//! Rust has no runtime reflection, so "user-declared extra fields, each with a getter"
//! (spec.md §4.9) are modeled as [`Field`] closures the caller supplies at
//! construction time, typically closing over an `Rc<RefCell<_>>` shared with the
//! atomic model being observed.

use std::collections::HashSet;
use std::fmt::Debug;

/// Value of one field in a transducer [`Record`].
///
/// Any getter whose natural type is not one of the numeric/boolean variants should
/// return [`FieldValue::Text`] (spec.md §4.9: "values whose type is outside the
/// transducer's supported-type set are coerced to text").
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Null,
}

impl FieldValue {
    /// Substitutes NaN/infinite floats with [`FieldValue::Null`] (spec.md §4.9's
    /// optional sanitization pass).
    fn sanitized(self) -> Self {
        match self {
            FieldValue::Float(v) if !v.is_finite() => FieldValue::Null,
            other => other,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// One flat observation: an ordered list of `(field_name, value)` pairs, always
/// starting with the mandatory simulation-time field and the target's name.
#[derive(Debug, Clone, Default)]
pub struct Record(Vec<(String, FieldValue)>);

impl Record {
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Whether a trigger emits a record for every target regardless of activity, or only
/// for the components/ports that were imminent in the cycle just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    Exhaustive,
    Incremental,
}

/// One user-declared extra field: a name plus a getter re-evaluated on every trigger.
pub struct Field {
    name: String,
    getter: Box<dyn Fn() -> FieldValue>,
}

impl Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

impl Field {
    pub fn new(name: impl Into<String>, getter: impl Fn() -> FieldValue + 'static) -> Self {
        Self {
            name: name.into(),
            getter: Box::new(getter),
        }
    }
}

/// One observation target: the name of a component (state sampling) or a
/// `"component.port"` pair (event sampling), plus the extra fields read from it.
#[derive(Debug)]
pub struct Target {
    name: String,
    fields: Vec<Field>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Observation plugin attaching to atomic components and/or ports. Core lifecycle:
/// `initialize -> trigger(t) x N -> exit`, driven by the root coordinator once per
/// cycle (spec.md §4.9). Holds its own `Vec<Record>`; a real deployment drains
/// [`Transducer::records`] into a logging backend (out of scope here).
#[derive(Debug)]
pub struct Transducer {
    name: String,
    mode: TriggerMode,
    sanitize: bool,
    targets: Vec<Target>,
    records: Vec<Record>,
}

impl Transducer {
    pub fn new(name: impl Into<String>, mode: TriggerMode) -> Self {
        Self {
            name: name.into(),
            mode,
            sanitize: true,
            targets: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Disables NaN/infinite sanitization (enabled by default).
    pub fn without_sanitize(mut self) -> Self {
        self.sanitize = false;
        self
    }

    pub fn add_target(&mut self, target: Target) {
        self.targets.push(target);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn initialize(&mut self) {
        tracing::info!(transducer = %self.name, "transducer initialized");
    }

    pub fn exit(&mut self) {
        tracing::info!(transducer = %self.name, records = self.records.len(), "transducer exit");
    }

    /// Called by the kernel after every cycle's delta phase, before ports are cleared.
    /// `imminent` names every component and port that was imminent in the cycle that
    /// just ran at `t` (see [`crate::simulation::Simulator::imminent`]).
    pub fn trigger(&mut self, t: f64, imminent: &HashSet<String>) {
        for target in &self.targets {
            if self.mode == TriggerMode::Incremental && !imminent.contains(&target.name) {
                continue;
            }
            let mut fields = vec![
                ("t".to_string(), FieldValue::Float(t)),
                ("name".to_string(), FieldValue::Text(target.name.clone())),
            ];
            for field in &target.fields {
                let mut value = (field.getter)();
                if self.sanitize {
                    value = value.sanitized();
                }
                fields.push((field.name.clone(), value));
            }
            self.records.push(Record(fields));
        }
    }
}
