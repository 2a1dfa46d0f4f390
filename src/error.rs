//! Error taxonomy for the parts of the kernel that surface failures to a caller
//! instead of treating them as programmer error (panics on the builder API stay
//! panics, matching [`crate::modeling::Coupled`]'s `add_*` methods).

use thiserror::Error;

/// Structural errors raised while assembling a model: duplicate names, dangling
/// references, incompatible port types, and unknown plugin names.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("component `{0}` already exists in this coupled model")]
    DuplicateComponent(String),
    #[error("input port `{0}` already exists on this component")]
    DuplicateInPort(String),
    #[error("output port `{0}` already exists on this component")]
    DuplicateOutPort(String),
    #[error("unknown component `{0}`")]
    UnknownComponent(String),
    #[error("unknown input port `{0}` on component `{1}`")]
    UnknownInPort(String, String),
    #[error("unknown output port `{0}` on component `{1}`")]
    UnknownOutPort(String, String),
    #[error("coupling {0} is already defined")]
    DuplicateCoupling(String),
    #[error("ports are not type-compatible")]
    TypeMismatch,
    #[error("unknown plugin `{0}`")]
    UnknownPlugin(String),
    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),
    #[error("missing configuration field `{0}`")]
    MissingConfig(&'static str),
    #[error("connection {0} names no component on either side")]
    InvalidCoupling(String),
}

/// Runtime port errors: malformed values arriving through an external injection path.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("value `{value}` is not valid for port `{port}`")]
    TypeMismatch { port: String, value: String },
    #[error("unknown port `{0}`")]
    UnknownPort(String),
}

/// Raised when an injected event's elapsed time falls outside `[time_last, time_next]`
/// of the target model; the event is rejected rather than applied.
#[derive(Debug, Error)]
#[error("injection at time {time} rejected: outside [{time_last}, {time_next}]")]
pub struct InjectionRejected {
    pub time: f64,
    pub time_last: f64,
    pub time_next: f64,
}

/// Fatal real-time errors. Both variants are meant to unwind the whole simulation:
/// a misconfigured manager cannot run at all, and excess jitter means the wall-clock
/// guarantee the caller asked for can no longer be honored.
#[derive(Debug, Error)]
pub enum RealTimeError {
    #[error("wall-clock jitter of {jitter:?} exceeds the configured maximum of {max:?}")]
    JitterExceeded {
        jitter: std::time::Duration,
        max: std::time::Duration,
    },
    #[error("invalid real-time configuration: {0}")]
    InvalidConfig(&'static str),
}
