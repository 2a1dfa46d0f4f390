use crate::DynRef;
use std::any::Any;
use std::cell::UnsafeCell;
use std::fmt::Debug;

#[cfg(not(feature = "par_any"))]
use std::rc::Rc;
#[cfg(feature = "par_any")]
use std::sync::Arc;

#[cfg(not(feature = "par_any"))]
pub(crate) type Shared<T> = Rc<T>;
#[cfg(feature = "par_any")]
pub(crate) type Shared<T> = Arc<T>;

/// Marker trait for the values a port may carry.
///
/// Every value type circulating through ports must be `'static` (ports are stored
/// behind a type-erased trait object and recovered via [`Any`]), [`Clone`] (couplings
/// copy values from a sending bag into every receiving bag), and [`Debug`] (for
/// diagnostics in logs and panics). Under `par_any`/`rt`, components may cross thread
/// boundaries, so the bound tightens to `Send + Sync` as well. Under `rt`, values must
/// additionally round-trip through text, since the real-time driver injects and ejects
/// events as strings.
#[cfg(not(feature = "rt"))]
pub trait PortVal: DynRef + Clone + Debug {}
#[cfg(not(feature = "rt"))]
impl<T: DynRef + Clone + Debug> PortVal for T {}

#[cfg(feature = "rt")]
pub trait PortVal: DynRef + Clone + Debug + std::str::FromStr + std::fmt::Display {}
#[cfg(feature = "rt")]
impl<T: DynRef + Clone + Debug + std::str::FromStr + std::fmt::Display> PortVal for T {}

/// Type-erased interface implemented by every port bag, regardless of its value type
/// or direction. Lets [`super::Component`] and [`super::Coupled`] store heterogeneous
/// ports in a single collection and drive them without knowing `T`.
pub(crate) trait Port: DynRef {
    /// Port-to-any conversion, used to recover the concrete [`Bag<T>`] when propagating.
    fn as_any(&self) -> &dyn Any;

    /// Returns `true` if the port does not contain any value.
    ///
    /// # Safety
    ///
    /// The caller must only call this while implementing [`super::Atomic::delta_ext`]/
    /// [`super::Atomic::delta_con`], or while the owning [`super::Coupled`]/[`super::Component`]
    /// is driving a simulation cycle.
    unsafe fn is_empty(&self) -> bool;

    /// Clears all the values in the port.
    ///
    /// # Safety
    ///
    /// The caller must only call this once per simulation cycle, after every reader of
    /// this cycle's values (transducers included) has already observed them.
    unsafe fn clear(&self);

    /// Returns `true` if `other` carries the same value type as `self`.
    fn is_compatible(&self, other: &dyn Port) -> bool;

    /// Creates a fresh, empty bag of the same concrete value type as `self`, without
    /// requiring the caller to name that type. Used to synthesize a port whose type
    /// is only known dynamically (spec.md §6: a document-loaded coupling "synthesizes"
    /// a missing boundary port "with the sink port's element type").
    fn new_like(&self) -> Shared<dyn Port>;

    /// Copies every value currently in `self` onto `port_to`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that it fulfills all the following invariants:
    /// - The caller is a [`super::Coupled`] model propagating messages along one of its
    ///   couplings.
    /// - `port_to` is compatible with `self` (see [`Port::is_compatible`]).
    unsafe fn propagate(&self, port_to: &dyn Port);

    /// Renders every value currently in `self` through its `Debug` representation, for
    /// delivery through a [`CouplingHost`] instead of linking port bags directly
    /// (spec.md §3: "a coupling's host is an optional external endpoint...propagation
    /// serializes values and delegates delivery to that endpoint").
    ///
    /// # Safety
    ///
    /// Same invariants as [`Port::propagate`].
    unsafe fn peek_repr(&self) -> Vec<String>;

    /// Parses a textual representation of a value and pushes it onto the port.
    /// Returns `Err` if the string cannot be parsed into the port's value type.
    ///
    /// # Safety
    ///
    /// The caller must ensure the port belongs to the top-level model of a
    /// [`crate::rt::RealTimeCoordinator`] and that injection happens between cycles.
    #[cfg(feature = "rt")]
    unsafe fn inject(&self, value: &str) -> Result<(), ()>;

    /// Drains every value currently in the port, returning its textual representation.
    ///
    /// # Safety
    ///
    /// Same invariants as [`Port::clear`]: this must run at most once per cycle, and
    /// after all other readers have observed the values.
    #[cfg(feature = "rt")]
    unsafe fn eject(&self) -> Vec<String>;
}

/// Bag of DEVS messages. A thin [`UnsafeCell`] wrapper: every access is gated behind
/// one of the `unsafe` methods above, whose preconditions are established by the
/// simulation cycle, never by the type system.
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct Bag<T>(UnsafeCell<Vec<T>>);

impl<T> Bag<T> {
    #[inline]
    fn new() -> Shared<Self> {
        Shared::new(Self(UnsafeCell::new(Vec::new())))
    }

    #[inline(always)]
    unsafe fn borrow(&self) -> &Vec<T> {
        &*self.0.get()
    }

    #[allow(clippy::mut_from_ref)]
    #[inline(always)]
    unsafe fn borrow_mut(&self) -> &mut Vec<T> {
        &mut *self.0.get()
    }
}

#[cfg(feature = "par_any")]
// Safety: exclusive access to a bag's contents is always mediated by the cycle
// invariants documented on `Port`'s unsafe methods, never by aliasing `&mut`.
unsafe impl<T: Send> Send for Bag<T> {}
#[cfg(feature = "par_any")]
// Safety: see the `Send` impl above; shared references never race once the cycle
// invariants are respected.
unsafe impl<T: Sync> Sync for Bag<T> {}

impl<T: PortVal> Port for Bag<T> {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    unsafe fn is_empty(&self) -> bool {
        self.borrow().is_empty()
    }

    #[inline]
    unsafe fn clear(&self) {
        self.borrow_mut().clear();
    }

    #[inline]
    fn is_compatible(&self, other: &dyn Port) -> bool {
        other.as_any().downcast_ref::<Bag<T>>().is_some()
    }

    #[inline]
    fn new_like(&self) -> Shared<dyn Port> {
        Bag::<T>::new()
    }

    #[inline]
    unsafe fn propagate(&self, port_to: &dyn Port) {
        let port_to = port_to
            .as_any()
            .downcast_ref::<Bag<T>>()
            .expect("propagate called between incompatible ports");
        port_to.borrow_mut().extend_from_slice(self.borrow());
    }

    #[inline]
    unsafe fn peek_repr(&self) -> Vec<String> {
        self.borrow().iter().map(|v| format!("{v:?}")).collect()
    }

    #[cfg(feature = "rt")]
    unsafe fn inject(&self, value: &str) -> Result<(), ()> {
        let value: T = value.parse().map_err(|_| ())?;
        self.borrow_mut().push(value);
        Ok(())
    }

    #[cfg(feature = "rt")]
    unsafe fn eject(&self) -> Vec<String> {
        std::mem::take(self.borrow_mut())
            .iter()
            .map(|v| v.to_string())
            .collect()
    }
}

/// Input port. Allows only reading messages: nothing can inject through an `InPort`
/// other than the owning [`super::Coupled`] via coupling propagation.
#[derive(Debug)]
pub struct InPort<T>(pub(super) Shared<Bag<T>>);

impl<T: PortVal> InPort<T> {
    /// Returns `true` if the underlying bag is empty.
    ///
    /// # Safety
    ///
    /// The caller must ensure that it fulfills all the following invariants:
    /// - The caller implements the [`super::Atomic`] trait.
    /// - This port is an input port of the caller.
    /// - The caller is inside [`super::Atomic::delta_ext`] or [`super::Atomic::delta_con`].
    #[inline(always)]
    pub unsafe fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a reference to the slice of messages currently in the bag.
    ///
    /// # Safety
    ///
    /// Same invariants as [`InPort::is_empty`].
    #[inline(always)]
    pub unsafe fn get_values(&self) -> &Vec<T> {
        self.0.borrow()
    }

    /// Pushes an external value directly onto this port, bypassing coupling
    /// propagation.
    ///
    /// # Safety
    ///
    /// The caller must ensure this port belongs to the top-level model of a
    /// [`crate::simulation::RootCoordinator::inject`] or
    /// [`crate::rt::RealTimeCoordinator`] call, and that the push happens between
    /// simulation cycles.
    #[inline(always)]
    pub unsafe fn push_external(&self, value: T) {
        self.0.borrow_mut().push(value);
    }
}

impl<T> Clone for InPort<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Output port. Allows only injecting messages: a model cannot read back what it has
/// written to its own output port within the same cycle.
#[derive(Debug)]
pub struct OutPort<T: Clone>(pub(super) Shared<Bag<T>>);

impl<T: PortVal> OutPort<T> {
    /// Adds a new value to the output port.
    ///
    /// # Safety
    ///
    /// The caller must ensure that it fulfills all the following invariants:
    /// - The caller implements the [`super::Atomic`] trait.
    /// - This port is an output port of the caller.
    /// - The caller is inside [`super::Atomic::lambda`].
    #[inline(always)]
    pub unsafe fn add_value(&self, value: T) {
        self.0.borrow_mut().push(value);
    }

    /// Adds new values from a slice to the output port.
    ///
    /// # Safety
    ///
    /// Same invariants as [`OutPort::add_value`].
    #[inline(always)]
    pub unsafe fn add_values(&self, values: &[T]) {
        self.0.borrow_mut().extend_from_slice(values);
    }
}

impl<T: Clone> Clone for OutPort<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

pub(super) fn new_bag<T>() -> Shared<Bag<T>> {
    Bag::new()
}

/// Delegate for a coupling whose sink lives outside this process (spec.md §3: "a
/// coupling's host is an optional external endpoint"). Concrete transports (a TCP
/// bridge, an MQTT topic, shared memory across a process boundary, ...) are out of
/// scope for this crate (spec.md §1); this trait is the interface boundary such a
/// transport plugs into. When a coupling carries a host, [`super::Coupled`]
/// propagation calls [`CouplingHost::deliver`] instead of linking the sending and
/// receiving port bags together.
pub trait CouplingHost: Debug + DynRef {
    /// Delivers this cycle's values, already rendered to their `Debug` form by
    /// [`Port::peek_repr`], to `port_to` on the remote endpoint.
    fn deliver(&self, port_to: &str, values: &[String]);
}

impl Debug for dyn CouplingHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<coupling host>")
    }
}
