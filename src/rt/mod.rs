//! Wall-clock-paced simulation, gated behind the `rt` feature.
//!
//! Generalizes the teacher's two real-time drivers (`simulation/real_time.rs`'s plain
//! `std::thread::sleep` loop and `simulation/rt.rs`'s tokio-based handler runtime) into
//! a single `std::thread` + `std::sync::mpsc` driver: [`RealTimeCoordinator`] paces
//! transitions to wall-clock time, optionally injecting external events produced by
//! [`InputHandler`] threads and propagating output to [`OutputHandler`] threads.

mod coordinator;
mod input;
mod output;

pub use coordinator::{InputHandler, OutputHandler, RealTimeConfig, RealTimeCoordinator};
pub use input::InputSender;
pub use output::OutputReceiver;
