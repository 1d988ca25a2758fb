pub mod emitter;
pub mod ports;
pub mod recorder;
pub mod tracker;
pub mod watch;
