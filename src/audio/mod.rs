pub mod curve;
pub mod sink;

pub use sink::{AudioSink, ProcessSink};
