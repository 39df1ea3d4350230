//! Batch output: directory layout and JSON Lines sinks

mod layout;
mod sink;

pub use layout::BatchLayout;
pub use sink::{BatchRecordSink, JsonlFileSink};
