pub mod processor;

pub use processor::StreamProcessor;
