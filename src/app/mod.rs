// Application layer - Session and processor interactors

pub mod container;
pub mod processor;
pub mod session;

// Re-export interactors
pub use processor::SegmentProcessor;
pub use session::SplitSession;
