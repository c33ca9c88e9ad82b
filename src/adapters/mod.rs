// Adapters - External system implementations

pub mod exec_libav;
pub mod fs_delivery;
pub mod toml_config;
pub mod tracing_notify;

// Re-export adapters
pub use exec_libav::LibavEngineAdapter;
pub use fs_delivery::FsDeliveryAdapter;
pub use toml_config::{SplitterConfig, TomlConfigAdapter};
pub use tracing_notify::TracingNotifier;
