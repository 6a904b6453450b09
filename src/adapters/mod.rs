// Adapters - External system implementations

pub mod events;
pub mod fs_local;
pub mod process_tokio;
pub mod tool_discovery;
pub mod toml_config;

// Re-export adapters
pub use events::{ChannelEventAdapter, FanOutEventAdapter, TracingEventAdapter};
pub use fs_local::LocalFsAdapter;
pub use process_tokio::TokioProcessAdapter;
pub use tool_discovery::{Tool, ToolLocator, ToolPaths};
pub use toml_config::{AppConfig, TomlConfigAdapter};
