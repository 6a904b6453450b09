// Application layer - Use case interactors and the session object

pub mod container;
pub mod export_interactor;
pub mod fetch_interactor;
pub mod probe_interactor;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use export_interactor::ExportInteractor;
pub use fetch_interactor::FetchInteractor;
pub use probe_interactor::ProbeInteractor;
pub use session::{ClipSession, LoadedSource, QueueFile, QueueFileItem, QueueItem};
