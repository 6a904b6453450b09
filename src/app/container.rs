use std::sync::Arc;

use tracing::debug;

use crate::adapters::{AppConfig, LocalFsAdapter, TokioProcessAdapter, ToolPaths};
use crate::app::{
    export_interactor::ExportInteractor, fetch_interactor::FetchInteractor,
    probe_interactor::ProbeInteractor,
};
use crate::engine::FetchCommandBuilder;
use crate::ports::{EventPort, FsPort, ProcessPort};

pub trait AppContainer: Send + Sync {
    fn fetch_interactor(&self) -> Arc<FetchInteractor>;
    fn export_interactor(&self) -> Arc<ExportInteractor>;
    fn probe_interactor(&self) -> Arc<ProbeInteractor>;
    fn tools(&self) -> &ToolPaths;
}

pub struct DefaultAppContainer {
    tools: ToolPaths,
    fetch_interactor: Arc<FetchInteractor>,
    export_interactor: Arc<ExportInteractor>,
    probe_interactor: Arc<ProbeInteractor>,
}

impl DefaultAppContainer {
    /// Wire the real adapters; every interactor reports through `event_port`
    pub fn new(config: &AppConfig, event_port: Arc<dyn EventPort>) -> Self {
        let tools = ToolPaths::discover(&config.tools);
        debug!(?tools, "Resolved external tools");

        let process_port = Arc::new(TokioProcessAdapter::new());
        let fs_port = Arc::new(LocalFsAdapter::new());
        Self::with_ports(config, tools, process_port, fs_port, event_port)
    }

    pub fn with_ports(
        config: &AppConfig,
        tools: ToolPaths,
        process_port: Arc<dyn ProcessPort>,
        fs_port: Arc<dyn FsPort>,
        event_port: Arc<dyn EventPort>,
    ) -> Self {
        let kill_grace = config.fetch.kill_grace();

        let fetch_interactor = Arc::new(
            FetchInteractor::new(
                Arc::clone(&process_port),
                Arc::clone(&fs_port),
                Arc::clone(&event_port),
                tools.yt_dlp.clone(),
            )
            .with_command_builder(
                FetchCommandBuilder::new().with_socket_timeout(config.fetch.socket_timeout_secs),
            )
            .with_scratch_root(config.fetch.scratch_root.clone())
            .with_kill_grace(kill_grace),
        );

        let export_interactor = Arc::new(
            ExportInteractor::new(
                Arc::clone(&process_port),
                Arc::clone(&fs_port),
                Arc::clone(&event_port),
                tools.ffmpeg.clone(),
            )
            .with_job_timeout(config.export.timeout())
            .with_kill_grace(kill_grace),
        );

        let probe_interactor = Arc::new(ProbeInteractor::new(
            Arc::clone(&process_port),
            tools.ffprobe.clone(),
        ));

        Self {
            tools,
            fetch_interactor,
            export_interactor,
            probe_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn fetch_interactor(&self) -> Arc<FetchInteractor> {
        Arc::clone(&self.fetch_interactor)
    }

    fn export_interactor(&self) -> Arc<ExportInteractor> {
        Arc::clone(&self.export_interactor)
    }

    fn probe_interactor(&self) -> Arc<ProbeInteractor> {
        Arc::clone(&self.probe_interactor)
    }

    fn tools(&self) -> &ToolPaths {
        &self.tools
    }
}
