use crate::http::{run_http_server, AppState, HttpServerConfig};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The measurement HTTP API packaged for the runner
pub struct MeasurementsApi {
    state: AppState,
    config: HttpServerConfig,
}

impl MeasurementsApi {
    pub fn new(state: AppState, config: HttpServerConfig) -> Self {
        debug!("Initializing measurements API module");
        Self { state, config }
    }

    pub fn into_runner_process(
        self,
    ) -> impl FnOnce(
        CancellationToken,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
    > {
        move |ctx| Box::pin(async move { run_http_server(self.config, self.state, ctx).await })
    }
}
