use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

use crate::auth::{CredentialStore, SessionStore};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::server::routes::build_router;
use crate::storage::Root;

const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

/// State shared by every request handler
pub struct AppState {
    pub config: ServerConfig,
    pub root: Root,
    pub sessions: SessionStore,
    pub credentials: CredentialStore,
}

impl AppState {
    /// Creates the server root if needed and pins it to its canonical path.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        std::fs::create_dir_all(config.server_root_path())?;
        let root = Root::new(config.server_root_path())?;
        info!("Server root directory: {}", root.as_path().display());

        let sessions = match config.session_ttl() {
            Some(ttl) => SessionStore::with_ttl(ttl),
            None => SessionStore::new(),
        };
        let credentials = CredentialStore::new(config.users.clone());

        Ok(Self {
            config,
            root,
            sessions,
            credentials,
        })
    }
}

pub struct Server {
    state: Arc<AppState>,
    listener: TcpListener,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = Arc::new(AppState::new(config)?);
        let socket = state.config.socket_address();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(ServerError::IoError(e));
            }
        };

        Ok(Self { state, listener })
    }

    /// Serves requests until Ctrl-C or SIGTERM.
    pub async fn start(self) -> Result<(), ServerError> {
        info!(
            "Starting file manager on {} ({} users configured)",
            self.state.config.socket_address(),
            self.state.credentials.user_count()
        );

        if self.state.sessions.ttl().is_some() {
            spawn_session_pruner(Arc::clone(&self.state));
        }

        let app = build_router(Arc::clone(&self.state));
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("File manager shut down");
        Ok(())
    }
}

fn spawn_session_pruner(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = state.sessions.prune_expired().await;
            if removed > 0 {
                info!("Pruned {} expired sessions", removed);
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
