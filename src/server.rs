use crate::api::{self, ApiResponse, API_PREFIX};
use crate::config::ServerConfig;
use crate::error::{PanelError, Result};
use crate::utils;
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{lookup_host, TcpListener};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower::{limit::GlobalConcurrencyLimitLayer, ServiceExt};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Headers attached to every response, static or API
pub const SHARED_HEADERS: [(HeaderName, &str); 6] = [
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

const BANNER_RULE: &str = "============================================================";

#[derive(Clone)]
struct AppState {
    data_dir: PathBuf,
    static_files: ServeDir,
}

/// Build the application router.
///
/// Every request goes through one handler: `/api/` paths are answered by the
/// API dispatcher, everything else is served from the project root. The
/// shared headers are attached to all responses by a router-wide layer and
/// requests are processed one at a time.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        data_dir: config.data_dir(),
        static_files: ServeDir::new(config.project_root()),
    };

    Router::new()
        .fallback(handle_request)
        .with_state(state)
        .layer(middleware::map_response(attach_shared_headers))
        .layer(GlobalConcurrencyLimitLayer::new(1))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

async fn handle_request(State(state): State<AppState>, mut request: Request) -> Response {
    let method = request.method().clone();
    if method != Method::GET && method != Method::HEAD {
        tracing::debug!("Rejecting {method} {}", request.uri());
        return ApiResponse::error(
            StatusCode::NOT_IMPLEMENTED,
            format!("Unsupported method ('{method}')"),
        )
        .into_response();
    }

    let target = request
        .uri()
        .path_and_query()
        .map_or("/", |path| path.as_str())
        .to_owned();

    if request.uri().path().starts_with(API_PREFIX) {
        return api::dispatch(&target, &state.data_dir).into_response();
    }

    if target == "/" {
        *request.uri_mut() = Uri::from_static("/index.html");
    }

    match state.static_files.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

async fn attach_shared_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in SHARED_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}

/// Lifecycle of a control panel server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
}

fn set_state(state: &watch::Sender<ServerState>, next: ServerState) {
    let previous = state.send_replace(next);
    tracing::debug!("Server state {previous:?} -> {next:?}");
}

/// A configured server that has not bound its socket yet
pub struct Server {
    config: ServerConfig,
    cancel_token: CancellationToken,
    state: Arc<watch::Sender<ServerState>>,
}

impl Server {
    /// Create a server that shuts down when `cancel_token` is cancelled.
    #[must_use]
    pub fn new(config: ServerConfig, cancel_token: CancellationToken) -> Self {
        let (state, _) = watch::channel(ServerState::Created);
        Self {
            config,
            cancel_token,
            state: Arc::new(state),
        }
    }

    #[must_use]
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions, including those after [`Server::bind`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Bind the listening socket and announce the server.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::PortInUse` if the port is taken, or
    /// `PanelError::Bind` for any other bind failure. The server never reaches
    /// `Running` in either case.
    pub async fn bind(self) -> Result<RunningServer> {
        set_state(&self.state, ServerState::Starting);

        let listener = match bind_listener(&self.config).await {
            Ok(listener) => listener,
            Err(e) => {
                set_state(&self.state, ServerState::Stopped);
                return Err(e);
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                set_state(&self.state, ServerState::Stopped);
                return Err(PanelError::Io(e));
            }
        };

        let running = RunningServer {
            config: self.config,
            cancel_token: self.cancel_token,
            state: self.state,
            listener,
            local_addr,
        };
        set_state(&running.state, ServerState::Running);
        running.announce();
        Ok(running)
    }
}

async fn bind_listener(config: &ServerConfig) -> Result<TcpListener> {
    let address = format!("{}:{}", config.host(), config.port());
    tracing::info!("Binding server to address: {address}");

    let resolved: Vec<SocketAddr> = lookup_host((config.host(), config.port()))
        .await
        .map_err(|source| PanelError::Bind {
            address: address.clone(),
            source,
        })?
        .collect();

    // Bind a single address, preferring IPv4, so a taken port is reported
    // instead of silently falling back to another address family.
    let Some(socket_addr) = resolved
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| resolved.first())
        .copied()
    else {
        return Err(PanelError::Bind {
            address,
            source: io::Error::new(io::ErrorKind::AddrNotAvailable, "host did not resolve"),
        });
    };

    TcpListener::bind(socket_addr).await.map_err(|source| {
        if source.kind() == io::ErrorKind::AddrInUse {
            PanelError::PortInUse {
                host: config.host().to_string(),
                port: config.port(),
            }
        } else {
            PanelError::Bind { address, source }
        }
    })
}

/// A server with a bound socket, ready to serve
pub struct RunningServer {
    config: ServerConfig,
    cancel_token: CancellationToken,
    state: Arc<watch::Sender<ServerState>>,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl RunningServer {
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address operators and the browser should use
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.config.host(), self.local_addr.port())
    }

    #[must_use]
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Request a graceful shutdown from outside the serve loop.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    fn announce(&self) {
        let url = self.url();
        println!("{BANNER_RULE}");
        println!("THE CHIMERA PROTOCOL - Control Panel Server Started");
        println!("{BANNER_RULE}");
        println!("Server URL: {url}");
        println!("Working Directory: {}", self.config.project_root().display());
        println!("Start Time: {}", utils::display_timestamp());
        println!("{BANNER_RULE}");
        println!("Server is running...");
        println!("Press Ctrl+C to stop server");
        println!("{BANNER_RULE}");
        tracing::info!("Site launched on: {url}");

        if self.config.open_browser() {
            match utils::open_browser(&url) {
                Ok(()) => println!("Browser opened automatically"),
                Err(e) => {
                    tracing::warn!("Could not open browser: {e}");
                    println!("Please manually open browser to visit the address above");
                }
            }
        }
    }

    /// Serve requests until the cancellation token fires.
    ///
    /// In-flight requests are allowed to finish; no new connection is accepted
    /// once shutdown begins. The socket is released before this returns.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::ServerRun` if the accept loop fails.
    pub async fn serve(self) -> Result<()> {
        let app = router(&self.config);

        let shutdown = {
            let cancel_token = self.cancel_token.clone();
            let state = Arc::clone(&self.state);
            async move {
                cancel_token.cancelled().await;
                set_state(&state, ServerState::Stopping);
                println!();
                println!("{BANNER_RULE}");
                println!("Stopping server...");
            }
        };

        let result = axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        set_state(&self.state, ServerState::Stopped);
        result.map_err(PanelError::ServerRun)?;

        println!("Server stopped");
        println!("Thank you for using The Chimera Protocol");
        println!("{BANNER_RULE}");
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Run the control panel server until `cancel_token` is cancelled.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or the server fails while
/// running.
pub async fn run(config: ServerConfig, cancel_token: CancellationToken) -> Result<()> {
    tracing::info!("Initializing server");
    Server::new(config, cancel_token).bind().await?.serve().await
}

/// Cancel `cancel_token` once SIGINT (or SIGTERM on Unix) arrives.
pub async fn cancel_on_interrupt(cancel_token: CancellationToken) {
    wait_for_shutdown_signal().await;
    tracing::info!("Interrupt received, shutting down");
    cancel_token.cancel();
}

async fn wait_for_shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn project() -> (TempDir, ServerConfig) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let config = ServerConfig::new("127.0.0.1", 0, dir.path()).unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn new_server_starts_in_created_state() {
        let (_dir, config) = project();
        let server = Server::new(config, CancellationToken::new());
        assert_eq!(server.state(), ServerState::Created);
    }

    #[tokio::test]
    async fn bind_reaches_running_and_reports_url() {
        let (_dir, config) = project();
        let running = Server::new(config, CancellationToken::new())
            .bind()
            .await
            .unwrap();

        assert_eq!(running.state(), ServerState::Running);
        assert_ne!(running.local_addr().port(), 0);
        assert_eq!(
            running.url(),
            format!("http://127.0.0.1:{}", running.local_addr().port())
        );
    }

    #[tokio::test]
    async fn taken_port_is_reported_and_never_runs() {
        let (_dir, config) = project();
        let first = Server::new(config.clone(), CancellationToken::new())
            .bind()
            .await
            .unwrap();
        let port = first.local_addr().port();

        let second = ServerConfig::new("127.0.0.1", port, config.project_root()).unwrap();
        let server = Server::new(second, CancellationToken::new());
        let mut states = server.subscribe();

        let err = server.bind().await.err().expect("second bind must fail");
        assert!(matches!(err, PanelError::PortInUse { port: p, .. } if p == port));
        assert_eq!(*states.borrow_and_update(), ServerState::Stopped);
    }
}
