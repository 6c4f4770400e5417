use crate::error::{PanelError, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8008;

/// Default listening host
pub const DEFAULT_HOST: &str = "localhost";

/// Document served for `/`; must exist in the project root before startup
pub const INDEX_FILE: &str = "index.html";

/// Directory under the project root holding the data files
pub const DATA_DIR: &str = "computer-data-structure";

/// Command-line arguments for the control panel server
#[derive(Debug, Parser)]
#[command(
    name = "chimera_panel",
    version,
    about = "The Chimera Protocol control panel server"
)]
pub struct Cli {
    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Open the default browser once the server is running
    #[arg(short, long)]
    pub open: bool,

    /// Project root containing index.html and the data directory
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
}

/// Immutable server configuration
///
/// Built once from the command line and shared read-only by the lifecycle
/// controller and the router.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    project_root: PathBuf,
    open_browser: bool,
}

impl ServerConfig {
    /// Create a configuration rooted at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::MissingIndex` if the root does not exist or does not
    /// contain `index.html`.
    pub fn new(host: impl Into<String>, port: u16, project_root: impl AsRef<Path>) -> Result<Self> {
        let root = project_root.as_ref();
        let project_root = root
            .canonicalize()
            .map_err(|_| PanelError::MissingIndex(root.to_path_buf()))?;

        if !project_root.join(INDEX_FILE).is_file() {
            return Err(PanelError::MissingIndex(project_root));
        }

        tracing::debug!("Project root resolved to {}", project_root.display());
        Ok(Self {
            host: host.into(),
            port,
            project_root,
            open_browser: false,
        })
    }

    /// Enable or disable launching the browser after startup.
    #[must_use]
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Build the configuration from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::new`].
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Ok(Self::new(cli.host, cli.port, cli.root)?.with_browser(cli.open))
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    #[must_use]
    pub fn open_browser(&self) -> bool {
        self.open_browser
    }

    /// Directory the API reads data files from
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.project_root.join(DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["chimera_panel"]).expect("parse defaults");
        assert_eq!(cli.port, 8008);
        assert_eq!(cli.host, "localhost");
        assert!(!cli.open);
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn cli_short_flags() {
        let cli = Cli::try_parse_from(["chimera_panel", "-p", "9000", "-H", "0.0.0.0", "-o"])
            .expect("parse short flags");
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.host, "0.0.0.0");
        assert!(cli.open);
    }

    #[test]
    fn cli_rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["chimera_panel", "--port", "abc"]).is_err());
    }

    #[test]
    fn missing_index_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let err = ServerConfig::new("localhost", 8008, dir.path()).unwrap_err();
        assert!(matches!(err, PanelError::MissingIndex(_)));
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let err = ServerConfig::new("localhost", 8008, dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PanelError::MissingIndex(_)));
    }

    #[test]
    fn data_dir_is_under_project_root() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(INDEX_FILE), "<html></html>").expect("write index");

        let config = ServerConfig::new("localhost", 8008, dir.path())
            .expect("config")
            .with_browser(true);

        assert!(config.open_browser());
        assert!(config.data_dir().ends_with(DATA_DIR));
        assert!(config.data_dir().starts_with(config.project_root()));
    }
}
