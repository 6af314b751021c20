use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// An isolated HOME with its own session file.
pub struct Sandbox {
    _dir: tempfile::TempDir,
    pub home: PathBuf,
    pub session_file: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        let session_file = dir.path().join("session.json");
        Self {
            _dir: dir,
            home,
            session_file,
        }
    }
}

fn command(args: &[&str], sandbox: &Sandbox, api_url: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vendorflow"));
    cmd.args(args);
    cmd.env("HOME", &sandbox.home);
    cmd.env("XDG_DATA_HOME", sandbox.home.join("data"));
    cmd.env("VENDORFLOW_API_URL", api_url);
    cmd.env("VENDORFLOW_SESSION_FILE", &sandbox.session_file);
    cmd.env_remove("VENDORFLOW_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Run the CLI on a blocking thread so a mock server on the test runtime
/// keeps serving.
pub async fn run_cli(args: &[&str], sandbox: &Sandbox, api_url: &str) -> Output {
    let mut cmd = command(args, sandbox, api_url);
    tokio::task::spawn_blocking(move || cmd.output().expect("Failed to execute CLI"))
        .await
        .unwrap()
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], sandbox: &Sandbox, api_url: &str) -> String {
    let output = run_cli(args, sandbox, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn read_session(path: &Path) -> serde_json::Value {
    let json = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&json).unwrap()
}
