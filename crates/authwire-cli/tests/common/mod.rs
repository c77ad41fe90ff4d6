use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Credential file inside an isolated test directory.
pub fn store_path(dir: &Path) -> PathBuf {
    dir.join("credentials.json")
}

/// Run the CLI binary against an isolated credential file.
pub fn run_cli(args: &[&str], store: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authwire"));
    cmd.args(args);
    cmd.env("AUTHWIRE_STORE", store);
    cmd.env_remove("AUTHWIRE_BASE_URL");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], store: &Path) -> String {
    let output = run_cli(args, store);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str], store: &Path) -> String {
    let output = run_cli(args, store);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
