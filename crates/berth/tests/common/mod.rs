//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Get the workspace root directory
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // Go up from crates/berth to workspace root
    manifest_dir
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Helper that builds the binary once and runs it directly
pub fn get_berth_binary() -> PathBuf {
    let workspace = workspace_root();

    // Build the binary first (this should be quick if already built)
    let status = Command::new("cargo")
        .args(["build", "--package", "berth", "--quiet"])
        .current_dir(&workspace)
        .status()
        .expect("Failed to build berth");

    assert!(status.success(), "Failed to build berth binary");

    workspace.join("target/debug/berth")
}

/// Run the berth binary directly in the specified directory
pub fn run_berth_in_dir(dir: &Path, args: &[&str]) -> Output {
    let binary = get_berth_binary();

    Command::new(&binary)
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute berth binary")
}

/// Run berth and assert success, returning trimmed stdout.
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_berth_in_dir(dir, args);
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a service via the CLI and return its generated id.
pub fn create_service(dir: &Path, name: &str, extra_args: &[&str]) -> String {
    let mut args = vec!["--quiet", "service", "add", name];
    args.extend_from_slice(extra_args);
    run_ok(dir, &args)
}
