//! Common test utilities for webln-demo-cli integration tests

use std::path::Path;
use std::process::{Command, Output};

/// Run the built `webln-demo` binary with an isolated storage directory.
#[allow(dead_code)]
pub fn run_cli(args: &[&str], storage_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_webln-demo"))
        .args(args)
        .env("WEBLN_DEMO_DIR", storage_dir)
        .env("NO_COLOR", "1")
        .env_remove("WEBLN_DEMO_DARK")
        .env_remove("WEBLN_AUTOPAY_MODE")
        .env_remove("WEBLN_COOLDOWN_MS")
        .output()
        .expect("Failed to execute webln-demo")
}

/// Stdout and stderr together, for loose assertions.
#[allow(dead_code)]
pub fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
