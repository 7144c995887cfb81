//! Stamps the binary with build information read by `deck system info`:
//! - `DECK_BUILD_TIMESTAMP`: UTC build time, ISO 8601
//! - `DECK_GIT_COMMIT`: short commit hash, "unknown" outside a git checkout

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    println!(
        "cargo:rustc-env=DECK_BUILD_TIMESTAMP={}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!(
        "cargo:rustc-env=DECK_GIT_COMMIT={}",
        short_commit().unwrap_or_else(|| "unknown".to_string())
    );
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}
