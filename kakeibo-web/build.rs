//! Build script for kakeibo-web
//!
//! Stamps the binary with its build identity, reported at startup and by
//! `GET /health`:
//! - `GIT_HASH`: short commit hash, `KAKEIBO_GIT_HASH` when building from a
//!   source tarball, else `unknown`
//! - `BUILD_TIMESTAMP`: UTC, seconds precision
//! - `BUILD_PROFILE`: debug/release

use std::env;
use std::process::Command;

fn git_hash() -> String {
    if let Ok(hash) = env::var("KAKEIBO_GIT_HASH") {
        return hash;
    }

    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
