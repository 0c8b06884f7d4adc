//! Build script for the dxoidc crate.
//!
//! This script loads environment variables at compile time, making them available
//! to the `option_env!()` macro used by `OidcConfig::from_env()`.
//!
//! Priority order:
//! 1. Environment variables already set (e.g., from CI/CD, system env)
//! 2. Variables from `.env` file (if it exists)
//! 3. Variables from `.env.example` file (fallback for CI builds)

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let env_file = manifest_dir.join(".env");
    let env_example_file = manifest_dir.join(".env.example");

    let required_vars = ["OIDC_AUTHORITY", "OIDC_CLIENT_ID", "OIDC_REDIRECT_URI"];
    let env_vars_set = required_vars
        .iter()
        .filter(|&var| env::var(var).is_ok())
        .count();

    let file_to_load = if env_file.exists() {
        Some(env_file)
    } else if env_vars_set == 0 && env_example_file.exists() {
        Some(env_example_file)
    } else {
        None
    };

    let Some(file_path) = file_to_load else {
        if env_vars_set > 0 {
            println!(
                "cargo:warning=Using OIDC configuration from environment variables ({}/{} set)",
                env_vars_set,
                required_vars.len()
            );
        }
        return;
    };

    println!(
        "cargo:warning=Loading OIDC configuration from {} (environment variables take priority)",
        file_path.display()
    );

    let contents = fs::read_to_string(&file_path).expect("Failed to read env file");

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if !key.starts_with("OIDC_") {
                continue;
            }
            if env::var(key).is_err() {
                println!("cargo:rustc-env={}={}", key, value.trim());
            }
        }
    }
}
