use std::path::{Path, PathBuf};
use std::process::Command;

const SHA_VAR: &str = "FINGUARD_BUILD_SHA";

fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn main() {
    let repo: PathBuf = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("..");

    // source tarballs have no .git; packagers can pass the revision in
    let label = std::env::var(SHA_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git(&repo, &["describe", "--always", "--dirty", "--abbrev=8"]))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={SHA_VAR}={label}");
    println!("cargo:rerun-if-env-changed={SHA_VAR}");
    for p in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", repo.join(p).display());
    }
}
