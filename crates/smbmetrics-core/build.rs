use std::process::Command;

fn main() {
    // Container builds usually have no .git, so allow the commit to be injected.
    println!("cargo:rerun-if-env-changed=SMBMETRICS_COMMIT_ID");
    let commit = std::env::var("SMBMETRICS_COMMIT_ID")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(git_commit)
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=SMBMETRICS_COMMIT_ID={commit}");

    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/");
}

fn git_commit() -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}
