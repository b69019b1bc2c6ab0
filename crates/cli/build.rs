use std::process::Command;

/// Short commit for `whr --version`; packagers without a checkout can set
/// WHR_BUILD_COMMIT instead.
fn commit_hash() -> String {
    if let Ok(hash) = std::env::var("WHR_BUILD_COMMIT") {
        return hash;
    }
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".into())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=WHR_BUILD_COMMIT");

    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit_hash());
    println!(
        "cargo:rustc-env=TARGET={}",
        std::env::var("TARGET").unwrap_or_else(|_| "unknown".into())
    );
}
