use std::process::Command;
fn main() {
    let git_hash = Command::new("git")
        .args(&["describe", "--tags", "--always"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .unwrap_or_default();
    if !git_hash.trim().is_empty() {
        println!("cargo:rustc-env=GIT_HASH={}", git_hash.trim());
    }
}
