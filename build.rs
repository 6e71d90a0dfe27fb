use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=CHOREBOARD_VERSION");

    let version = std::env::var("CHOREBOARD_VERSION")
        .ok()
        .or_else(|| {
            Command::new("git")
                .args(["describe", "--tags", "--always"])
                .output()
                .ok()
                .filter(|o| o.status.success())
                .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        })
        .map(|s| s.strip_prefix('v').unwrap_or(&s).to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").into());

    println!("cargo:rustc-env=CHOREBOARD_BUILD_VERSION={version}");
}
