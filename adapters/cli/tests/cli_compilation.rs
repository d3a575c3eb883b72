use std::process::Command;

#[test]
fn geocoin_binary_passes_cargo_check() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "geocoin"])
        .output()
        .expect("failed to invoke cargo check for the geocoin binary");

    assert!(
        output.status.success(),
        "cargo check --bin geocoin failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}
