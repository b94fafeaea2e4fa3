//! Ensures all workspace crates use `version.workspace = true` and that
//! the workspace version is consistent across all Cargo.toml files.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root")
        .to_path_buf()
}

fn read_toml(path: &Path) -> toml::Value {
    let content = std::fs::read_to_string(path).expect("read Cargo.toml");
    content.parse().expect("parse Cargo.toml")
}

#[test]
fn all_crates_use_workspace_version() {
    let root = workspace_root();
    for krate in ["crates/deploygate-core", "crates/deploygate-cli"] {
        let doc = read_toml(&root.join(krate).join("Cargo.toml"));
        let uses_workspace = doc["package"]["version"]
            .get("workspace")
            .and_then(|v| v.as_bool());
        assert_eq!(
            uses_workspace,
            Some(true),
            "{} should use version.workspace = true",
            krate
        );
    }
}

#[test]
fn workspace_version_matches_cargo_pkg() {
    let doc = read_toml(&workspace_root().join("Cargo.toml"));
    let ws_version = doc["workspace"]["package"]["version"]
        .as_str()
        .expect("workspace version");
    assert_eq!(ws_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(deploygate_core::VERSION, ws_version);
}
