//! Builds a bundle offline, then runs it through the generated dispatcher.
#![cfg(unix)]

use assert_cmd::Command;
use flate2::read::GzDecoder;
use runtime_bundler::bundler::PlatformKey;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

const FAKE_RUNTIME: &str = "#!/bin/sh\necho \"runtime $*\"\n";

fn write_runtime_zip(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
    zip.add_directory("deno-dist/", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.start_file(
        "deno-dist/deno",
        zip::write::SimpleFileOptions::default().unix_permissions(0o644),
    )
    .unwrap();
    zip.write_all(FAKE_RUNTIME.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn write_project(root: &Path) {
    std::fs::write(
        root.join("bundle.toml"),
        r#"
product = "demo"

[runtime]
archive = "vendor/deno.zip"

[python]
requirements = []

[app]
cli_dir = "cli"
"#,
    )
    .unwrap();
    std::fs::create_dir_all(root.join("cli/lib")).unwrap();
    std::fs::write(root.join("cli/cli.js"), "console.log('hi')\n").unwrap();
    std::fs::write(root.join("cli/lib/util.js"), "export {}\n").unwrap();
    std::fs::create_dir_all(root.join("python/review")).unwrap();
    std::fs::write(root.join("python/review/__init__.py"), "").unwrap();
    write_runtime_zip(&root.join("vendor/deno.zip"));
}

#[test]
fn builds_and_launches_offline_bundle() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let key = PlatformKey::detect().unwrap();
    let archive_name = format!("demo-runtime-v1.2.3-{key}.tar.gz");

    let output = Command::cargo_bin("runtime-bundler")
        .unwrap()
        .current_dir(project.path())
        .env_remove("RUNTIME_BUNDLER_CONFIG")
        .env_remove("RUNTIME_BUNDLER_RUNTIME_ARCHIVE")
        .args(["1.2.3", "--quiet", "--launcher-binary"])
        .arg(env!("CARGO_BIN_EXE_runtime-launcher"))
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let archive = project.path().join("dist").join(&archive_name);
    assert!(archive.is_file());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let digest = hex::encode(Sha256::digest(std::fs::read(&archive).unwrap()));
    let archive_line = stdout.lines().find(|l| l.starts_with("Archive: ")).unwrap();
    assert!(archive_line.ends_with(&format!("dist/{archive_name}")), "{archive_line}");
    assert!(stdout.contains(&format!("{digest}  {archive_name}")));

    let extracted = tempfile::tempdir().unwrap();
    tar::Archive::new(GzDecoder::new(std::fs::File::open(&archive).unwrap()))
        .unpack(extracted.path())
        .unwrap();
    let root = extracted.path();

    let top: BTreeSet<String> = std::fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let expected: BTreeSet<String> = ["app", "bin", "manifest.json", "pydeps", "requirements.txt"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(top, expected);

    assert!(root.join("app/lib/util.js").is_file());
    assert!(root.join("app/python/review/__init__.py").is_file());
    assert_eq!(std::fs::read_to_string(root.join("requirements.txt")).unwrap(), "");

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["version"], "1.2.3");
    assert_eq!(manifest["platform"], key.to_string());
    assert!(manifest["built_at"].as_str().unwrap().ends_with('Z'));

    // Nothing to probe for; mark the bundle verified so no interpreter is needed.
    std::fs::write(root.join("pydeps/.verified"), "").unwrap();

    let run = std::process::Command::new(root.join("bin/demo"))
        .args(["review", "--json"])
        .output()
        .unwrap();
    assert!(
        run.status.success(),
        "launch failed: {}",
        String::from_utf8_lossy(&run.stderr)
    );
    let stdout = String::from_utf8(run.stdout).unwrap();
    assert!(stdout.starts_with("runtime run --allow-all "), "{stdout}");
    assert!(stdout.trim_end().ends_with("app/cli.js review --json"), "{stdout}");
}
