//! Interpreter dependency bundling into `pydeps/`.

use super::StagingTree;
use crate::bundler::{Error, RequirementsSpec, Result, error::ErrorExt};
use crate::interpreter::{self, Interpreter};

/// Writes `requirements.txt` and installs every requirement into `pydeps/`.
///
/// The requirements file is written first and unconditionally: it is what the
/// launcher reinstalls from when the bundled packages fail to import.
pub async fn bundle(
    tree: &StagingTree,
    requirements: &RequirementsSpec,
    candidates: &[String],
) -> Result<()> {
    let requirements_file = tree.requirements_file();
    tokio::fs::write(&requirements_file, requirements.render())
        .await
        .fs_context("writing requirements file", &requirements_file)?;

    if requirements.is_empty() {
        log::warn!("No interpreter dependencies configured; pydeps/ stays empty");
        return Ok(());
    }

    let interpreter = select_interpreter(candidates).await?;
    log::info!(
        "Installing {} requirement(s) into {} with {}",
        requirements.entries().len(),
        tree.pydeps_dir().display(),
        interpreter.path.display()
    );

    let output = tokio::process::Command::new(&interpreter.path)
        .args(interpreter::pip_install_args(
            &requirements_file,
            &tree.pydeps_dir(),
            false,
        ))
        .env("PYTHONNOUSERSITE", "1")
        .env_remove("PYTHONPATH")
        .env_remove("PIP_TARGET")
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .fs_context("running package installer", &interpreter.path)?;

    if !output.status.success() {
        return Err(Error::DependencyInstallFailure {
            interpreter: interpreter.path,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    log::info!("✓ Bundled interpreter dependencies");
    Ok(())
}

async fn select_interpreter(candidates: &[String]) -> Result<Interpreter> {
    let owned = candidates.to_vec();
    tokio::task::spawn_blocking(move || interpreter::select_with_installer(&owned))
        .await
        .map_err(|e| Error::GenericError(format!("interpreter probe task panicked: {e}")))?
        .ok_or_else(|| Error::NoInterpreterFound {
            candidates: candidates.to_vec(),
            requirement: interpreter::install_hint(candidates),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{PlatformKey, stages::staging};

    #[tokio::test]
    async fn empty_spec_writes_file_without_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        let key = PlatformKey::from_parts("linux", "x64").unwrap();
        let tree = staging::prepare(tmp.path(), "app", key).await.unwrap();

        let candidates = vec!["no-such-python-7d2e".to_string()];
        bundle(&tree, &RequirementsSpec::default(), &candidates)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(tree.requirements_file()).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_interpreter_fails_after_writing_requirements() {
        let tmp = tempfile::tempdir().unwrap();
        let key = PlatformKey::from_parts("linux", "x64").unwrap();
        let tree = staging::prepare(tmp.path(), "app", key).await.unwrap();
        let spec = RequirementsSpec::parse_all(["pydantic>=2.0"]).unwrap();

        let candidates = vec!["no-such-python-7d2e".to_string()];
        let err = bundle(&tree, &spec, &candidates).await.unwrap_err();

        assert!(matches!(err, Error::NoInterpreterFound { .. }));
        assert_eq!(
            std::fs::read_to_string(tree.requirements_file()).unwrap(),
            "pydantic>=2.0\n"
        );
        assert_eq!(std::fs::read_dir(tree.pydeps_dir()).unwrap().count(), 0);
    }
}
