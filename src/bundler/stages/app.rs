//! Application payload assembly.

use super::StagingTree;
use crate::bundler::{AppSettings, Error, Result, utils::fs};

/// Copies the built CLI into `app/` and interpreter sources into `app/python/`.
///
/// The CLI directory is required and must contain the entrypoint. Interpreter
/// sources are optional.
pub async fn assemble(tree: &StagingTree, settings: &AppSettings) -> Result<()> {
    match &settings.cli_dir {
        Some(cli_dir) => {
            log::info!("Copying application from {}", cli_dir.display());
            fs::copy_dir(cli_dir, &tree.app_dir()).await?;

            let entry = tree.app_dir().join(&settings.entry);
            if !entry.is_file() {
                return Err(Error::GenericError(format!(
                    "entrypoint {} not found in {}",
                    settings.entry,
                    cli_dir.display()
                )));
            }
        }
        None => {
            return Err(Error::MissingApplication {
                entry: settings.entry.clone(),
            });
        }
    }

    match &settings.python_dir {
        Some(python_dir) => {
            log::info!("Copying interpreter sources from {}", python_dir.display());
            fs::copy_dir(python_dir, &tree.app_python_dir()).await?;
        }
        None => log::debug!("No interpreter sources configured"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{PlatformKey, stages::staging};

    #[tokio::test]
    async fn copies_cli_and_python_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = tmp.path().join("cli/dist");
        std::fs::create_dir_all(&cli).unwrap();
        std::fs::write(cli.join("cli.js"), b"run()").unwrap();
        let py = tmp.path().join("python/review");
        std::fs::create_dir_all(&py).unwrap();
        std::fs::write(py.join("__init__.py"), b"").unwrap();

        let key = PlatformKey::from_parts("linux", "arm64").unwrap();
        let tree = staging::prepare(&tmp.path().join("build"), "app", key)
            .await
            .unwrap();
        let settings = AppSettings {
            entry: "cli.js".into(),
            cli_dir: Some(cli),
            python_dir: Some(tmp.path().join("python")),
        };

        assemble(&tree, &settings).await.unwrap();

        assert!(tree.app_dir().join("cli.js").is_file());
        assert!(tree.app_python_dir().join("review/__init__.py").is_file());
    }

    #[tokio::test]
    async fn missing_entrypoint_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = tmp.path().join("cli");
        std::fs::create_dir_all(&cli).unwrap();

        let key = PlatformKey::from_parts("linux", "arm64").unwrap();
        let tree = staging::prepare(&tmp.path().join("build"), "app", key)
            .await
            .unwrap();
        let settings = AppSettings {
            entry: "main.js".into(),
            cli_dir: Some(cli),
            python_dir: None,
        };

        assert!(assemble(&tree, &settings).await.is_err());
    }

    #[tokio::test]
    async fn missing_cli_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let key = PlatformKey::from_parts("darwin", "x64").unwrap();
        let tree = staging::prepare(&tmp.path().join("build"), "app", key)
            .await
            .unwrap();
        let settings = AppSettings {
            entry: "cli.js".into(),
            cli_dir: None,
            python_dir: None,
        };

        let err = assemble(&tree, &settings).await.unwrap_err();
        assert!(matches!(err, Error::MissingApplication { ref entry } if entry == "cli.js"));
        assert!(std::fs::read_dir(tree.app_dir()).unwrap().all(|e| {
            e.unwrap().file_name() == "python"
        }));
    }
}
