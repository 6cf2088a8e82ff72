//! Two-state verification protocol.
//!
//! `Unverified` (marker absent) test-imports the probe module and, when that
//! fails, rebuilds `pydeps/` from `requirements.txt` with the same interpreter
//! and imports again. `Verified` (marker present) skips straight to dispatch.
//! Only this module creates the marker, and only after an import succeeded.

use super::{
    BundleLayout, Error, InstallOutcome, LaunchEnv, LauncherSettings, Result, Toolchain,
};
use super::lock::RepairLock;
use crate::interpreter::Interpreter;
use crate::layout;
use std::fs;

/// How the bundle came to be verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Marker was already present
    AlreadyVerified,
    /// Bundled dependencies imported cleanly
    ProbePassed,
    /// Dependencies were reinstalled for the local interpreter
    Repaired,
}

/// Ensures the bundled dependencies load on this machine.
pub fn verify<T: Toolchain + ?Sized>(
    layout: &BundleLayout,
    settings: &LauncherSettings,
    env: &LaunchEnv,
    toolchain: &T,
) -> Result<Verification> {
    let marker = layout.marker();
    if marker.exists() {
        return Ok(Verification::AlreadyVerified);
    }

    fs::create_dir_all(layout.pydeps_dir())?;
    let _lock = RepairLock::acquire(&layout.lock_file())?;
    if marker.exists() {
        log::debug!("Verified by a concurrent launch");
        return Ok(Verification::AlreadyVerified);
    }

    let interpreter = toolchain
        .locate(&settings.candidates)
        .ok_or_else(|| Error::NoInterpreterFound {
            candidates: settings.candidates.clone(),
        })?;
    let module = settings.probe_module.as_str();

    let outcome = if toolchain.can_import(&interpreter, module, env) {
        Verification::ProbePassed
    } else {
        log::warn!("Bundled Python dependencies do not load on this interpreter; reinstalling");
        repair(layout, &interpreter, env, toolchain)?;
        if !toolchain.can_import(&interpreter, module, env) {
            return Err(Error::RepairIneffective {
                interpreter: interpreter.path,
                module: module.to_string(),
            });
        }
        log::warn!("✓ Reinstalled bundled Python dependencies");
        Verification::Repaired
    };

    fs::File::create(&marker)?;
    Ok(outcome)
}

fn repair<T: Toolchain + ?Sized>(
    layout: &BundleLayout,
    interpreter: &Interpreter,
    env: &LaunchEnv,
    toolchain: &T,
) -> Result<()> {
    if !toolchain.has_installer(interpreter) {
        return Err(Error::InstallerUnavailable {
            interpreter: interpreter.path.clone(),
        });
    }

    let requirements = layout.requirements_file();
    if !requirements.is_file() {
        return Err(Error::MissingRequirements { path: requirements });
    }

    let pydeps = layout.pydeps_dir();
    clear_pydeps(layout)?;

    if toolchain.install(interpreter, &requirements, &pydeps, false, env)?
        == InstallOutcome::Installed
    {
        return Ok(());
    }
    log::warn!(
        "Install rejected; retrying with {}",
        crate::interpreter::PRIVILEGED_INSTALL_FLAG
    );

    match toolchain.install(interpreter, &requirements, &pydeps, true, env)? {
        InstallOutcome::Installed => Ok(()),
        InstallOutcome::Rejected { status, stderr } => Err(Error::DependencyInstallFailure {
            interpreter: interpreter.path.clone(),
            status,
            stderr,
        }),
    }
}

/// Removes everything under `pydeps/` except the held lock file.
fn clear_pydeps(layout: &BundleLayout) -> Result<()> {
    for entry in fs::read_dir(layout.pydeps_dir())? {
        let entry = entry?;
        if entry.file_name() == layout::REPAIR_LOCK {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::AmbientEnv;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};

    /// Scripted toolchain. Each import check pops the next scripted answer;
    /// once the script runs out, imports succeed iff an install has
    /// populated `pydeps/`.
    #[derive(Default)]
    struct FakeToolchain {
        missing: bool,
        no_installer: bool,
        imports: RefCell<VecDeque<bool>>,
        outcomes: RefCell<VecDeque<InstallOutcome>>,
        checked_with: RefCell<Vec<PathBuf>>,
        installed_with: RefCell<Vec<PathBuf>>,
        installs: RefCell<Vec<bool>>,
        import_checks: Cell<usize>,
        installed: Cell<bool>,
    }

    impl FakeToolchain {
        fn failing_import(outcomes: impl IntoIterator<Item = InstallOutcome>) -> Self {
            Self {
                imports: RefCell::new([false].into()),
                outcomes: RefCell::new(outcomes.into_iter().collect()),
                ..Self::default()
            }
        }
    }

    impl Toolchain for FakeToolchain {
        fn locate(&self, _: &[String]) -> Option<Interpreter> {
            (!self.missing).then(|| Interpreter {
                command: "python3".into(),
                path: PathBuf::from("/usr/bin/python3"),
            })
        }

        fn can_import(&self, interpreter: &Interpreter, _: &str, _: &LaunchEnv) -> bool {
            self.import_checks.set(self.import_checks.get() + 1);
            self.checked_with.borrow_mut().push(interpreter.path.clone());
            self.imports
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| self.installed.get())
        }

        fn has_installer(&self, _: &Interpreter) -> bool {
            !self.no_installer
        }

        fn install(
            &self,
            interpreter: &Interpreter,
            _: &Path,
            target: &Path,
            privileged: bool,
            _: &LaunchEnv,
        ) -> Result<InstallOutcome> {
            self.installs.borrow_mut().push(privileged);
            self.installed_with.borrow_mut().push(interpreter.path.clone());
            let outcome = self
                .outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(InstallOutcome::Installed);
            if outcome == InstallOutcome::Installed {
                fs::create_dir_all(target.join("pydantic_core"))?;
                self.installed.set(true);
            }
            Ok(outcome)
        }
    }

    fn rejected() -> InstallOutcome {
        InstallOutcome::Rejected {
            status: "exit status: 1".into(),
            stderr: "externally-managed-environment".into(),
        }
    }

    struct Bundle {
        _tmp: tempfile::TempDir,
        layout: BundleLayout,
        settings: LauncherSettings,
        env: LaunchEnv,
    }

    fn bundle() -> Bundle {
        let tmp = tempfile::tempdir().unwrap();
        let layout = BundleLayout::from_root(tmp.path());
        fs::create_dir_all(layout.pydeps_dir().join("stale_pkg")).unwrap();
        fs::write(layout.pydeps_dir().join("stale_pkg/__init__.py"), b"").unwrap();
        fs::write(layout.requirements_file(), b"pydantic>=2.0\n").unwrap();
        let settings = LauncherSettings::default();
        let env = LaunchEnv::configure(&layout, &settings, &AmbientEnv::default()).unwrap();
        Bundle {
            _tmp: tmp,
            layout,
            settings,
            env,
        }
    }

    #[test]
    fn failing_import_wipes_and_reinstalls() {
        let b = bundle();
        let toolchain = FakeToolchain::failing_import([]);

        let outcome = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        assert_eq!(outcome, Verification::Repaired);
        assert!(!b.layout.pydeps_dir().join("stale_pkg").exists());
        assert!(b.layout.pydeps_dir().join("pydantic_core").is_dir());
        assert!(b.layout.marker().is_file());
        assert!(b.layout.lock_file().exists());
        assert_eq!(*toolchain.installs.borrow(), [false]);
    }

    #[test]
    fn repair_is_rechecked_with_the_same_interpreter() {
        let b = bundle();
        let toolchain = FakeToolchain::failing_import([]);

        verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        assert_eq!(toolchain.import_checks.get(), 2);
        let checked = toolchain.checked_with.borrow();
        assert!(checked.iter().all(|p| p == Path::new("/usr/bin/python3")));
        assert_eq!(*toolchain.installed_with.borrow(), [PathBuf::from("/usr/bin/python3")]);
    }

    #[test]
    fn import_still_failing_after_repair_leaves_no_marker() {
        let b = bundle();
        let toolchain = FakeToolchain {
            imports: RefCell::new([false, false].into()),
            ..FakeToolchain::default()
        };

        let err = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap_err();
        assert!(matches!(err, Error::RepairIneffective { ref module, .. } if module == "pydantic_core"));
        assert!(!b.layout.marker().exists());
        assert_eq!(toolchain.installs.borrow().len(), 1);

        // The next launch tries again instead of trusting the broken install.
        let toolchain = FakeToolchain::failing_import([]);
        let outcome = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        assert_eq!(outcome, Verification::Repaired);
    }

    #[test]
    fn second_run_takes_the_fast_path() {
        let b = bundle();
        let toolchain = FakeToolchain::failing_import([]);
        verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        let checks = toolchain.import_checks.get();

        let outcome = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        assert_eq!(outcome, Verification::AlreadyVerified);
        assert_eq!(toolchain.import_checks.get(), checks);
        assert_eq!(toolchain.installs.borrow().len(), 1);
    }

    #[test]
    fn passing_import_leaves_pydeps_untouched() {
        let b = bundle();
        let toolchain = FakeToolchain {
            imports: RefCell::new([true].into()),
            ..FakeToolchain::default()
        };

        let outcome = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        assert_eq!(outcome, Verification::ProbePassed);
        assert!(b.layout.pydeps_dir().join("stale_pkg/__init__.py").is_file());
        assert!(b.layout.marker().is_file());
        assert!(toolchain.installs.borrow().is_empty());
    }

    #[test]
    fn rejected_install_retries_with_privileged_flag() {
        let b = bundle();
        let toolchain = FakeToolchain::failing_import([rejected()]);

        let outcome = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap();
        assert_eq!(outcome, Verification::Repaired);
        assert_eq!(*toolchain.installs.borrow(), [false, true]);
    }

    #[test]
    fn second_rejection_fails_without_marker() {
        let b = bundle();
        let toolchain = FakeToolchain::failing_import([rejected(), rejected()]);

        let err = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap_err();
        assert!(matches!(err, Error::DependencyInstallFailure { ref stderr, .. } if stderr.contains("externally-managed")));
        assert!(!b.layout.marker().exists());
    }

    #[test]
    fn missing_interpreter_fails_without_marker() {
        let b = bundle();
        let toolchain = FakeToolchain {
            missing: true,
            ..FakeToolchain::default()
        };

        let err = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap_err();
        assert!(matches!(err, Error::NoInterpreterFound { .. }));
        assert!(!b.layout.marker().exists());
        assert!(b.layout.pydeps_dir().join("stale_pkg").exists());
    }

    #[test]
    fn interpreter_without_pip_keeps_pydeps() {
        let b = bundle();
        let toolchain = FakeToolchain {
            no_installer: true,
            ..FakeToolchain::failing_import([])
        };

        let err = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap_err();
        assert!(matches!(err, Error::InstallerUnavailable { .. }));
        assert!(!b.layout.marker().exists());
        assert!(b.layout.pydeps_dir().join("stale_pkg").exists());
        assert!(toolchain.installs.borrow().is_empty());
    }

    #[test]
    fn missing_requirements_is_reported() {
        let b = bundle();
        fs::remove_file(b.layout.requirements_file()).unwrap();
        let toolchain = FakeToolchain::failing_import([]);

        let err = verify(&b.layout, &b.settings, &b.env, &toolchain).unwrap_err();
        assert!(matches!(err, Error::MissingRequirements { .. }));
        assert!(toolchain.installs.borrow().is_empty());
    }
}
