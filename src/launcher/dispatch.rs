//! Handing control to the application.

use super::{BundleLayout, Error, LaunchEnv, LauncherSettings, Result};
use std::ffi::OsString;
use std::process::{Command, ExitStatus};

/// Exit code used when a child ends without a code or signal.
const UNKNOWN_EXIT_CODE: i32 = 1;

/// How the launcher runs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Replace the launcher process (`exec`)
    Replace,
    /// Run as a child and mirror its exit
    Forward,
}

impl Dispatch {
    /// `Replace` where the platform supports it.
    pub fn platform_default() -> Self {
        if cfg!(unix) {
            Dispatch::Replace
        } else {
            Dispatch::Forward
        }
    }
}

/// `bin/<runtime> <runtime args> app/<entry> <args>` with the launch environment.
pub fn command(
    layout: &BundleLayout,
    settings: &LauncherSettings,
    env: &LaunchEnv,
    args: &[OsString],
) -> Command {
    let mut command = Command::new(layout.runtime_binary(&settings.runtime));
    env.apply(&mut command)
        .args(&settings.runtime_args)
        .arg(layout.entry(&settings.entry))
        .args(args);
    command
}

/// Runs `command` and returns the exit code the launcher should use.
///
/// With [`Dispatch::Replace`] this only returns on failure.
pub fn run(dispatch: Dispatch, mut command: Command) -> Result<i32> {
    let program = std::path::PathBuf::from(command.get_program());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        if dispatch == Dispatch::Replace {
            log::debug!("exec {:?}", command);
            let source = command.exec();
            return Err(Error::Exec { program, source });
        }
    }
    #[cfg(not(unix))]
    let _ = dispatch;

    log::debug!("spawn {:?}", command);
    let mut child = command.spawn().map_err(|source| Error::Exec {
        program: program.clone(),
        source,
    })?;

    // The terminal delivers ^C and ^\ to the whole process group; the child
    // decides what they mean and the launcher reports its exit.
    #[cfg(unix)]
    let interrupts = interrupts::Ignored::install();
    let status = child.wait().map_err(|source| Error::Exec { program, source })?;

    #[cfg(unix)]
    {
        drop(interrupts);
        if let Some(signal) = std::os::unix::process::ExitStatusExt::signal(&status) {
            reraise(signal);
        }
    }

    Ok(exit_code(status))
}

/// Child's exit code, or `128 + signal` when it was killed.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        if let Some(signal) = std::os::unix::process::ExitStatusExt::signal(&status) {
            return 128 + signal;
        }
    }
    UNKNOWN_EXIT_CODE
}

/// Terminates the launcher with the child's signal when its disposition allows.
#[cfg(unix)]
fn reraise(signal: i32) {
    use nix::sys::signal::{Signal, raise};

    match Signal::try_from(signal) {
        Ok(signal) => {
            log::debug!("Child terminated by {}; re-raising", signal);
            if let Err(e) = raise(signal) {
                log::debug!("raise({}) failed: {}", signal, e);
            }
        }
        Err(e) => log::debug!("Unknown signal {}: {}", signal, e),
    }
}

/// Ignores SIGINT and SIGQUIT while a forwarded child runs.
#[cfg(unix)]
mod interrupts {
    use nix::sys::signal::{SigHandler, Signal, signal};
    use std::sync::Mutex;

    const FORWARDED: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

    /// Live guards, and the dispositions to restore when the last one drops.
    static STATE: Mutex<(usize, Vec<(Signal, SigHandler)>)> = Mutex::new((0, Vec::new()));

    pub(super) struct Ignored;

    impl Ignored {
        pub(super) fn install() -> Self {
            let mut state = STATE.lock().unwrap_or_else(|e| e.into_inner());
            if state.0 == 0 {
                state.1 = FORWARDED
                    .into_iter()
                    .filter_map(|sig| {
                        // SAFETY: SIG_IGN runs no code in signal context.
                        match unsafe { signal(sig, SigHandler::SigIgn) } {
                            Ok(previous) => Some((sig, previous)),
                            Err(e) => {
                                log::debug!("Cannot ignore {}: {}", sig, e);
                                None
                            }
                        }
                    })
                    .collect();
            }
            state.0 += 1;
            Ignored
        }
    }

    impl Drop for Ignored {
        fn drop(&mut self) {
            let mut state = STATE.lock().unwrap_or_else(|e| e.into_inner());
            state.0 -= 1;
            if state.0 > 0 {
                return;
            }
            for (sig, previous) in std::mem::take(&mut state.1) {
                // SAFETY: restores the disposition saved by `install`.
                if let Err(e) = unsafe { signal(sig, previous) } {
                    log::debug!("Cannot restore {}: {}", sig, e);
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::launcher::AmbientEnv;

    #[test]
    fn forward_returns_child_exit_code() {
        let status = run(Dispatch::Forward, {
            let mut c = Command::new("sh");
            c.args(["-c", "exit 7"]);
            c
        })
        .unwrap();
        assert_eq!(status, 7);
    }

    #[test]
    fn forward_survives_interrupt_aimed_at_the_launcher() {
        let status = run(Dispatch::Forward, {
            let mut c = Command::new("sh");
            c.args(["-c", "sleep 0.2; kill -INT $PPID; kill -QUIT $PPID; exit 5"]);
            c
        })
        .unwrap();
        assert_eq!(status, 5);
    }

    #[test]
    fn signal_death_maps_to_128_plus_signal() {
        let status = Command::new("sh")
            .args(["-c", "kill -TERM $$"])
            .status()
            .unwrap();
        assert_eq!(exit_code(status), 128 + 15);
    }

    #[test]
    fn command_orders_runtime_args_entry_then_user_args() {
        let layout = BundleLayout::from_root("/opt/reviewer");
        let settings = LauncherSettings::default();
        let env = LaunchEnv::configure(&layout, &settings, &AmbientEnv::default()).unwrap();
        let command = command(&layout, &settings, &env, &["review".into(), "--json".into()]);

        assert_eq!(command.get_program(), "/opt/reviewer/bin/deno");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            ["run", "--allow-all", "/opt/reviewer/app/cli.js", "review", "--json"]
        );
    }

    #[test]
    fn missing_program_is_an_exec_error() {
        let err = run(Dispatch::Forward, Command::new("/nonexistent/deno")).unwrap_err();
        assert!(matches!(err, Error::Exec { .. }));
    }
}
