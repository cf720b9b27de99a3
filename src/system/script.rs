// src/system/script.rs

use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

use crate::CancellationToken;
use crate::constants::SCRIPT_PREFIX;
use crate::core::engine::ActivationPlan;
use crate::error::{Result, SclError};
use crate::system::executor::{self, ScriptOutcome};

/// How the activation script is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Child shell; we wait for it and clean up after it.
    Spawn,
    /// The shell takes over this process; the script deletes itself.
    Replace,
}

/// Creates a uniquely named, not yet written, script file in `tmp_dir`.
fn create_script_file(tmp_dir: &Path) -> Result<NamedTempFile> {
    Builder::new()
        .prefix(SCRIPT_PREFIX)
        .tempfile_in(tmp_dir)
        .map_err(|e| SclError::disk("Unable to create temporary script in", tmp_dir, e))
}

fn write_script(file: &mut NamedTempFile, text: &str) -> Result<()> {
    let path = file.path().to_path_buf();
    file.write_all(text.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| SclError::disk("Unable to write temporary script", path, e))
}

/// Runs `plan` with `shell`, writing the script under `tmp_dir`.
///
/// Returns the exit code of the final command. In [`RunMode::Replace`] this
/// only returns if the process could not be replaced.
pub fn run_plan(
    plan: &ActivationPlan,
    shell: &Path,
    tmp_dir: &Path,
    mode: RunMode,
    cancellation_token: &CancellationToken,
) -> Result<i32> {
    let mut file = create_script_file(tmp_dir)?;
    log::debug!("Activation script: {}", file.path().display());

    match mode {
        RunMode::Spawn => {
            write_script(&mut file, &plan.script.render())?;
            // `file` is removed when it drops, after the child is done with it.
            let outcome = executor::run_script(
                shell,
                file.path(),
                &plan.context.process_env(),
                cancellation_token,
            )?;
            match outcome {
                ScriptOutcome::Exited(code) => Ok(code),
                ScriptOutcome::Interrupted => Err(SclError::Interrupted),
            }
        }
        RunMode::Replace => replace_with_plan(plan, shell, file),
    }
}

#[cfg(unix)]
fn replace_with_plan(plan: &ActivationPlan, shell: &Path, mut file: NamedTempFile) -> Result<i32> {
    let text = plan.script.render_self_removing(file.path())?;
    write_script(&mut file, &text)?;
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| SclError::disk("Unable to keep temporary script", e.path.to_path_buf(), e.error))?;

    let error = executor::replace_process(shell, &path, &plan.context.process_env());
    if let Err(e) = std::fs::remove_file(&path) {
        log::warn!("Could not remove {}: {}", path.display(), e);
    }
    Err(error.into())
}

#[cfg(not(unix))]
fn replace_with_plan(_plan: &ActivationPlan, _shell: &Path, _file: NamedTempFile) -> Result<i32> {
    Err(SclError::System(
        "Replacing the current process is only supported on Unix.".to_string(),
    ))
}
