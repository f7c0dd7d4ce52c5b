//! User commands run after a successful item and after a fully finished run.
//!
//! Hooks are `sh -c` children on their own tasks; a workflow run awaits the
//! handles before returning. Their outcome is logged and never feeds back
//! into item state.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct Hooks {
    pub on_success: Option<String>,
    pub on_all_finished: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl Hooks {
    pub fn from_config(cfg: &crate::config::BatchConfig) -> Self {
        Self {
            on_success: non_empty(cfg.command_on_successful_download.as_deref()),
            on_all_finished: non_empty(cfg.command_when_all_finished.as_deref()),
            working_dir: cfg.download_folder.clone(),
        }
    }

    /// Run the per-item success hook with `url` as its last argument.
    pub fn item_succeeded(&self, url: &str) -> Option<JoinHandle<bool>> {
        let cmd = self.on_success.as_deref()?;
        Some(self.spawn("on_success", cmd, Some(url)))
    }

    pub fn all_finished(&self) -> Option<JoinHandle<bool>> {
        let cmd = self.on_all_finished.as_deref()?;
        Some(self.spawn("on_all_finished", cmd, None))
    }

    fn spawn(&self, hook: &'static str, cmd: &str, arg: Option<&str>) -> JoinHandle<bool> {
        let mut command = Command::new("sh");
        // "$@" after `sh -c <cmd> <name>` expands to the extra argument.
        let script = match arg {
            Some(_) => format!("{cmd} \"$@\""),
            None => cmd.to_string(),
        };
        command.arg("-c").arg(script).arg("batchdl-hook");
        if let Some(a) = arg {
            command.arg(a);
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let cmd = cmd.to_string();
        tokio::spawn(async move {
            match command.status().await {
                Ok(status) if status.success() => {
                    tracing::debug!(hook, %cmd, "hook finished");
                    true
                }
                Ok(status) => {
                    tracing::warn!(hook, %cmd, %status, "hook exited unsuccessfully");
                    false
                }
                Err(e) => {
                    tracing::warn!(hook, %cmd, "hook failed to start: {}", e);
                    false
                }
            }
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_hook_receives_url() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("hook.out");
        let hooks = Hooks {
            on_success: Some(format!("printf '%s' > {}", out.display())),
            ..Hooks::default()
        };
        let ok = hooks
            .item_succeeded("https://example.com/a b")
            .expect("hook configured")
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "https://example.com/a b");
    }

    #[tokio::test]
    async fn failing_hook_is_reported_not_raised() {
        let hooks = Hooks {
            on_all_finished: Some("exit 3".to_string()),
            ..Hooks::default()
        };
        assert!(!hooks.all_finished().unwrap().await.unwrap());
    }

    #[test]
    fn blank_commands_are_ignored() {
        let cfg = crate::config::BatchConfig {
            command_on_successful_download: Some("   ".to_string()),
            ..Default::default()
        };
        let hooks = Hooks::from_config(&cfg);
        assert!(hooks.on_success.is_none());
        assert!(hooks.item_succeeded("u").is_none());
    }
}
