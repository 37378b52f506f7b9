use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use log::{error, info};
use regex::Regex;
use thiserror::Error;

use crate::model::{ShortcutRecord, ShortcutType};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("shortcut '{0}' has no path")]
    EmptyPath(String),
    #[error("failed to open {target}: {source}")]
    Open {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// What selecting a record does, decided before touching the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// Hand a URL to the default browser.
    Browser(String),
    /// Hand a path to the OS default handler.
    Default(String),
    /// Run a program directly with arguments.
    Program { program: String, args: Vec<String> },
    /// Run a command line through the shell.
    Shell(String),
}

static WINDOWS_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z_][A-Za-z0-9_()]*)%").expect("static regex"));

/// Expands `~`, `$VAR`, `${VAR}` and `%VAR%`. Unknown variables stay as
/// written.
pub fn expand_env(input: &str) -> String {
    let lookup = |name: &str| std::env::var(name).ok();
    let windows = WINDOWS_VAR.replace_all(input, |caps: &regex::Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    let home = || directories::BaseDirs::new().map(|d| d.home_dir().to_string_lossy().into_owned());
    shellexpand::full_with_context_no_errors(&windows, home, lookup).into_owned()
}

pub fn plan(record: &ShortcutRecord) -> Result<Launch, ExecError> {
    let path = expand_env(record.path.trim());
    if path.is_empty() {
        return Err(ExecError::EmptyPath(record.keyword.clone()));
    }

    let launch = match record.kind {
        ShortcutType::Url => Launch::Browser(path),
        ShortcutType::Folder => Launch::Default(path),
        ShortcutType::File => {
            let app = record.open_with().map(expand_env);
            match app {
                Some(app) if Path::new(&app).exists() => Launch::Program {
                    program: app,
                    args: vec![path],
                },
                _ => Launch::Default(path),
            }
        }
        ShortcutType::App => Launch::Shell(path),
    };
    Ok(launch)
}

pub fn perform(launch: &Launch) -> Result<(), ExecError> {
    match launch {
        Launch::Browser(target) | Launch::Default(target) => {
            open::that_detached(target).map_err(|source| ExecError::Open {
                target: target.clone(),
                source,
            })
        }
        Launch::Program { program, args } => {
            let mut command = Command::new(program);
            command.args(args);
            spawn_detached(command).map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })
        }
        Launch::Shell(line) => spawn_detached(shell_command(line)).map_err(|source| ExecError::Spawn {
            program: line.clone(),
            source,
        }),
    }
}

/// Fire-and-forget: any failure is logged, never returned to the host.
pub fn execute(record: &ShortcutRecord) {
    let result = plan(record).and_then(|launch| {
        info!("Executing '{}': {:?}", record.keyword, launch);
        perform(&launch)
    });
    if let Err(e) = result {
        error!("Error executing shortcut: {}", e);
    }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}

fn spawn_detached(mut command: Command) -> io::Result<()> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    // New session so the launched program survives the plugin process exiting.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()
                    .map(|_| ())
                    .map_err(io::Error::from)
            });
        }
    }

    command.spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn expands_all_variable_styles() {
        // SAFETY: test-local variable names, not read concurrently elsewhere.
        unsafe {
            std::env::set_var("SHORTCUTS_TEST_ROOT", "/srv/data");
        }
        assert_eq!(expand_env("$SHORTCUTS_TEST_ROOT/a"), "/srv/data/a");
        assert_eq!(expand_env("${SHORTCUTS_TEST_ROOT}/b"), "/srv/data/b");
        assert_eq!(expand_env("%SHORTCUTS_TEST_ROOT%\\c"), "/srv/data\\c");
    }

    #[test]
    fn unknown_variables_are_left_alone() {
        assert_eq!(expand_env("%SHORTCUTS_NOPE_123%\\x"), "%SHORTCUTS_NOPE_123%\\x");
        assert_eq!(expand_env("$SHORTCUTS_NOPE_123/x"), "$SHORTCUTS_NOPE_123/x");
        assert_eq!(expand_env("https://example.com/?q=100%"), "https://example.com/?q=100%");
    }

    #[test]
    fn plan_by_type() {
        let url = ShortcutRecord::new("gh", ShortcutType::Url, "https://github.com");
        assert_eq!(plan(&url).unwrap(), Launch::Browser("https://github.com".into()));

        let folder = ShortcutRecord::new("tmp", ShortcutType::Folder, "/tmp");
        assert_eq!(plan(&folder).unwrap(), Launch::Default("/tmp".into()));

        let app = ShortcutRecord::new("top", ShortcutType::App, "htop --tree");
        assert_eq!(plan(&app).unwrap(), Launch::Shell("htop --tree".into()));
    }

    #[test]
    fn file_uses_open_with_only_when_it_exists() {
        let dir = tempdir().unwrap();
        let viewer = dir.path().join("viewer");
        std::fs::write(&viewer, b"").unwrap();

        let mut file = ShortcutRecord::new("notes", ShortcutType::File, "/tmp/notes.md");
        assert_eq!(plan(&file).unwrap(), Launch::Default("/tmp/notes.md".into()));

        file.open_with = Some(viewer.to_string_lossy().into_owned());
        assert_eq!(
            plan(&file).unwrap(),
            Launch::Program {
                program: viewer.to_string_lossy().into_owned(),
                args: vec!["/tmp/notes.md".into()],
            }
        );

        file.open_with = Some(dir.path().join("missing").to_string_lossy().into_owned());
        assert_eq!(plan(&file).unwrap(), Launch::Default("/tmp/notes.md".into()));
    }

    #[test]
    fn empty_path_is_rejected_not_launched() {
        let rec = ShortcutRecord::new("blank", ShortcutType::App, "   ");
        assert!(matches!(plan(&rec), Err(ExecError::EmptyPath(_))));
        // Logged, not propagated.
        execute(&rec);
    }
}
