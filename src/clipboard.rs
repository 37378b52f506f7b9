use std::io::{self, Write};
use std::process::{Command, Stdio};
use log::{debug, error};

/// Clipboard helpers, in the order they are tried. On Linux and macOS the
/// helper keeps serving the selection after this process exits, so they go
/// before the native clipboard.
#[cfg(target_os = "linux")]
const HELPERS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

#[cfg(target_os = "macos")]
const HELPERS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(windows)]
const HELPERS: &[&[&str]] = &[
    &["powershell", "-NoProfile", "-Command", "$input | Set-Clipboard"],
    &["clip"],
];

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
const HELPERS: &[&[&str]] = &[];

/// One way of getting text onto the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Native,
    Helper(&'static [&'static str]),
}

/// Windows owns its clipboard independently of the writer, so `arboard` can
/// go first there. Elsewhere the selection dies with the owning process.
fn methods() -> Vec<Method> {
    let helpers = HELPERS.iter().map(|&argv| Method::Helper(argv));
    if cfg!(windows) {
        std::iter::once(Method::Native).chain(helpers).collect()
    } else {
        helpers.chain(std::iter::once(Method::Native)).collect()
    }
}

fn copy_native(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())
}

// The text goes over stdin so it never passes through a shell.
fn copy_with(argv: &[&str], text: &str) -> io::Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {}", program, status)))
    }
}

/// Best effort. Returns whether any mechanism accepted the text.
pub fn copy_to_clipboard(text: &str) -> bool {
    for method in methods() {
        let result = match method {
            Method::Native => copy_native(text).map_err(|e| e.to_string()),
            Method::Helper(argv) => copy_with(argv, text).map_err(|e| e.to_string()),
        };
        match result {
            Ok(()) => {
                debug!("Copied {} bytes to clipboard via {:?}", text.len(), method);
                return true;
            }
            Err(e) => debug!("{:?} failed: {}", method, e),
        }
    }

    error!("Could not copy to clipboard");
    false
}
