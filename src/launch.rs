use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_TEMPLATE: &str = r#"@path -name "@class" -title "@title" -e "@command""#;

/// What to put into the terminal command template
#[derive(Debug, Clone)]
pub struct TerminalSpec<'a> {
    /// Terminal binary; bare names are looked up in `PATH`
    pub path: &'a str,
    pub template: &'a str,
    pub title: &'a str,
    pub class: &'a str,
    /// argv run inside the terminal
    pub command: &'a [String],
    /// Extra environment for the terminal
    pub env: &'a [(String, String)],
}

/// Expand the template into the terminal's argv (path first).
pub fn build_argv(spec: &TerminalSpec<'_>, path: &str) -> Result<Vec<String>> {
    let words = shell_words::split(spec.template).map_err(|e| Error::Template {
        template: spec.template.to_string(),
        reason: e.to_string(),
    })?;

    let mut argv: Vec<String> = words
        .iter()
        .map(|word| {
            word.replace("@title", spec.title)
                .replace("@class", spec.class)
                .replace("@path", path)
        })
        .collect();

    if argv.last().map(String::as_str) == Some("@command") {
        argv.pop();
        argv.extend(spec.command.iter().cloned());
    }

    if argv.is_empty() {
        return Err(Error::Template {
            template: spec.template.to_string(),
            reason: "empty command line".to_string(),
        });
    }

    Ok(argv)
}

fn resolve(path: &str) -> Result<String> {
    if Path::new(path).is_absolute() {
        return Ok(path.to_string());
    }

    which::which(path)
        .map(|p| p.to_string_lossy().into_owned())
        .map_err(|e| Error::Spawn {
            program: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
        })
}

/// Start the terminal and leave it running. `TMUX` is removed from its environment.
pub fn spawn_terminal(spec: &TerminalSpec<'_>) -> Result<()> {
    let path = resolve(spec.path)?;
    let argv = build_argv(spec, &path)?;
    debug!(?argv, "launching terminal");

    Command::new(&argv[0])
        .args(&argv[1..])
        .env_remove("TMUX")
        .envs(spec.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: argv[0].clone(),
            source,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec<'a>(template: &'a str, command: &'a [String]) -> TerminalSpec<'a> {
        TerminalSpec {
            path: "urxvt",
            template,
            title: "marvex-3-1",
            class: "marvex",
            command,
            env: &[],
        }
    }

    #[test]
    fn test_default_template() {
        let command = vec!["tmux".to_string(), "attach".into(), "-t".into(), "marvex-3-1".into()];
        let argv = build_argv(&spec(DEFAULT_TEMPLATE, &command), "/usr/bin/urxvt").unwrap();
        assert_eq!(
            argv,
            vec![
                "/usr/bin/urxvt",
                "-name",
                "marvex",
                "-title",
                "marvex-3-1",
                "-e",
                "tmux",
                "attach",
                "-t",
                "marvex-3-1"
            ]
        );
    }

    #[test]
    fn test_command_placeholder_only_expands_last() {
        let command = vec!["sh".to_string()];
        let argv = build_argv(&spec("@path --title='@title: x'", &command), "/bin/st").unwrap();
        assert_eq!(argv, vec!["/bin/st", "--title=marvex-3-1: x"]);
    }

    #[test]
    fn test_bad_template() {
        let err = build_argv(&spec("@path 'unterminated", &[]), "/bin/st").unwrap_err();
        assert!(matches!(err, Error::Template { .. }));

        let err = build_argv(&spec("", &[]), "/bin/st").unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn test_resolve_absolute_untouched() {
        assert_eq!(resolve("/opt/term").unwrap(), "/opt/term");
        assert!(resolve("marvex-no-such-terminal-binary").is_err());
    }
}
