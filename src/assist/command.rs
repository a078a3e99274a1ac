use std::{
    io::{self, Write},
    process::{Command, Stdio},
};

use crate::assist::{AssistError, TextService};

/// Runs an external program as the text service: the prompt goes to its
/// stdin, the reply is whatever it prints on stdout.
///
/// Any CLI that wraps a language model works, e.g. `["llm", "-m", "mini"]`.
#[derive(Debug, Clone, Default)]
pub struct CommandTextService {
    command: Vec<String>,
}

impl CommandTextService {
    /// An empty `command` gives a service that always answers
    /// [`AssistError::Unconfigured`].
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}

impl TextService for CommandTextService {
    fn complete(&self, prompt: &str) -> Result<String, AssistError> {
        let (program, args) = self.command.split_first().ok_or(AssistError::Unconfigured)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(AssistError::Spawn)?;

        // stdin closes at the end of this statement so the child sees EOF
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(prompt.as_bytes()));
        let output = child.wait_with_output().map_err(AssistError::Spawn)?;
        match written {
            // the program is free to answer without reading the prompt
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
            Err(err) => return Err(AssistError::Spawn(err)),
            Ok(()) => {}
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(%program, status = %output.status, "text service failed");
            return Err(AssistError::Service(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let reply = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if reply.is_empty() {
            return Err(AssistError::Service(format!("{program} printed nothing")));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_unconfigured() {
        let service = CommandTextService::default();
        assert!(!service.is_configured());
        assert!(matches!(
            service.complete("hello"),
            Err(AssistError::Unconfigured)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn prompt_goes_through_stdin() {
        let service = CommandTextService::new(vec!["cat".into()]);
        assert_eq!(service.complete("  echo me \n").unwrap(), "echo me");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_a_service_error() {
        let service = CommandTextService::new(vec![
            "sh".into(),
            "-c".into(),
            "cat >/dev/null; echo quota exceeded >&2; exit 3".into(),
        ]);
        match service.complete("x") {
            Err(AssistError::Service(msg)) => assert!(msg.contains("quota exceeded")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn command_ignoring_stdin_still_answers() {
        let service = CommandTextService::new(vec![
            "sh".into(),
            "-c".into(),
            "echo 'Open Fifth | calm'".into(),
        ]);
        // larger than a pipe buffer, so the write fails once the shell exits
        let prompt = "x".repeat(1 << 20);
        assert_eq!(service.complete(&prompt).unwrap(), "Open Fifth | calm");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let service = CommandTextService::new(vec!["tonepad-no-such-program".into()]);
        assert!(matches!(service.complete("x"), Err(AssistError::Spawn(_))));
    }
}
