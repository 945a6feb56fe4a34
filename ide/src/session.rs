//! Interactive terminal session.
//!
//! Reads commands line by line and drives a [`Controller`]. Run settlements are
//! printed as soon as they arrive, while the session keeps accepting edits.
//!
//! ```text
//! :lang python
//! :code
//! print(input())
//! .
//! :input hello
//! :run
//! ```

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::controller::Controller;
use crate::core::render::{output_area, run_trigger};
use crate::core::types::Language;
use crate::io::buffer::read_buffer;
use crate::io::client::ExecutionClient;

/// Line that ends a `:code` block.
pub const CODE_TERMINATOR: &str = ".";

const HELP: &str = "\
commands:
  :lang <java|cpp|python>  switch language (clears the code buffer)
  :code                    enter code; finish with a line containing only `.`
  :load <path>             load code from a file
  :input <text>            set stdin
  :input-file <path>       load stdin from a file
  :run                     compile & run
  :show                    show language, buffers and output
  :languages               list languages
  :help                    show this help
  :quit                    leave the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Language(Language),
    Code,
    Load(PathBuf),
    Input(String),
    InputFile(PathBuf),
    Run,
    Show,
    Languages,
    Help,
    Quit,
}

/// Parse one command line.
pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim_start()),
        None => (line.trim(), ""),
    };
    let command = match name {
        ":lang" => Command::Language(require(name, arg)?.parse()?),
        ":code" => Command::Code,
        ":load" => Command::Load(PathBuf::from(require(name, arg)?)),
        ":input" => Command::Input(arg.to_string()),
        ":input-file" => Command::InputFile(PathBuf::from(require(name, arg)?)),
        ":run" => Command::Run,
        ":show" => Command::Show,
        ":languages" => Command::Languages,
        ":help" => Command::Help,
        ":quit" | ":q" => Command::Quit,
        "" => bail!("empty command (try :help)"),
        other => bail!("unknown command `{other}` (try :help)"),
    };
    Ok(command)
}

fn require<'a>(name: &str, arg: &'a str) -> Result<&'a str> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(anyhow!("{name} needs an argument"));
    }
    Ok(arg)
}

/// Render the `:languages` listing.
pub fn language_table() -> String {
    let mut out = String::new();
    for language in Language::ALL {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            language.as_str(),
            language.display_name(),
            language.editor_mode()
        ));
    }
    out
}

enum Mode {
    Command,
    Code(String),
}

/// Run the session until `:quit` or end of input.
///
/// At end of input an outstanding run is awaited and its output printed.
pub async fn run_session<C, R, W>(
    controller: &mut Controller<C>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    C: ExecutionClient + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut mode = Mode::Command;
    write(out, "type :help for commands\n").await?;

    loop {
        tokio::select! {
            settled = controller.next_settlement(), if controller.state().is_running() => {
                if settled.is_some_and(|settled| settled.applied()) {
                    print_output(controller, out).await?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if let Mode::Code(buf) = std::mem::replace(&mut mode, Mode::Command) {
                        controller.edit_code(buf);
                        write(out, "code block not terminated; code updated\n").await?;
                    }
                    break;
                };
                mode = match mode {
                    Mode::Code(mut buf) => {
                        if line == CODE_TERMINATOR {
                            controller.edit_code(buf);
                            write(out, "code updated\n").await?;
                            Mode::Command
                        } else {
                            buf.push_str(&line);
                            buf.push('\n');
                            Mode::Code(buf)
                        }
                    }
                    Mode::Command => match parse_command(&line) {
                        Ok(Command::Quit) => return Ok(()),
                        Ok(command) => handle(controller, command, out).await?,
                        Err(err) => {
                            write(out, &format!("error: {err:#}\n")).await?;
                            Mode::Command
                        }
                    },
                };
            }
        }
    }

    if controller.state().is_running() {
        debug!("input closed, waiting for outstanding run");
        controller.wait_idle().await;
        print_output(controller, out).await?;
    }
    Ok(())
}

async fn handle<C, W>(
    controller: &mut Controller<C>,
    command: Command,
    out: &mut W,
) -> Result<Mode>
where
    C: ExecutionClient + 'static,
    W: AsyncWrite + Unpin,
{
    match command {
        Command::Language(language) => {
            controller.select_language(language);
            write(
                out,
                &format!(
                    "language: {} (code buffer cleared)\n",
                    language.display_name()
                ),
            )
            .await?;
        }
        Command::Code => {
            write(out, "enter code, end with a line containing only `.`\n").await?;
            return Ok(Mode::Code(String::new()));
        }
        Command::Load(path) => match read_buffer(&path).await {
            Ok(code) => {
                controller.edit_code(code);
                write(out, &format!("code loaded from {}\n", path.display())).await?;
            }
            Err(err) => write(out, &format!("error: {err:#}\n")).await?,
        },
        Command::Input(text) => {
            controller.edit_input(text);
            write(out, "input updated\n").await?;
        }
        Command::InputFile(path) => match read_buffer(&path).await {
            Ok(text) => {
                controller.edit_input(text);
                write(out, &format!("input loaded from {}\n", path.display())).await?;
            }
            Err(err) => write(out, &format!("error: {err:#}\n")).await?,
        },
        Command::Run => match controller.run() {
            Some(generation) => {
                write(out, &format!("Running... (run {generation})\n")).await?;
            }
            None => write(out, "a run is already in progress\n").await?,
        },
        Command::Show => show(controller, out).await?,
        Command::Languages => write(out, &language_table()).await?,
        Command::Help => write(out, HELP).await?,
        Command::Quit => {}
    }
    Ok(Mode::Command)
}

async fn show<C, W>(controller: &Controller<C>, out: &mut W) -> Result<()>
where
    C: ExecutionClient + 'static,
    W: AsyncWrite + Unpin,
{
    let state = controller.state();
    let trigger = run_trigger(state, controller.policy());
    let mut text = format!(
        "language: {} (mode {})\n",
        state.language().display_name(),
        state.language().editor_mode()
    );
    text.push_str("--- code ---\n");
    text.push_str(state.source_code());
    if !state.source_code().ends_with('\n') {
        text.push('\n');
    }
    text.push_str("--- input ---\n");
    text.push_str(state.stdin());
    if !state.stdin().ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&format!(
        "[{}]{}\n",
        trigger.label,
        if trigger.enabled { "" } else { " (disabled)" }
    ));
    write(out, &text).await?;
    print_output(controller, out).await
}

async fn print_output<C, W>(controller: &Controller<C>, out: &mut W) -> Result<()>
where
    C: ExecutionClient + 'static,
    W: AsyncWrite + Unpin,
{
    let area = output_area(controller.state());
    let newline = if area.ends_with('\n') { "" } else { "\n" };
    write(out, &format!("--- output ---\n{area}{newline}")).await
}

async fn write<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::render::{ERROR_SENTINEL, NO_OUTPUT};
    use crate::core::state::UiState;
    use crate::core::types::{ExecutionFailure, ExecutionResult, RunPolicy};
    use crate::test_support::ScriptedClient;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command(":lang cpp").expect("lang"),
            Command::Language(Language::Cpp)
        );
        assert_eq!(
            parse_command(":input  two words ").expect("input"),
            Command::Input("two words ".to_string())
        );
        assert_eq!(parse_command(":input").expect("input"), Command::Input(String::new()));
        assert_eq!(
            parse_command(":load src/main.py").expect("load"),
            Command::Load(PathBuf::from("src/main.py"))
        );
        assert_eq!(parse_command(":run\r").expect("run"), Command::Run);
        assert_eq!(parse_command(":q").expect("quit"), Command::Quit);
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command(":lang").is_err());
        assert!(parse_command(":lang ruby").is_err());
        assert!(parse_command("print(1)").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn language_table_lists_all_languages() {
        let table = language_table();
        assert_eq!(
            table,
            "java\tJava\tjava\ncpp\tC++\tc_cpp\npython\tPython\tpython\n"
        );
    }

    async fn drive(client: Arc<ScriptedClient>, script: &str) -> String {
        let mut controller =
            Controller::new(client, UiState::new(Language::Java), RunPolicy::Ignore);
        let mut out = Vec::new();
        run_session(&mut controller, script.as_bytes(), &mut out)
            .await
            .expect("session");
        String::from_utf8(out).expect("utf8")
    }

    #[tokio::test]
    async fn code_block_then_run_prints_output() {
        let client = Arc::new(ScriptedClient::new());
        client.respond("print(input())\n", Ok(ExecutionResult::new("hello\n")));
        let script = ":lang python\n:code\nprint(input())\n.\n:input hello\n:run\n";

        let out = drive(Arc::clone(&client), script).await;
        assert!(out.contains("language: Python (code buffer cleared)"));
        assert!(out.contains("Running... (run #1)"));
        assert!(out.ends_with("--- output ---\nhello\n"), "{out}");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].language, Language::Python);
        assert_eq!(requests[0].stdin, "hello");
    }

    #[tokio::test]
    async fn failure_prints_sentinel_only() {
        let client = Arc::new(ScriptedClient::new());
        client.respond(
            "",
            Err(ExecutionFailure::Transport {
                message: "connection refused".to_string(),
            }),
        );
        let out = drive(client, ":lang cpp\n:run\n").await;
        assert!(out.contains(ERROR_SENTINEL));
        assert!(!out.contains("connection refused"));
    }

    #[tokio::test]
    async fn second_run_reports_in_progress() {
        let client = Arc::new(ScriptedClient::new());
        let gate = client.respond_gated("");
        gate.send(Ok(ExecutionResult::new(""))).expect("release");

        let out = drive(client, ":lang python\n:run\n:run\n").await;
        assert!(out.contains("a run is already in progress"));
        assert!(out.ends_with(&format!("--- output ---\n{NO_OUTPUT}\n")), "{out}");
    }

    #[tokio::test]
    async fn show_reports_trigger_and_placeholder() {
        let client = Arc::new(ScriptedClient::new());
        let out = drive(client, ":show\n:quit\n:run\n").await;
        assert!(out.contains("language: Java (mode java)"));
        assert!(out.contains("System.out.println"));
        assert!(out.contains("[Compile & Run]"));
        assert!(out.contains("Output will appear here..."));
        assert!(!out.contains("Running..."));
    }

    #[tokio::test]
    async fn unterminated_code_block_is_applied_at_end_of_input() {
        let client = Arc::new(ScriptedClient::new());
        let mut controller =
            Controller::new(client, UiState::new(Language::Python), RunPolicy::Ignore);
        let mut out = Vec::new();
        run_session(&mut controller, ":code\nprint(1)\nprint(2)".as_bytes(), &mut out)
            .await
            .expect("session");

        let out = String::from_utf8(out).expect("utf8");
        assert!(out.ends_with("code block not terminated; code updated\n"), "{out}");
        assert_eq!(controller.state().source_code(), "print(1)\nprint(2)\n");
    }

    #[tokio::test]
    async fn unknown_commands_do_not_end_session() {
        let client = Arc::new(ScriptedClient::new());
        let out = drive(client, "oops\n:languages\n").await;
        assert!(out.contains("unknown command `oops`"));
        assert!(out.contains("cpp\tC++\tc_cpp"));
    }
}
