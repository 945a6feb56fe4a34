//! Terminal client for the online compiler IDE.
//!
//! Picks a language, loads source and stdin, sends one run to the remote
//! execution service and prints the rendered result. `session` keeps an
//! interactive editing session open instead.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use compiler_ide::cli::{self, InputSource, RunOptions};
use compiler_ide::core::types::Language;
use compiler_ide::exit_codes;
use compiler_ide::io::config::DEFAULT_CONFIG_PATH;
use compiler_ide::logging;

#[derive(Parser)]
#[command(
    name = "compiler-ide",
    version,
    about = "Online compiler IDE client: edit, run remotely, see the output"
)]
struct Cli {
    /// Config file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one program and print its output.
    Run {
        /// Target language (java, cpp, python).
        #[arg(short, long)]
        language: Language,
        /// Source file, or `-` for stdin. Omitted means an empty buffer.
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Program stdin as literal text.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,
        /// Program stdin from a file.
        #[arg(long)]
        input_file: Option<PathBuf>,
        /// Execution service origin, overriding the config profile.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Interactive editing session on stdin/stdout.
    Session {
        /// Execution service origin, overriding the config profile.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// List supported languages (name, display name, editor mode).
    Languages,
    /// Write the default config file if missing.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    logging::init();
    let code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            language,
            file,
            input,
            input_file,
            endpoint,
        } => {
            let input = match (&input, &input_file) {
                (Some(text), _) => InputSource::Text(text),
                (None, Some(path)) => InputSource::File(path),
                (None, None) => InputSource::Empty,
            };
            let options = RunOptions {
                config_path: &cli.config,
                endpoint: endpoint.as_deref(),
                language,
                source: file.as_deref(),
                input,
            };
            cli::run_once(&options).await
        }
        Command::Session { endpoint } => {
            cli::run_interactive(&cli.config, endpoint.as_deref()).await?;
            Ok(exit_codes::OK)
        }
        Command::Languages => {
            cli::list_languages();
            Ok(exit_codes::OK)
        }
        Command::InitConfig { force } => {
            cli::init_config(&cli.config, force)?;
            Ok(exit_codes::OK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_inline_input() {
        let cli = Cli::parse_from([
            "compiler-ide",
            "run",
            "--language",
            "python",
            "--file",
            "main.py",
            "--input",
            "3 4",
        ]);
        match cli.command {
            Command::Run {
                language,
                file,
                input,
                input_file,
                endpoint,
            } => {
                assert_eq!(language, Language::Python);
                assert_eq!(file, Some(PathBuf::from("main.py")));
                assert_eq!(input.as_deref(), Some("3 4"));
                assert_eq!(input_file, None);
                assert_eq!(endpoint, None);
            }
            _ => panic!("expected run"),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_rejects_unknown_language() {
        let result = Cli::try_parse_from(["compiler-ide", "run", "--language", "ruby"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_rejects_both_input_sources() {
        let result = Cli::try_parse_from([
            "compiler-ide",
            "run",
            "-l",
            "cpp",
            "--input",
            "x",
            "--input-file",
            "in.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_init_config_force_with_global_config() {
        let cli = Cli::parse_from([
            "compiler-ide",
            "init-config",
            "--force",
            "--config",
            "ide.toml",
        ]);
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
        assert_eq!(cli.config, PathBuf::from("ide.toml"));
    }

    #[test]
    fn parse_session_endpoint() {
        let cli = Cli::parse_from([
            "compiler-ide",
            "session",
            "--endpoint",
            "http://127.0.0.1:5000",
        ]);
        assert!(matches!(
            cli.command,
            Command::Session { endpoint: Some(ref e) } if e == "http://127.0.0.1:5000"
        ));
    }
}
