//! Slash commands and the read-eval loop.

use std::fmt::Write as _;
use std::path::Path;

use parley_core::bootstrap::create_provider;
use parley_core::channel::Channel;
use parley_core::config::ProviderKind;
use parley_core::input::read_upload;
use parley_core::{ChatError, ChatMode, Session, Source};

pub const HELP: &str = "\
Commands:
  /mode <basic|context|internet|documents|websites|sql>  switch mode (clears memory and sources)
  /provider <ollama|openai>  switch provider (clears memory and index)
  /models                    list models offered by the provider
  /add <path|url>            add a file (documents) or URL (websites)
  /remove <source>           remove a source
  /sources                   list current sources
  /clear                     remove all sources
  /history                   show the conversation
  /reset                     clear the conversation memory
  /help                      show this help
  /quit                      exit
Anything else is a question for the active mode.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(ChatMode),
    Provider(ProviderKind),
    Models,
    Add(String),
    Remove(String),
    Sources,
    Clear,
    History,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Command {
    /// Parse a slash command. Returns `None` for ordinary input and `Some(Err(usage))` for a
    /// malformed or unknown command.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        let required = |usage: &str| {
            if arg.is_empty() {
                Err(format!("Usage: {usage}"))
            } else {
                Ok(arg.to_owned())
            }
        };

        let cmd = match name {
            "mode" => required("/mode <mode>")
                .and_then(|m| m.parse().map(Self::Mode)),
            "provider" => required("/provider <ollama|openai>")
                .and_then(|p| p.parse().map(Self::Provider)),
            "models" => Ok(Self::Models),
            "add" => required("/add <path|url>").map(Self::Add),
            "remove" => required("/remove <source>").map(Self::Remove),
            "sources" => Ok(Self::Sources),
            "clear" => Ok(Self::Clear),
            "history" => Ok(Self::History),
            "reset" => Ok(Self::Reset),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command /{other}. Type /help for the list.")),
        };
        Some(cmd)
    }
}

fn is_url(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}

/// Run one command against the session.
///
/// # Errors
///
/// Returns provider, load and source errors for the caller to show, and channel failures.
pub async fn execute<C: Channel>(
    command: Command,
    session: &mut Session,
    channel: &mut C,
) -> Result<Flow, ChatError> {
    match command {
        Command::Mode(mode) => {
            let msg = session.switch_mode(mode);
            channel.send(&msg).await?;
            session.render_history(channel).await?;
        }
        Command::Provider(kind) => {
            let provider = create_provider(session.config(), kind)?;
            let msg = session.switch_provider(kind, provider);
            channel.send(&msg).await?;
        }
        Command::Models => {
            let models = session.list_models().await?;
            if models.is_empty() {
                channel.send("No models available.").await?;
            } else {
                let mut out = format!("Models for {}:", session.provider_kind());
                for m in &models {
                    let _ = write!(out, "\n  {m}");
                }
                channel.send(&out).await?;
            }
        }
        Command::Add(arg) => {
            let source = if is_url(&arg) {
                Source::Url(arg)
            } else {
                Source::Upload(read_upload(Path::new(&arg)).await?)
            };
            let id = source.id().to_owned();
            let msg = if session.add_source(source)? {
                format!("Added {id} ({} source(s)).", session.sources().len())
            } else {
                format!("{id} is already added.")
            };
            channel.send(&msg).await?;
        }
        Command::Remove(id) => {
            let msg = if session.remove_source(&id) {
                format!("Removed {id}.")
            } else {
                format!("No source named {id}.")
            };
            channel.send(&msg).await?;
        }
        Command::Sources => {
            let sources = session.sources();
            let msg = if sources.is_empty() {
                "No sources added.".to_owned()
            } else {
                let mut out = String::from("Sources:");
                for s in sources {
                    let _ = write!(out, "\n  {s}");
                }
                out
            };
            channel.send(&msg).await?;
        }
        Command::Clear => {
            session.clear_sources();
            channel.send("Sources cleared.").await?;
        }
        Command::History => session.render_history(channel).await?,
        Command::Reset => {
            session.reset_memory();
            channel.send("Memory cleared.").await?;
        }
        Command::Help => channel.send(HELP).await?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Read lines until EOF or `/quit`, answering questions and running commands.
///
/// Errors from a single line are shown and the loop continues.
///
/// # Errors
///
/// Returns an error only if the channel itself fails.
pub async fn repl<C: Channel>(session: &mut Session, channel: &mut C) -> anyhow::Result<()> {
    session.render_history(channel).await?;

    while let Some(msg) = channel.recv().await? {
        if msg.text.is_empty() {
            continue;
        }
        let outcome = match Command::parse(&msg.text) {
            Some(Ok(cmd)) => execute(cmd, session, channel).await,
            Some(Err(usage)) => channel
                .send(&usage)
                .await
                .map(|()| Flow::Continue)
                .map_err(ChatError::from),
            None => session
                .handle_new_input(&msg.text, channel)
                .await
                .map(|()| Flow::Continue),
        };

        match outcome {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(ChatError::Channel(e)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(mode = %session.mode(), "{e}");
                channel.send(&format!("Error: {e}")).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use parley_core::Config;
    use parley_llm::any::AnyProvider;
    use parley_llm::mock::MockProvider;

    use super::*;
    use crate::cli::CliChannel;

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(
            Command::parse("/mode sql"),
            Some(Ok(Command::Mode(ChatMode::Sql)))
        );
        assert_eq!(
            Command::parse("/provider openai"),
            Some(Ok(Command::Provider(ProviderKind::OpenAi)))
        );
        assert_eq!(
            Command::parse("  /add  docs/cv.pdf "),
            Some(Ok(Command::Add("docs/cv.pdf".into())))
        );
        assert_eq!(Command::parse("/exit"), Some(Ok(Command::Quit)));
    }

    #[test]
    fn parse_reports_usage_and_unknown() {
        assert_eq!(
            Command::parse("/add"),
            Some(Err("Usage: /add <path|url>".into()))
        );
        assert!(Command::parse("/mode nope").unwrap().unwrap_err().contains("expected one of"));
        assert!(Command::parse("/frobnicate").unwrap().unwrap_err().starts_with("Unknown command"));
    }

    fn session(mode: ChatMode, provider: MockProvider) -> Session {
        let mut config = Config::default();
        config.chat.mode = mode;
        config.llm.streaming = false;
        Session::new(config, AnyProvider::Mock(provider), ProviderKind::Ollama).unwrap()
    }

    async fn run(session: &mut Session, input: &'static str) -> String {
        let mut ch = CliChannel::new(input.as_bytes(), Vec::new());
        repl(session, &mut ch).await.unwrap();
        String::from_utf8(ch.into_output()).unwrap()
    }

    #[tokio::test]
    async fn repl_answers_and_quits() {
        let provider = MockProvider::with_responses(vec!["Paris.".into()]);
        let mut s = session(ChatMode::Context, provider);
        let out = run(&mut s, "capital of France?\n/quit\nignored\n").await;
        assert!(out.starts_with("assistant: How can I help you?\n"));
        assert!(out.contains("Paris.\n"));
        assert_eq!(s.memory().len(), 2);
    }

    #[tokio::test]
    async fn repl_shows_errors_and_keeps_going() {
        let mut s = session(ChatMode::Documents, MockProvider::default());
        let out = run(&mut s, "what is this?\n/add /no/such/file.txt\n/sources\n").await;
        assert!(out.contains("Error: no sources added yet"));
        assert!(out.contains("Error: failed to load source"));
        assert!(out.contains("No sources added."));
    }

    #[tokio::test]
    async fn add_file_and_url_follow_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "alpha").unwrap();

        let mut s = session(ChatMode::Documents, MockProvider::default());
        let mut ch = CliChannel::new(&b""[..], Vec::new());
        execute(Command::Add(path.display().to_string()), &mut s, &mut ch)
            .await
            .unwrap();
        assert_eq!(s.sources(), ["notes.txt"]);

        let err = execute(Command::Add("https://a.example".into()), &mut s, &mut ch)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::WrongSourceKind { .. }));
    }

    #[tokio::test]
    async fn mode_switch_shows_fresh_history() {
        let mut s = session(ChatMode::Context, MockProvider::default());
        let out = run(&mut s, "hi\n/mode basic\n/history\n").await;
        assert!(out.contains("Switched to basic mode"));
        assert_eq!(s.mode(), ChatMode::Basic);
        assert!(s.memory().is_empty());
        assert_eq!(out.matches("assistant: How can I help you?").count(), 3);
    }

    #[tokio::test]
    async fn openai_switch_without_key_is_reported() {
        let mut s = session(ChatMode::Context, MockProvider::default());
        let out = run(&mut s, "/provider openai\n").await;
        assert!(out.contains("Error: openai API key is not set"));
        assert_eq!(s.provider_kind(), ProviderKind::Ollama);
    }

    #[tokio::test]
    async fn models_lists_provider_models() {
        let mut s = session(ChatMode::Context, MockProvider::default().with_model("m1"));
        let out = run(&mut s, "/models\n").await;
        assert!(out.contains("Models for ollama:\n  m1"));
    }
}
