//! Interactive client REPL for a running mock server.
//!
//! Launch with `graxpert-mock-server repl` to enter interactive mode.
//! Lines without a leading `/` are sent to the server verbatim.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use crate::client::{describe_reply, MockClient, Reply};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/connect", "Connect to a mock server (default: configured URL)"),
    ("/process", "Send a PROCESS_IMAGE_REQUEST for a filename"),
    ("/send", "Send raw text as-is"),
    ("/raw", "Toggle printing raw replies next to summaries"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
#[derive(Default)]
struct MockHelper;

impl Completer for MockHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if input.starts_with('/') && !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<12} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for MockHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for MockHelper {}
impl Validator for MockHelper {}
impl Helper for MockHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Session state.
struct ReplState {
    default_url: String,
    client: Option<MockClient>,
    show_raw: bool,
}

/// Run the interactive REPL. Needs a multi-threaded tokio runtime.
pub async fn run(default_url: String) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mgraxpert-mock-server v{}\x1b[0m \x1b[90m\u{2014} interactive client\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Type \x1b[36m/process <file>\x1b[0m to request processing, any other text is sent raw. \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<MockHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(MockHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".graxpert_mock_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let mut state = ReplState {
        default_url,
        client: None,
        show_raw: false,
    };
    let prompt = " \x1b[36mgraxpert>\x1b[0m ";

    loop {
        let read = tokio::task::block_in_place(|| rl.readline(prompt));
        match read {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let Some(input) = line.strip_prefix('/') else {
                    cmd_send(line, &mut state).await;
                    continue;
                };

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "" | "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "connect" => cmd_connect(args, &mut state).await,
                    "process" => cmd_process(args, &mut state).await,
                    "send" => cmd_send(args, &mut state).await,
                    "raw" => {
                        state.show_raw = !state.show_raw;
                        eprintln!("  Raw replies: {}", if state.show_raw { "on" } else { "off" });
                    }
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    if let Some(client) = state.client.take() {
        let _ = client.close().await;
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<12} {desc}");
    }
    eprintln!();
    eprintln!("  Anything not starting with / is sent to the server unchanged.");
    eprintln!();
}

async fn cmd_connect(args: &str, state: &mut ReplState) {
    let url = if args.is_empty() {
        state.default_url.clone()
    } else {
        args.split_whitespace().next().unwrap_or(args).to_string()
    };

    if let Some(previous) = state.client.take() {
        let _ = previous.close().await;
    }

    match MockClient::connect(&url).await {
        Ok(client) => {
            eprintln!("  Connected to {url}");
            state.client = Some(client);
        }
        Err(e) => eprintln!("  Failed to connect to {url}: {e}"),
    }
}

async fn cmd_process(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /process <filename>");
        return;
    }
    let request = serde_json::json!({
        "event_type": graxpert_mock::PROCESS_IMAGE_REQUEST,
        "filename": args,
    });
    eprintln!("  \x1b[90mprocessing takes a moment...\x1b[0m");
    cmd_send(&request.to_string(), state).await;
}

async fn cmd_send(text: &str, state: &mut ReplState) {
    if state.client.is_none() {
        cmd_connect("", state).await;
    }
    let Some(client) = state.client.as_mut() else {
        return;
    };

    eprintln!("  Sending message: {text}");
    match client.roundtrip(text).await {
        Ok(reply) => {
            eprintln!("  {}", describe_reply(&reply));
            if state.show_raw {
                if let Some(raw) = reply.as_text() {
                    eprintln!("  \x1b[90m{raw}\x1b[0m");
                }
            }
            if matches!(reply, Reply::Closed { .. }) {
                state.client = None;
            }
        }
        Err(e) => {
            eprintln!("  Connection error: {e}");
            state.client = None;
        }
    }
}
