use crate::core::error::ShopError;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Completes `/command` names.
pub struct ShopHelper {
    command_names: Vec<String>,
    history_hinter: HistoryHinter,
}

impl ShopHelper {
    pub fn new(command_names: Vec<String>) -> Self {
        Self {
            command_names,
            history_hinter: HistoryHinter {},
        }
    }
}

impl Completer for ShopHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let Some(typed) = line.get(1..pos).filter(|_| line.starts_with('/')) else {
            return Ok((pos, Vec::new()));
        };
        if typed.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let matches = self
            .command_names
            .iter()
            .filter(|cmd| cmd.starts_with(typed))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((1, matches))
    }
}

impl Hinter for ShopHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.history_hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ShopHelper {}

impl Validator for ShopHelper {}

impl Helper for ShopHelper {}

fn create_editor(command_names: Vec<String>) -> Result<Editor<ShopHelper, DefaultHistory>, ShopError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| ShopError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ShopHelper::new(command_names)));
    Ok(editor)
}

enum InputEvent {
    Line(String),
    Eof,
    Failed(String),
}

/// Reads lines on a dedicated thread so the async side keeps running
/// (polling included) while the user types.
pub struct InputReader {
    prompts: mpsc::Sender<String>,
    events: UnboundedReceiver<InputEvent>,
}

impl InputReader {
    /// Uses a line editor when `interactive`, plain stdin lines otherwise.
    pub fn spawn(command_names: Vec<String>, interactive: bool) -> Self {
        let (prompt_tx, prompt_rx) = mpsc::channel::<String>();
        let (event_tx, event_rx) = unbounded_channel();

        thread::spawn(move || {
            if interactive {
                run_editor(command_names, prompt_rx, event_tx);
            } else {
                run_plain(prompt_rx, event_tx);
            }
        });

        Self {
            prompts: prompt_tx,
            events: event_rx,
        }
    }

    /// `Ok(None)` on end of input (Ctrl-D, Ctrl-C, closed stdin).
    pub async fn read_line(&mut self, prompt: String) -> Result<Option<String>, ShopError> {
        if self.prompts.send(prompt).is_err() {
            return Ok(None);
        }
        match self.events.recv().await {
            Some(InputEvent::Line(line)) => Ok(Some(line)),
            Some(InputEvent::Eof) | None => Ok(None),
            Some(InputEvent::Failed(e)) => Err(ShopError::Input(e)),
        }
    }
}

fn run_editor(
    command_names: Vec<String>,
    prompts: mpsc::Receiver<String>,
    events: UnboundedSender<InputEvent>,
) {
    let mut editor = match create_editor(command_names) {
        Ok(editor) => editor,
        Err(e) => {
            let _ = events.send(InputEvent::Failed(e.to_string()));
            return;
        }
    };

    while let Ok(prompt) = prompts.recv() {
        let event = match editor.readline(&prompt) {
            Ok(line) => InputEvent::Line(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(err) => InputEvent::Failed(err.to_string()),
        };
        let done = !matches!(event, InputEvent::Line(_));
        if events.send(event).is_err() || done {
            break;
        }
    }
}

fn run_plain(prompts: mpsc::Receiver<String>, events: UnboundedSender<InputEvent>) {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    while prompts.recv().is_ok() {
        let event = match lines.next() {
            Some(Ok(line)) => InputEvent::Line(line),
            Some(Err(e)) => InputEvent::Failed(e.to_string()),
            None => InputEvent::Eof,
        };
        let done = !matches!(event, InputEvent::Line(_));
        if events.send(event).is_err() || done {
            break;
        }
    }
}
