//! Operator terminal for the session and the confirmation gate.
//!
//! Prompts go through `inquire` when both stdin and stdout are terminals.
//! Otherwise input is read line by line from stdin, which keeps sessions
//! scriptable (`printf '7\nq\n' | reposync`).

use std::cell::Cell;
use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;
use inquire::{Confirm as ConfirmPrompt, Select, Text};
use reposync_core::gate::is_affirmative;
use reposync_core::session::MENU;
use reposync_core::{Confirm, OperationKind, Outcome, Preview, RepositoryState, Terminal};

use crate::output;

/// How the terminal reads operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Rich prompts on a TTY.
    Prompt,
    /// One line of stdin per answer.
    Lines,
}

impl InputMode {
    /// Pick the mode from the attached streams.
    #[must_use]
    pub fn detect() -> Self {
        if io::stdin().is_terminal() && io::stdout().is_terminal() {
            Self::Prompt
        } else {
            Self::Lines
        }
    }
}

/// The real terminal.
pub struct CliTerminal {
    mode: InputMode,
    assume_yes: bool,
    /// Output since the last menu that the next redraw must not clear.
    keep_screen: Cell<bool>,
}

impl CliTerminal {
    /// Create a terminal; with `assume_yes` confirmations are answered
    /// automatically after the preview is shown.
    #[must_use]
    pub fn new(assume_yes: bool) -> Self {
        Self {
            mode: InputMode::detect(),
            assume_yes,
            keep_screen: Cell::new(false),
        }
    }

    fn read_plain(prompt: Option<&str>) -> Option<String> {
        if let Some(prompt) = prompt {
            print!("{prompt}: ");
            let _ = io::stdout().flush();
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                None
            }
        }
    }
}

impl Confirm for CliTerminal {
    fn render(&self, preview: &Preview) {
        output::essential(&format!("{} {}", "!".yellow(), preview.title.bold()));
        for item in &preview.items {
            output::essential(&format!("    {item}"));
        }
    }

    fn ask(&self, prompt: &str) -> bool {
        if self.assume_yes {
            output::info(&format!("{prompt} yes (--yes)"));
            return true;
        }
        match self.mode {
            InputMode::Prompt => ConfirmPrompt::new(prompt)
                .with_default(false)
                .prompt()
                .unwrap_or(false),
            InputMode::Lines => Self::read_plain(Some(&format!("{prompt} [y/N]")))
                .is_some_and(|answer| is_affirmative(&answer)),
        }
    }
}

impl Terminal for CliTerminal {
    fn render_state(&self, state: &RepositoryState) {
        if self.mode == InputMode::Prompt && !self.keep_screen.replace(false) {
            let _ = console::Term::stdout().clear_screen();
        }
        println!();
        println!("  {}", "reposync".bold());
        output::hr();
        println!("  {}", output::state_line(state));
        if let Some(url) = &state.remote_url {
            println!("  {}", url.dimmed());
        }
        output::hr();
    }

    fn render_menu(&self, last: Option<OperationKind>) {
        for (token, label) in MENU {
            match (token, last) {
                ("r", Some(kind)) => println!("  {token:>3}  {label} ({kind})"),
                ("r", None) => println!("  {}", format!("{token:>3}  {label}").dimmed()),
                _ => println!("  {token:>3}  {label}"),
            }
        }
        println!();
    }

    fn read_command(&self) -> Option<String> {
        match self.mode {
            InputMode::Prompt => Text::new("Choose an action:").prompt().ok(),
            InputMode::Lines => Self::read_plain(None),
        }
    }

    fn read_line(&self, prompt: &str) -> Option<String> {
        match self.mode {
            InputMode::Prompt => Text::new(prompt).prompt().ok(),
            InputMode::Lines => Self::read_plain(Some(prompt)),
        }
    }

    fn choose(&self, prompt: &str, options: &[&str]) -> Option<usize> {
        match self.mode {
            InputMode::Prompt => Select::new(prompt, options.to_vec())
                .raw_prompt()
                .ok()
                .map(|choice| choice.index),
            InputMode::Lines => {
                for (i, option) in options.iter().enumerate() {
                    println!("  {:>3}  {option}", i + 1);
                }
                let answer = Self::read_plain(Some(prompt))?;
                answer
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .filter(|i| *i < options.len())
            }
        }
    }

    fn show_lines(&self, title: &str, lines: &[String]) {
        self.keep_screen.set(true);
        output::essential(&format!("  {}", title.bold()));
        if lines.is_empty() {
            output::essential(&format!("    {}", "(none)".dimmed()));
        }
        for line in lines {
            output::essential(&format!("    {line}"));
        }
    }

    fn render_outcome(&self, kind: OperationKind, outcome: &Outcome) {
        self.keep_screen.set(true);
        output::outcome(kind, outcome);
    }

    fn notice(&self, message: &str) {
        self.keep_screen.set(true);
        output::warn(message);
    }

    fn capturing(&self, remote: &str, capture: &dyn Fn() -> RepositoryState) -> RepositoryState {
        output::with_spinner(&format!("Fetching from {remote}..."), capture)
    }
}
