use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use crate::config::Config;
use crate::conversation::{ConversationController, Event, Reply};
use crate::subscription::JsonStore;

const COMMANDS: [&str; 5] = ["/start", "/cancel", "/status", "/help", "/exit"];

pub async fn handle_shell(user_id: String, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let passkeys = config.passkeys()?;
    let store = JsonStore::new(config.subscriptions_file());
    let controller = ConversationController::new(passkeys, store);

    let mut shell = ShellMode::new(config, controller, user_id)?;
    shell.run()
}

/// Local console transport for the conversation flow.
pub struct ShellMode {
    config: Config,
    controller: ConversationController<JsonStore>,
    user_id: String,
    editor: Editor<ShellCompleter, DefaultHistory>,
}

struct ShellCompleter;

impl Helper for ShellCompleter {}

impl Hinter for ShellCompleter {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellCompleter {}

impl Validator for ShellCompleter {}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((0, Vec::new()));
        }

        let word = &line[..pos];
        let matches: Vec<Pair> = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(word))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl ShellMode {
    pub fn new(
        config: Config,
        controller: ConversationController<JsonStore>,
        user_id: String,
    ) -> Result<Self> {
        let mut editor = Editor::with_config(rustyline::Config::builder().build())?;
        editor.set_helper(Some(ShellCompleter));

        let history_file = config.data_dir.join("shell_history.txt");
        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(ShellMode {
            config,
            controller,
            user_id,
            editor,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", "🎰 Mines Predictor Shell".cyan().bold());
        println!("{}: {}", "User".green().bold(), self.user_id);
        println!(
            "{}",
            "Type /start to begin, /help for commands, /exit to quit".dimmed()
        );

        loop {
            let readline = self.editor.readline("minebot> ");

            match readline {
                Ok(line) => {
                    let input = line.trim();

                    if input.is_empty() {
                        continue;
                    }

                    self.editor
                        .add_history_entry(input)
                        .context("Failed to add to history")?;

                    if matches!(input, "/exit" | "/quit" | "exit" | "quit") {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }

                    if let Err(e) = self.handle_input(input) {
                        println!("{}: {}", "Error".red().bold(), e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "Use /exit or Ctrl+D to quit".yellow());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("\n{}", "Goodbye!".cyan());
                    break;
                }
                Err(err) => {
                    println!("{}: {}", "Input error".red().bold(), err);
                    break;
                }
            }
        }

        self.save_history()
    }

    fn handle_input(&mut self, input: &str) -> Result<()> {
        match input {
            "/help" => {
                self.show_help();
                Ok(())
            }
            "/status" => {
                let status = self.controller.status(&self.user_id)?;
                println!("{}", status);
                Ok(())
            }
            "/start" => self.dispatch(Event::Start),
            "/cancel" => self.dispatch(Event::Cancel),
            command if command.starts_with('/') => {
                println!(
                    "{}",
                    format!("Unknown command: {}. Type /help for commands.", command).red()
                );
                Ok(())
            }
            text => self.dispatch(Event::Text(text)),
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<()> {
        let replies = self.controller.handle(&self.user_id, event)?;
        self.render_replies(replies)
    }

    fn render_replies(&self, replies: Vec<Reply>) -> Result<()> {
        for reply in replies {
            match reply {
                Reply::Text(text) => {
                    println!("{} {}", "Bot:".green().bold(), text);
                }
                Reply::PlanMenu { text, options } => {
                    println!("{} {}", "Bot:".green().bold(), text);
                    for (label, plan) in options {
                        let token = plan.to_string().to_lowercase();
                        println!("  {} {}", format!("[{}]", token).yellow(), label);
                    }
                    println!("{}", "Type a plan name to choose.".dimmed());
                }
                Reply::Photo { png, caption } => {
                    let path = self.save_prediction(&png)?;
                    println!("{} {}", "Bot:".green().bold(), caption);
                    println!("🖼️  Image saved to {}", path.display());
                }
            }
        }
        Ok(())
    }

    fn save_prediction(&self, png: &[u8]) -> Result<PathBuf> {
        let dir = self.config.predictions_dir();
        std::fs::create_dir_all(&dir).context("Failed to create predictions directory")?;

        let path = dir.join(format!("tiles_{}.png", Utc::now().format("%Y%m%d_%H%M%S")));
        std::fs::write(&path, png).context("Failed to write prediction image")?;

        Ok(path)
    }

    fn show_help(&self) {
        println!("{}", "Commands:".cyan().bold());
        println!("  {:<10} - Choose a plan and start predicting", "/start".yellow());
        println!("  {:<10} - Cancel the current conversation", "/cancel".yellow());
        println!("  {:<10} - Show plan, expiry and daily usage", "/status".yellow());
        println!("  {:<10} - Show this help message", "/help".yellow());
        println!("  {:<10} - Leave the shell", "/exit".yellow());
        println!();
        println!(
            "{}",
            "Anything else is sent to the bot as a message.".dimmed()
        );
    }

    fn save_history(&mut self) -> Result<()> {
        let history_file = self.config.data_dir.join("shell_history.txt");
        self.editor
            .save_history(&history_file)
            .context("Failed to save shell history")
    }
}
