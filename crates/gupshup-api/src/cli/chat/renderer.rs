//! Terminal markdown rendering.
//!
//! During streaming, tokens are printed raw; the stats footer follows once
//! the turn is committed. Welcome, farewell and history entries are rendered
//! as formatted markdown through `termimad`.

use std::io::Write;

use console::style;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

use gupshup_core::chat::ChatSession;
use gupshup_core::memory::MemoryWindow;
use gupshup_types::chat::{EntryKind, Speaker, TranscriptEntry};

pub struct ChatRenderer {
    skin: MadSkin,
    bot_name: String,
}

impl ChatRenderer {
    pub fn new(bot_name: impl Into<String>) -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self {
            skin,
            bot_name: bot_name.into(),
        }
    }

    /// Render a complete markdown reply.
    pub fn render_final(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Print the persona's name before its reply.
    pub fn print_bot_label(&self) {
        print!("\n  {} ", style(&self.bot_name).cyan().bold());
        let _ = std::io::stdout().flush();
    }

    /// Print a single streaming token (raw, no formatting).
    pub fn print_streaming_token(&self, token: &str) {
        print!("{token}");
        let _ = std::io::stdout().flush();
    }

    /// Print a complete assistant message (welcome or farewell).
    pub fn print_assistant_message(&self, text: &str) {
        self.print_bot_label();
        println!();
        println!("  {}", self.render_final(text).trim());
        println!();
    }

    /// Print a turn failure in red.
    pub fn print_error(&self, message: &str) {
        eprintln!("\n  {} {message}", style("!").red().bold());
        eprintln!(
            "  {}",
            style("Type a message to retry, /exit to quit.").dim()
        );
    }

    /// Format: "| {tokens} tokens . {time}s . {model}"
    pub fn print_stats_footer(&self, tokens: u32, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        println!(
            "\n  {} {} tokens {} {:.1}s {} {}",
            style("|").dim(),
            style(tokens).dim(),
            style("\u{00b7}").dim(),
            style(seconds).dim(),
            style("\u{00b7}").dim(),
            style(model).dim(),
        );
    }

    /// Print the exchanges the model will see on the next turn.
    pub fn print_memory(&self, memory: &MemoryWindow) {
        println!();
        println!(
            "  {} {}/{} exchanges",
            style("Memory:").bold(),
            memory.len(),
            memory.capacity()
        );
        if memory.is_empty() {
            println!("  {}", style("(empty)").dim());
        }
        for (i, exchange) in memory.iter().enumerate() {
            println!();
            println!("  {} {}", style(format!("{}.", i + 1)).dim(), style("You").green().bold());
            println!("     {}", preview(exchange.input()));
            println!("     {}", style(&self.bot_name).cyan().bold());
            println!("     {}", preview(exchange.output()));
        }
        println!();
    }

    /// Print every transcript entry of the session.
    pub fn print_transcript(&self, session: &ChatSession) {
        println!();
        println!(
            "  {} {} entries, {} turns, {} tokens",
            style("Transcript:").bold(),
            session.transcript().len(),
            session.turn_count(),
            session.usage().input_tokens + session.usage().output_tokens,
        );
        for entry in session.transcript().iter() {
            println!("  {} {}", self.entry_label(entry), preview(&entry.text));
        }
        println!();
    }

    fn entry_label(&self, entry: &TranscriptEntry) -> String {
        let name = match entry.speaker {
            Speaker::User => style("You").green().bold().to_string(),
            Speaker::Assistant => style(self.bot_name.as_str()).cyan().bold().to_string(),
        };
        match entry.kind {
            EntryKind::Message => name,
            EntryKind::Error => format!("{} {}", name, style("[error]").red()),
            kind => format!("{} {}", name, style(format!("[{kind}]")).dim()),
        }
    }
}

/// First line of a message, cut to 80 characters.
fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(80).collect();
    if first_line.chars().count() > 80 || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}
