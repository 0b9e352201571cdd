//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and never reach the model.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Forget the memory window and clear the screen.
    Clear,
    /// Print the exchanges the model currently sees.
    History,
    /// Print every entry shown so far.
    Transcript,
    Exit,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/history" | "/memory" => Some(ChatCommand::History),
        "/transcript" | "/log" => Some(ChatCommand::Transcript),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help(exit_keywords: &[String]) {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}        {}", style("/help").cyan(), "Show this help message");
    println!("  {}       {}", style("/clear").cyan(), "Forget the conversation memory");
    println!("  {}     {}", style("/history").cyan(), "Show what the model remembers");
    println!("  {}  {}", style("/transcript").cyan(), "Show the full conversation");
    println!("  {}        {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!(
        "  {} {}",
        style("Saying goodbye also ends the chat:").dim(),
        style(exit_keywords.join(", ")).dim().italic()
    );
    println!("  {}", style("Ctrl+D to exit, Ctrl+C keeps the session").dim());
    println!();
}
