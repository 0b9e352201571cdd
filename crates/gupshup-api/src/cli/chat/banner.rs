//! Welcome banner display for chat sessions.

use console::style;

use gupshup_types::persona::Persona;

/// Strip markdown heading markers so the heading reads as plain text.
fn plain_heading(heading: &str) -> &str {
    heading.trim_start_matches('#').trim()
}

/// Print the banner at the start of a chat session.
///
/// Shows the persona's icon, heading and tagline, then the model and a
/// shortened session id.
pub fn print_welcome_banner(persona: &Persona, model: &str, session_id: &str) {
    println!();
    println!(
        "  {} {}",
        persona.page_icon,
        style(plain_heading(&persona.heading)).cyan().bold()
    );
    if !persona.tagline.is_empty() {
        println!("  {}", style(&persona.tagline).dim());
    }
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_heading() {
        assert_eq!(plain_heading("# 🧳 Trip Planner"), "🧳 Trip Planner");
        assert_eq!(plain_heading("Rishta Aunty"), "Rishta Aunty");
    }
}
