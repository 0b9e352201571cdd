//! Core chat loop.
//!
//! Each line goes through the turn controller: slash commands are handled
//! here, everything else is planned, streamed to the terminal and then
//! committed to the session.

use std::time::{Duration, Instant};

use console::style;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use gupshup_core::chat::{ChatSession, Reply, TurnOutcome, TurnPlan};
use gupshup_observe::genai_attrs::{chat_turn_span, record_usage};
use gupshup_types::chat::EntryKind;
use gupshup_types::llm::StreamEvent;

use crate::cli::chat::banner::print_welcome_banner;
use crate::cli::chat::commands::{self, ChatCommand};
use crate::cli::chat::input::{ChatInput, InputEvent};
use crate::cli::chat::renderer::ChatRenderer;
use crate::state::AppState;

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run the interactive chat loop until an exit keyword, `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let controller = &state.controller;
    let persona = controller.persona();
    let mut session = state.start_session();

    info!(session_id = %session.id(), persona = %persona.slug, "Chat session started");

    print_welcome_banner(persona, controller.model(), &session.id().to_string());

    let renderer = ChatRenderer::new(&persona.name);
    if let Some(welcome) = session
        .transcript()
        .iter()
        .find(|entry| entry.kind == EntryKind::Welcome)
    {
        renderer.print_assistant_message(&welcome.text);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let line = match chat_input.read_line().await {
            InputEvent::Message(text) => text,
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
        };

        if let Some(cmd) = commands::parse(&line) {
            match cmd {
                ChatCommand::Help => commands::print_help(controller.exit_keywords().as_slice()),
                ChatCommand::Clear => {
                    session.clear_memory();
                    chat_input.clear();
                    println!("  {}", style("Memory cleared. The conversation starts fresh.").dim());
                }
                ChatCommand::History => renderer.print_memory(session.memory()),
                ChatCommand::Transcript => renderer.print_transcript(&session),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        if run_turn(state, &renderer, &mut session, &line).await {
            break;
        }
    }

    chat_input.flush();
    info!(
        session_id = %session.id(),
        turns = session.turn_count(),
        input_tokens = session.usage().input_tokens,
        output_tokens = session.usage().output_tokens,
        "Chat session ended"
    );
    Ok(())
}

/// Run one turn. Returns true when the conversation should end.
async fn run_turn(
    state: &AppState,
    renderer: &ChatRenderer,
    session: &mut ChatSession,
    input: &str,
) -> bool {
    let controller = &state.controller;
    let span = chat_turn_span(session.id());

    let request = match controller.plan(session, input) {
        TurnPlan::Ignore => return false,
        TurnPlan::Exit { .. } => {
            if let TurnOutcome::Farewell { text } =
                span.in_scope(|| controller.commit_exit(session, input))
            {
                renderer.print_assistant_message(&text);
            }
            return true;
        }
        TurnPlan::Generate { request } => request,
    };

    let spinner = thinking_spinner();
    let start = Instant::now();
    let mut stream = controller.stream(request);
    let mut reply = Reply::default();
    let mut failure = None;
    let mut first_token = true;

    while let Some(event) = stream.next().await {
        match event {
            Ok(StreamEvent::Done) => break,
            Ok(event) => {
                if let StreamEvent::TextDelta { text } = &event {
                    if first_token {
                        spinner.finish_and_clear();
                        renderer.print_bot_label();
                        first_token = false;
                    }
                    renderer.print_streaming_token(text);
                }
                reply.absorb(&event);
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    if first_token {
        spinner.finish_and_clear();
    }

    let result = match failure {
        Some(err) => Err(err),
        None => Ok(reply),
    };
    match span.in_scope(|| controller.commit(session, input, result)) {
        TurnOutcome::Responded { usage, .. } => {
            record_usage(&span, usage.input_tokens, usage.output_tokens);
            let response_ms = start.elapsed().as_millis() as u64;
            println!();
            renderer.print_stats_footer(usage.output_tokens, response_ms, controller.model());
            println!();
        }
        TurnOutcome::Failed { message, .. } => {
            if !first_token {
                println!();
            }
            renderer.print_error(&message);
        }
        TurnOutcome::Ignored | TurnOutcome::Farewell { .. } => {}
    }
    false
}
