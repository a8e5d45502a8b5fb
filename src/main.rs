//! Terminal chat client for a textgen backend.
//!
//! One line is one prompt; a trailing `\` continues the message on the
//! next line. `/settings` opens the settings dialog, `/reload` clears the
//! session, `/quit` exits.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use client::flow::validate_prompt;
use client::{SubmitClient, SubmitError, SubmitFlow, SubmitReport};
use log::warn;
use settings::dialog::{DialogEffect, DialogEvent, SettingsDialog};
use settings::{Settings, SettingsStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use transcript::{ReplyState, Transcript};

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    log4rs::init_file("log4rs.yaml", Default::default())?;

    let config_dir = dirs::config_dir()
        .context("no config directory for this platform")?
        .join("textgen-chat");
    let app_config: AppConfig =
        settings::load_json_data(AppConfig::default(), config_dir.join("config.json"))?;
    let store = SettingsStore::default_location()?;

    // Settings fields are populated once here, at startup.
    let mut dialog = SettingsDialog::new(store.load());

    let mut client = SubmitClient::new(
        &app_config.base_url,
        &app_config.generate_path,
        app_config.encoding,
    )?;
    if let Err(e) = client.discover_csrf().await {
        warn!("token discovery failed, continuing without one: {}", e);
    }

    let mut flow = SubmitFlow::new(
        app_config.max_prompt_len,
        app_config.success_policy,
        app_config.max_attempts,
        Duration::from_millis(app_config.retry_delay_ms),
    );
    let mut transcript = Transcript::new();

    println!("connected to {}", app_config.base_url);
    println!("/settings to edit generation settings, /reload to clear, /quit to exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_input = String::new();

    show_prompt(&pending_input, dialog.is_open())?;
    while let Some(line) = lines.next_line().await? {
        if dialog.is_open() {
            dialog_line(&mut dialog, &store, &line);
            show_prompt(&pending_input, dialog.is_open())?;
            continue;
        }

        // trailing backslash continues the message on the next line
        if let Some(head) = line.strip_suffix('\\') {
            pending_input.push_str(head);
            pending_input.push('\n');
            show_prompt(&pending_input, false)?;
            continue;
        }
        let full = format!("{}{}", std::mem::take(&mut pending_input), line);

        match full.trim() {
            "/quit" | "/exit" => break,
            "/settings" => {
                if let Err(e) = dialog.handle(DialogEvent::Open, &store) {
                    eprintln!("could not open settings: {}", e);
                } else {
                    show_dialog(&dialog);
                }
            }
            "/reload" => {
                if let Err(e) = client.fetch_page().await {
                    eprintln!("reload failed: {}", e);
                }
                transcript.clear();
                println!("(session cleared)");
            }
            _ => {
                submit(
                    &full,
                    dialog.settings(),
                    app_config.max_prompt_len,
                    &mut flow,
                    &client,
                    &mut transcript,
                    &mut std::io::stdout(),
                )
                .await?;
            }
        }
        show_prompt(&pending_input, dialog.is_open())?;
    }

    Ok(())
}

async fn submit(
    prompt: &str,
    settings: &Settings,
    max_prompt_len: usize,
    flow: &mut SubmitFlow,
    client: &SubmitClient,
    transcript: &mut Transcript,
    out: &mut impl Write,
) -> Result<()> {
    // a prompt that will not be submitted gets no pending slot
    match validate_prompt(prompt, max_prompt_len) {
        Ok(_) => {}
        Err(SubmitError::EmptyPrompt) => return Ok(()),
        Err(e) => {
            writeln!(out, " !! {}", e)?;
            return Ok(());
        }
    }

    // the user bubble is the echoed input line; this is the pending slot
    writeln!(out, " ai> ...")?;

    let report = flow.submit(prompt, settings, client, transcript).await;

    match report {
        SubmitReport::Replied(id) | SubmitReport::Failed(id) => {
            if let Some(exchange) = transcript.get(id) {
                match &exchange.reply {
                    ReplyState::Fulfilled(text) => writeln!(out, " ai> {}", text)?,
                    ReplyState::Errored(text) => writeln!(out, " ai> !! {}", text)?,
                    ReplyState::Pending => {}
                }
            }
        }
        SubmitReport::Rejected(message) => writeln!(out, " !! {}", message)?,
        SubmitReport::Reloaded => writeln!(out, "(page reloaded, session cleared)")?,
        SubmitReport::Skipped | SubmitReport::Busy => {}
    }
    Ok(())
}

fn dialog_line(dialog: &mut SettingsDialog, store: &SettingsStore, line: &str) {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("set ") {
        match rest.split_once(' ') {
            Some((field, value)) => {
                if let Err(e) = dialog.set_field(field.trim(), value.trim()) {
                    println!(" !! {}", e);
                }
            }
            None => println!(" !! usage: set <field> <value>"),
        }
        return;
    }

    let effect = match line {
        "save" => dialog.handle(DialogEvent::Save, store),
        "cancel" => dialog.handle(DialogEvent::Cancel, store),
        "close" => dialog.handle(DialogEvent::CloseButton, store),
        "" => {
            show_dialog(dialog);
            return;
        }
        other => {
            println!(" !! unknown command: {}", other);
            return;
        }
    };

    match effect {
        Ok(DialogEffect::Saved) => println!("Settings saved successfully!"),
        Ok(DialogEffect::Closed) => println!("(settings closed, changes discarded)"),
        Ok(_) => {}
        Err(e) => println!(" !! saving settings failed: {}", e),
    }
}

fn show_dialog(dialog: &SettingsDialog) {
    let draft = dialog.draft();
    println!("-- settings (set <field> <value>, save, cancel) --");
    println!("  role        = {}", draft.role);
    println!("  seed        = {}", draft.seed);
    println!("  temperature = {}", draft.temperature);
    println!("  model_path  = {}", draft.model_path);
    println!("  max_tokens  = {}", draft.max_tokens);
    println!("  top_p       = {}", draft.top_p);
    println!("  top_k       = {}", draft.top_k);
}

fn prompt_label(pending: &str, dialog_open: bool) -> &'static str {
    if dialog_open {
        "set> "
    } else if pending.is_empty() {
        "you> "
    } else {
        "...> "
    }
}

fn show_prompt(pending: &str, dialog_open: bool) -> Result<()> {
    print!("{}", prompt_label(pending, dialog_open));
    std::io::stdout().flush()?;
    Ok(())
}
