//! Scripted session walkthrough against the mock platform
//! Exercises pagination navigation, authorization, and a confirm/cancel
//! selection end to end without a real chat backend.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::Config;
use crate::session::{
    Completion, Dispatcher, PaginationBuilder, SelectionBuilder, SessionBuilder,
};

use super::mock::MockPlatform;
use super::Platform;
use super::types::{ButtonSpec, ButtonStyle, ComponentEvent, MessageContent, UserRef};

const READER_ID: u64 = 7;
const STRANGER_ID: u64 = 99;

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .is_ok()
}

/// Run the demo walkthrough and print a summary
pub async fn run_demo(config: &Config) -> Result<()> {
    println!("{}", "Interactor session walkthrough".bold());
    println!();

    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), config.session_settings());
    let sweeper = dispatcher.spawn_idle_sweeper();

    let reader = UserRef::new(READER_ID, "reader");
    let stranger = UserRef::new(STRANGER_ID, "stranger");

    // --- Pagination session -------------------------------------------------
    let pages: Vec<MessageContent> = (1..=config.demo.pages)
        .map(|n| {
            MessageContent::new(
                format!("Guide | Page {} / {}", n, config.demo.pages),
                format!("Contents of page {}", n),
            )
        })
        .collect();

    let built = SessionBuilder::new()
        .with_pagination(
            PaginationBuilder::new()
                .with_pages(pages)
                .with_user(READER_ID)
                .with_default_buttons(),
        )
        .build()?;

    let session_id = built.session.id.clone();
    let buttons: Vec<String> = built
        .layout
        .buttons()
        .iter()
        .map(|b| b.custom_id.clone())
        .collect();
    anyhow::ensure!(
        buttons.len() == 5,
        "pagination layout should have five navigation buttons"
    );
    let (first, next, stop) = (buttons[0].clone(), buttons[2].clone(), buttons[4].clone());

    let initial = built.initial_page.clone().unwrap_or_default();
    let message = platform
        .send_message(config.demo.channel_id, &initial, &built.layout)
        .await?;

    anyhow::ensure!(dispatcher.register(built.session), "registration failed");
    dispatcher.bind_message(&session_id, message);

    println!(
        "Opened pagination session {} with {} pages",
        session_id.as_str().dimmed(),
        config.demo.pages
    );

    let presses = [
        ("Next", &next, &reader),
        ("Next", &next, &reader),
        ("First", &first, &reader),
        ("Next (stranger)", &next, &stranger),
    ];
    for (label, control, user) in &presses {
        let before = platform.edit_count();
        dispatcher.on_control_activated(ComponentEvent::button(
            control.as_str(),
            (*user).clone(),
            message,
        ));

        if user.id == READER_ID {
            wait_until(|| platform.edit_count() > before).await;
        } else {
            // Unauthorized clicks are silently ignored
            sleep(Duration::from_millis(100)).await;
        }

        let page = dispatcher
            .snapshot(&session_id)
            .and_then(|s| s.current_page)
            .unwrap_or_default();
        println!("  pressed {:<16} -> page {}", label, page + 1);
    }

    dispatcher.on_control_activated(ComponentEvent::button(stop.as_str(), reader.clone(), message));
    let closed = wait_until(|| !dispatcher.contains(&session_id)).await;
    println!(
        "  pressed {:<16} -> session {}",
        "Stop",
        if closed { "closed".green() } else { "still live".red() }
    );
    println!();

    // --- Confirm/cancel session ---------------------------------------------
    let (done, decision) = Completion::channel();
    let built = SessionBuilder::new()
        .add_selection(SelectionBuilder::confirm_cancel(
            ButtonSpec::labeled("Yes").with_style(ButtonStyle::Danger),
            ButtonSpec::labeled("No").with_style(ButtonStyle::Primary),
            &done,
        ))
        .build()?;

    let session_id = built.session.id.clone();
    let confirm_id = built.layout.buttons()[0].custom_id.clone();
    let prompt = MessageContent::new("Kick member?", "This cannot be undone.");
    let message = platform
        .send_message(config.demo.channel_id, &prompt, &built.layout)
        .await?;

    anyhow::ensure!(dispatcher.register(built.session), "registration failed");
    dispatcher.bind_message(&session_id, message);

    println!(
        "Opened confirm/cancel session {}",
        session_id.as_str().dimmed()
    );
    dispatcher.on_control_activated(ComponentEvent::button(confirm_id, reader, message));

    let confirmed = timeout(Duration::from_secs(2), decision)
        .await
        .context("no decision arrived")??;
    wait_until(|| !dispatcher.contains(&session_id)).await;
    println!(
        "  pressed {:<16} -> decision {}",
        "Yes",
        if confirmed { "confirmed".green() } else { "cancelled".yellow() }
    );
    println!();

    // --- Summary ------------------------------------------------------------
    sweeper.abort();
    let stats = dispatcher.stats();

    println!("{}", "Walkthrough Results Summary".bold());
    println!("  Sessions registered: {}", stats.sessions_registered);
    println!("  Sessions removed:    {}", stats.sessions_removed);
    println!("  Events processed:    {}", stats.events_processed);
    println!("  Unknown controls:    {}", stats.unknown_controls);
    println!("  Handler errors:      {}", stats.handler_errors);
    println!("  Message edits:       {}", platform.edit_count());
    println!("  Layouts stripped:    {}", platform.layout_removals().len());

    let sent_messages = platform.sent();
    if let Some(sent) = sent_messages.first() {
        let rendered = serde_json::to_string_pretty(&sent.layout)
            .context("failed to render layout as JSON")?;
        println!();
        println!("First rendered layout:");
        println!("{}", rendered.as_str().dimmed());
    }

    Ok(())
}
