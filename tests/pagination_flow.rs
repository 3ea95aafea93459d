//! Pagination state machine tests for Interactor

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use interactor::platform::mock::MockPlatform;
use interactor::platform::{ComponentEvent, MessageContent, MessageRef, UserRef};
use interactor::session::{Dispatcher, PaginationBuilder, SessionBuilder, SessionSettings};

const READER_ID: u64 = 7;

fn reader() -> UserRef {
    UserRef::new(READER_ID, "reader")
}

fn message() -> MessageRef {
    MessageRef {
        channel_id: 100,
        message_id: 1,
    }
}

fn pages(n: usize) -> Vec<MessageContent> {
    (0..n)
        .map(|i| MessageContent::new(format!("p{}", i), format!("body {}", i)))
        .collect()
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}

/// Register a three-page pagination session and return its id plus the
/// navigation button ids in [First, Previous, Next, Last, Stop] order.
fn open_session(dispatcher: &Dispatcher) -> Result<(String, Vec<String>)> {
    let built = SessionBuilder::new()
        .with_pagination(
            PaginationBuilder::new()
                .with_pages(pages(3))
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
    assert_eq!(buttons.len(), 5, "expected the five default buttons");

    assert!(dispatcher.register(built.session));
    Ok((session_id, buttons))
}

fn current_page(dispatcher: &Dispatcher, session_id: &str) -> Option<usize> {
    dispatcher.snapshot(session_id).and_then(|s| s.current_page)
}

#[tokio::test]
async fn test_scenario_a_next_next_next_first() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let (session_id, buttons) = open_session(&dispatcher)?;
    let (first, next) = (buttons[0].clone(), buttons[2].clone());

    // Next, Next -> page 2
    dispatcher.on_control_activated(ComponentEvent::button(next.as_str(), reader(), message()));
    dispatcher.on_control_activated(ComponentEvent::button(next.as_str(), reader(), message()));
    assert!(wait_until(|| platform.edit_count() == 2).await);
    assert_eq!(current_page(&dispatcher, &session_id), Some(2));

    // Next at the last page stays clamped
    dispatcher.on_control_activated(ComponentEvent::button(next.as_str(), reader(), message()));
    assert!(wait_until(|| platform.edit_count() == 3).await);
    assert_eq!(current_page(&dispatcher, &session_id), Some(2));

    // First returns to page 0
    dispatcher.on_control_activated(ComponentEvent::button(first.as_str(), reader(), message()));
    assert!(wait_until(|| platform.edit_count() == 4).await);
    assert_eq!(current_page(&dispatcher, &session_id), Some(0));

    // Every re-render showed the committed page
    let titles: Vec<String> = platform
        .edits()
        .into_iter()
        .map(|(_, content)| content.title)
        .collect();
    assert_eq!(titles, vec!["p1", "p2", "p2", "p0"]);

    Ok(())
}

#[tokio::test]
async fn test_bounds_hold_for_arbitrary_sequences() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let (session_id, buttons) = open_session(&dispatcher)?;

    // First, Previous, Next, Last in a scrambled pattern; never Stop
    let sequence = [2, 2, 2, 2, 3, 1, 1, 1, 0, 3, 2, 1, 0, 2, 3, 3, 1, 2, 0, 1];
    for index in sequence {
        dispatcher.on_control_activated(ComponentEvent::button(
            buttons[index].as_str(),
            reader(),
            message(),
        ));
    }

    assert!(wait_until(|| platform.edit_count() == sequence.len()).await);

    // Each committed render was one of the three real pages
    let valid = ["p0", "p1", "p2"];
    for (_, content) in platform.edits() {
        assert!(valid.contains(&content.title.as_str()));
    }

    let page = current_page(&dispatcher, &session_id).unwrap();
    assert!(page <= 2, "page {} escaped bounds", page);

    Ok(())
}

#[tokio::test]
async fn test_first_and_last_are_idempotent() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let (session_id, buttons) = open_session(&dispatcher)?;
    let (first, last) = (buttons[0].clone(), buttons[3].clone());

    dispatcher.on_control_activated(ComponentEvent::button(last.as_str(), reader(), message()));
    dispatcher.on_control_activated(ComponentEvent::button(last.as_str(), reader(), message()));
    assert!(wait_until(|| platform.edit_count() == 2).await);
    assert_eq!(current_page(&dispatcher, &session_id), Some(2));

    dispatcher.on_control_activated(ComponentEvent::button(first.as_str(), reader(), message()));
    dispatcher.on_control_activated(ComponentEvent::button(first.as_str(), reader(), message()));
    assert!(wait_until(|| platform.edit_count() == 4).await);
    assert_eq!(current_page(&dispatcher, &session_id), Some(0));

    Ok(())
}

#[tokio::test]
async fn test_unauthorized_click_is_silent() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let (session_id, buttons) = open_session(&dispatcher)?;

    let stranger = UserRef::new(99, "stranger");
    dispatcher.on_control_activated(ComponentEvent::button(
        buttons[2].as_str(),
        stranger,
        message(),
    ));

    // No visible feedback of any kind: no edit, no notice, no page change
    sleep(Duration::from_millis(150)).await;
    assert_eq!(platform.edit_count(), 0);
    assert_eq!(platform.notice_count(), 0);
    assert_eq!(current_page(&dispatcher, &session_id), Some(0));
    assert!(dispatcher.contains(&session_id));

    Ok(())
}

#[tokio::test]
async fn test_failing_handler_leaves_state_untouched() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());

    let built = SessionBuilder::new()
        .with_pagination(
            PaginationBuilder::new()
                .with_pages(pages(3))
                .with_user(READER_ID)
                .with_default_buttons()
                .with_custom_button(
                    interactor::platform::ButtonSpec::labeled("Boom"),
                    |_, _, _| Err(interactor::session::HandlerError::Failed("boom".into())),
                ),
        )
        .build()?;

    let session_id = built.session.id.clone();
    let buttons: Vec<String> = built
        .layout
        .buttons()
        .iter()
        .map(|b| b.custom_id.clone())
        .collect();
    let (next, boom) = (buttons[2].clone(), buttons[5].clone());
    assert!(dispatcher.register(built.session));

    // Move to page 1, then hit the failing button
    dispatcher.on_control_activated(ComponentEvent::button(next.as_str(), reader(), message()));
    assert!(wait_until(|| platform.edit_count() == 1).await);

    dispatcher.on_control_activated(ComponentEvent::button(boom.as_str(), reader(), message()));
    assert!(wait_until(|| dispatcher.stats().handler_errors == 1).await);

    // The failure is contained: no render, no teardown, no page change
    assert_eq!(platform.edit_count(), 1);
    assert!(dispatcher.contains(&session_id));
    assert_eq!(current_page(&dispatcher, &session_id), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_stop_tears_the_session_down() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let (session_id, buttons) = open_session(&dispatcher)?;
    let stop = buttons[4].clone();

    dispatcher.on_control_activated(ComponentEvent::button(stop.as_str(), reader(), message()));

    assert!(wait_until(|| !dispatcher.contains(&session_id)).await);

    // Stop never changes the page, it only removes the layout
    assert_eq!(platform.edit_count(), 0);
    assert_eq!(platform.layout_removals(), vec![message()]);

    // No orphaned handler entries survive the teardown
    assert_eq!(dispatcher.handler_count(), 0);
    for id in &buttons {
        assert!(!dispatcher.contains_control(id));
    }

    Ok(())
}
