//! Multi-select menu flow tests for Interactor

use anyhow::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};

use interactor::platform::mock::MockPlatform;
use interactor::platform::{ComponentEvent, MenuOptionSpec, MessageRef, UserRef};
use interactor::session::{Dispatcher, MenuBuilder, Reaction, SessionBuilder, SessionSettings};

fn picker() -> UserRef {
    UserRef::new(5, "picker")
}

fn message() -> MessageRef {
    MessageRef {
        channel_id: 300,
        message_id: 21,
    }
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

struct MenuFixture {
    session_id: String,
    menu_id: String,
    /// Option ids in defined order: A, B, C
    option_ids: Vec<String>,
    /// Invocation counters in defined order: A, B, C
    counters: Vec<Arc<AtomicU32>>,
    /// Labels in the order callbacks actually ran
    invocations: Arc<Mutex<Vec<&'static str>>>,
}

/// Register a three-option menu; option `terminating` (if any) returns a
/// terminate reaction, the others keep the session alive.
fn open_menu(dispatcher: &Dispatcher, terminating: Option<usize>) -> Result<MenuFixture> {
    let labels = ["A", "B", "C"];
    let counters: Vec<Arc<AtomicU32>> = labels.iter().map(|_| Arc::new(AtomicU32::new(0))).collect();
    let invocations = Arc::new(Mutex::new(Vec::new()));

    let mut menu = MenuBuilder::new()
        .with_placeholder("pick")
        .with_value_bounds(1, 3)
        .with_user(picker().id);

    for (index, label) in labels.into_iter().enumerate() {
        let counter = Arc::clone(&counters[index]);
        let order = Arc::clone(&invocations);
        let terminate = terminating == Some(index);
        menu = menu.with_option(MenuOptionSpec::labeled(label), move |_event, _ctx, _id| {
            counter.fetch_add(1, Ordering::SeqCst);
            order.lock().unwrap().push(label);
            Ok(if terminate {
                Reaction::end()
            } else {
                Reaction::stay()
            })
        });
    }

    let built = SessionBuilder::new().add_menu(menu).build()?;

    let session_id = built.session.id.clone();
    let menus = built.layout.menus();
    let menu_id = menus[0].custom_id.clone();
    let option_ids = menus[0].options.iter().map(|o| o.value.clone()).collect();

    assert!(dispatcher.register(built.session));
    Ok(MenuFixture {
        session_id,
        menu_id,
        option_ids,
        counters,
        invocations,
    })
}

#[tokio::test]
async fn test_scenario_c_only_selected_option_runs() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let fixture = open_menu(&dispatcher, None)?;

    dispatcher.on_menu_activated(ComponentEvent::menu(
        fixture.menu_id.clone(),
        vec![fixture.option_ids[1].clone()],
        picker(),
        message(),
    ));

    assert!(wait_until(|| fixture.counters[1].load(Ordering::SeqCst) == 1).await);
    sleep(Duration::from_millis(100)).await;

    assert_eq!(fixture.counters[0].load(Ordering::SeqCst), 0);
    assert_eq!(fixture.counters[1].load(Ordering::SeqCst), 1);
    assert_eq!(fixture.counters[2].load(Ordering::SeqCst), 0);

    // The activation is recorded on the context and the session stays live
    let snapshot = dispatcher.snapshot(&fixture.session_id).unwrap();
    assert_eq!(snapshot.selected_options, vec![fixture.option_ids[1].clone()]);
    assert!(dispatcher.contains(&fixture.session_id));

    Ok(())
}

#[tokio::test]
async fn test_callbacks_run_in_defined_option_order() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let fixture = open_menu(&dispatcher, None)?;

    // Event reports C before A; dispatch follows the menu's own order
    dispatcher.on_menu_activated(ComponentEvent::menu(
        fixture.menu_id.clone(),
        vec![fixture.option_ids[2].clone(), fixture.option_ids[0].clone()],
        picker(),
        message(),
    ));

    assert!(wait_until(|| fixture.invocations.lock().unwrap().len() == 2).await);
    assert_eq!(*fixture.invocations.lock().unwrap(), vec!["A", "C"]);

    Ok(())
}

#[tokio::test]
async fn test_any_unknown_option_rejects_the_whole_event() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    let fixture = open_menu(&dispatcher, None)?;

    dispatcher.on_menu_activated(ComponentEvent::menu(
        fixture.menu_id.clone(),
        vec![
            fixture.option_ids[0].clone(),
            "never-registered".to_string(),
        ],
        picker(),
        message(),
    ));

    assert!(wait_until(|| platform.notice_count() == 1).await);
    assert_eq!(
        platform.notices(),
        vec![(picker().id, "Unknown option.".to_string())]
    );

    // Fail-fast: no callback ran, nothing was recorded
    for counter in &fixture.counters {
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
    let snapshot = dispatcher.snapshot(&fixture.session_id).unwrap();
    assert!(snapshot.selected_options.is_empty());
    assert!(dispatcher.contains(&fixture.session_id));

    Ok(())
}

#[tokio::test]
async fn test_terminating_option_tears_down_after_all_ran() -> Result<()> {
    let platform = Arc::new(MockPlatform::new());
    let dispatcher = Dispatcher::new(platform.clone(), SessionSettings::default());
    // Option A terminates; C does not
    let fixture = open_menu(&dispatcher, Some(0))?;

    dispatcher.on_menu_activated(ComponentEvent::menu(
        fixture.menu_id.clone(),
        vec![fixture.option_ids[0].clone(), fixture.option_ids[2].clone()],
        picker(),
        message(),
    ));

    assert!(wait_until(|| !dispatcher.contains(&fixture.session_id)).await);

    // Both selected callbacks ran before the teardown
    assert_eq!(fixture.counters[0].load(Ordering::SeqCst), 1);
    assert_eq!(fixture.counters[2].load(Ordering::SeqCst), 1);
    assert_eq!(platform.layout_removals(), vec![message()]);
    assert_eq!(dispatcher.handler_count(), 0);

    Ok(())
}
