//! Room creation wizard, driven through the dispatcher.

mod common;

use common::{TestApp, ADMIN, CLIENT, CODER};
use roomrelay::admin::{
    CANCELLED_NOTICE, CLIENT_ID_PROMPT, CODER_ID_PROMPT, EMPTY_NAME_NOTICE,
    NON_NUMERIC_ID_NOTICE, ROOM_NAME_PROMPT, SAME_ID_NOTICE,
};
use roomrelay::bot::menu::ACCESS_DENIED_NOTICE;
use roomrelay::bot::Command;
use roomrelay::{Role, WizardState};

#[tokio::test]
async fn test_wizard_creates_room_members_and_users() {
    let app = TestApp::new().await;

    app.press(ADMIN, "create_room").await;
    app.text(ADMIN, "  Alpha  ").await;
    app.text(ADMIN, "100").await;
    app.text(ADMIN, "200").await;

    assert_eq!(
        app.outbound.texts_to(ADMIN)[..3],
        [
            ROOM_NAME_PROMPT.to_string(),
            CLIENT_ID_PROMPT.to_string(),
            CODER_ID_PROMPT.to_string()
        ]
    );
    assert!(app.outbound.texts_to(ADMIN)[3].contains("Room 'Alpha' created"));

    let store = app.ctx().store();
    let rooms = store.list_all_rooms().await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].name, "Alpha");

    let members = store.list_members(rooms[0].id).await.unwrap();
    let roles: Vec<(i64, Option<Role>)> = members.iter().map(|m| (m.user_id, m.role)).collect();
    assert_eq!(
        roles,
        vec![(CLIENT, Some(Role::Client)), (CODER, Some(Role::Coder))]
    );

    assert_eq!(
        store.get_user(CLIENT).await.unwrap().unwrap().username,
        "client_100"
    );
    assert_eq!(
        store.get_user(CODER).await.unwrap().unwrap().username,
        "coder_200"
    );
    assert_eq!(app.ctx().sessions.wizard_state(ADMIN).await, WizardState::Idle);

    // Both new members are invited.
    for member in [CLIENT, CODER] {
        assert!(app.outbound.texts_to(member)[0].contains("Alpha"));
    }
}

#[tokio::test]
async fn test_wizard_keeps_known_usernames() {
    let app = TestApp::new().await;
    app.command(CLIENT, Command::Help).await;

    app.create_room("Alpha", CLIENT, CODER).await;

    let store = app.ctx().store();
    assert_eq!(
        store.get_user(CLIENT).await.unwrap().unwrap().username,
        "user_100"
    );
}

#[tokio::test]
async fn test_wizard_rejects_bad_input_and_stays() {
    let app = TestApp::new().await;
    app.press(ADMIN, "create_room").await;

    app.text(ADMIN, "   ").await;
    assert_eq!(
        app.ctx().sessions.wizard_state(ADMIN).await,
        WizardState::AwaitingRoomName
    );

    app.text(ADMIN, "Alpha").await;
    app.text(ADMIN, "one hundred").await;
    assert_eq!(
        app.ctx().sessions.wizard_state(ADMIN).await,
        WizardState::AwaitingClientId
    );

    app.text(ADMIN, "100").await;
    app.text(ADMIN, "2OO").await;
    assert_eq!(
        app.ctx().sessions.wizard_state(ADMIN).await,
        WizardState::AwaitingCoderId
    );

    let texts = app.outbound.texts_to(ADMIN);
    assert!(texts.contains(&EMPTY_NAME_NOTICE.to_string()));
    assert_eq!(
        texts
            .iter()
            .filter(|t| t.as_str() == NON_NUMERIC_ID_NOTICE)
            .count(),
        2
    );
    assert!(app.ctx().store().list_all_rooms().await.unwrap().is_empty());

    let draft = app.ctx().sessions.scratch(ADMIN).await;
    assert_eq!(draft.name.as_deref(), Some("Alpha"));
    assert_eq!(draft.client_id, Some(CLIENT));
}

#[tokio::test]
async fn test_wizard_refuses_one_user_as_both_roles() {
    let app = TestApp::new().await;
    app.press(ADMIN, "create_room").await;
    app.text(ADMIN, "Solo").await;
    app.text(ADMIN, "100").await;

    app.text(ADMIN, "100").await;

    assert_eq!(
        app.outbound.texts_to(ADMIN).last().map(String::as_str),
        Some(SAME_ID_NOTICE)
    );
    assert_eq!(
        app.ctx().sessions.wizard_state(ADMIN).await,
        WizardState::AwaitingCoderId
    );
    assert!(app.ctx().store().list_all_rooms().await.unwrap().is_empty());
    assert!(app.outbound.texts_to(CLIENT).is_empty());
}

#[tokio::test]
async fn test_cancel_discards_draft() {
    let app = TestApp::new().await;
    app.press(ADMIN, "create_room").await;
    app.text(ADMIN, "Alpha").await;

    app.command(ADMIN, Command::Cancel).await;

    assert_eq!(app.ctx().sessions.wizard_state(ADMIN).await, WizardState::Idle);
    assert_eq!(app.ctx().sessions.scratch(ADMIN).await.name, None);
    assert_eq!(
        app.outbound.texts_to(ADMIN).last().map(String::as_str),
        Some(CANCELLED_NOTICE)
    );

    // Further text is no longer wizard input.
    app.text(ADMIN, "100").await;
    assert!(app.ctx().store().list_all_rooms().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restart_clears_stale_draft() {
    let app = TestApp::new().await;
    app.press(ADMIN, "create_room").await;
    app.text(ADMIN, "Stale").await;

    app.press(ADMIN, "create_room").await;

    assert_eq!(
        app.ctx().sessions.wizard_state(ADMIN).await,
        WizardState::AwaitingRoomName
    );
    assert_eq!(app.ctx().sessions.scratch(ADMIN).await.name, None);
}

#[tokio::test]
async fn test_non_admin_cannot_start_wizard() {
    let app = TestApp::new().await;

    app.press(CLIENT, "create_room").await;

    assert_eq!(
        app.ctx().sessions.wizard_state(CLIENT).await,
        WizardState::Idle
    );
    assert_eq!(
        app.outbound.texts_to(CLIENT),
        vec![ACCESS_DENIED_NOTICE.to_string()]
    );
}

#[tokio::test]
async fn test_created_room_is_usable_immediately() {
    let app = TestApp::new().await;
    let room_id = app.create_room("Alpha", CLIENT, CODER).await;

    app.command(CODER, Command::Start).await;
    assert_eq!(app.ctx().sessions.active_room(CODER).await, Some(room_id));

    app.outbound.clear();
    app.text(CODER, "hello client").await;
    assert_eq!(app.outbound.sent_to(CLIENT).len(), 1);
}
