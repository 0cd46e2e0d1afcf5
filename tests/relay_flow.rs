//! End-to-end relay tests driven through the dispatcher.

mod common;

use common::{Sent, TestApp, ADMIN, CLIENT, CODER};
use roomrelay::bot::Command;
use roomrelay::bot::menu::HELP_TEXT;
use roomrelay::relay::{ALONE_NOTICE, MAX_TEXT_LEN};
use roomrelay::{Content, EventKind, Role};

/// Creates "Alpha" with client 100 and coder 200, and puts both in it.
async fn alpha_with_both_inside() -> (TestApp, i64) {
    let app = TestApp::new().await;
    let room_id = app.create_room("Alpha", CLIENT, CODER).await;
    app.command(CLIENT, Command::Start).await;
    app.command(CODER, Command::Start).await;
    app.outbound.clear();
    (app, room_id)
}

#[tokio::test]
async fn test_client_ping_reaches_coder() {
    let (app, room_id) = alpha_with_both_inside().await;

    app.text(CLIENT, "ping").await;

    let history = app.ctx().store().list_history(room_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].room_id, room_id);
    assert_eq!(history[0].user_id, CLIENT);
    assert_eq!(history[0].text, "ping");

    let to_coder = app.outbound.sent_to(CODER);
    assert_eq!(to_coder.len(), 1);
    match &to_coder[0] {
        Sent::Content { caption, .. } => assert_eq!(caption.as_deref(), Some("Client:\nping")),
        other => panic!("expected relayed content, got {other:?}"),
    }
    assert!(app.outbound.sent_to(CLIENT).is_empty());
}

#[tokio::test]
async fn test_coder_reply_is_titled_coder() {
    let (app, _) = alpha_with_both_inside().await;

    app.text(CODER, "pong").await;

    match &app.outbound.sent_to(CLIENT)[0] {
        Sent::Content { caption, .. } => assert_eq!(caption.as_deref(), Some("Coder:\npong")),
        other => panic!("expected relayed content, got {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_visit_is_titled_administrator() {
    let (app, room_id) = alpha_with_both_inside().await;

    app.press(ADMIN, format!("admin_enter_room_{room_id}")).await;
    app.outbound.clear();
    app.text(ADMIN, "status?").await;

    for member in [CLIENT, CODER] {
        match &app.outbound.sent_to(member)[0] {
            Sent::Content { caption, .. } => {
                assert_eq!(caption.as_deref(), Some("Administrator:\nstatus?"))
            }
            other => panic!("expected relayed content, got {other:?}"),
        }
    }
    // The admin's own messages now also reach them from others.
    app.text(CLIENT, "all good").await;
    assert_eq!(app.outbound.sent_to(ADMIN).len(), 1);
}

#[tokio::test]
async fn test_photo_keeps_file_and_prefixes_caption() {
    let (app, room_id) = alpha_with_both_inside().await;
    let photo = Content::Photo {
        file_id: "AgACAgIAAxkBAAIB".to_string(),
        caption: Some("hi".to_string()),
    };

    app.event(CLIENT, EventKind::Message(photo.clone())).await;

    let history = app.ctx().store().list_history(room_id).await.unwrap();
    assert_eq!(history[0].text, "[PHOTO] hi");
    assert_eq!(
        app.outbound.sent_to(CODER),
        vec![Sent::Content {
            to: CODER,
            content: photo,
            caption: Some("Client:\nhi".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_oversized_text_is_cut_for_recipients_only() {
    let (app, room_id) = alpha_with_both_inside().await;
    let long = "z".repeat(MAX_TEXT_LEN);

    app.text(CLIENT, &long).await;

    match &app.outbound.sent_to(CODER)[0] {
        Sent::Content { caption, .. } => {
            let caption = caption.as_deref().unwrap();
            assert!(caption.starts_with("Client:\nzzz"));
            assert!(caption.ends_with('…'));
            assert_eq!(caption.encode_utf16().count(), MAX_TEXT_LEN);
        }
        other => panic!("expected relayed content, got {other:?}"),
    }
    // History keeps the full text.
    let history = app.ctx().store().list_history(room_id).await.unwrap();
    assert_eq!(history[0].text, long);
}

#[tokio::test]
async fn test_alone_in_room_gets_notice_and_history() {
    let app = TestApp::new().await;
    let lonely = app
        .ctx()
        .store()
        .create_room_with_members("Lonely", &[(CODER, Role::Coder)])
        .await
        .unwrap();
    app.press(CODER, format!("enter_room_{}", lonely.id)).await;
    app.outbound.clear();

    app.text(CODER, "echo").await;

    assert_eq!(app.outbound.texts_to(CODER), vec![ALONE_NOTICE.to_string()]);
    assert_eq!(app.outbound.sent().len(), 1);
    let history = app.ctx().store().list_history(lonely.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "echo");
}

#[tokio::test]
async fn test_member_outside_room_still_receives() {
    let app = TestApp::new().await;
    app.create_room("Alpha", CLIENT, CODER).await;
    app.command(CLIENT, Command::Start).await;
    app.outbound.clear();

    app.text(CLIENT, "anyone?").await;

    assert_eq!(app.outbound.sent_to(CODER).len(), 1);
    assert!(!app.ctx().sessions.is_in_active_room(CODER).await);
}

#[tokio::test]
async fn test_failed_delivery_does_not_stop_fan_out() {
    let (app, room_id) = alpha_with_both_inside().await;
    app.press(ADMIN, format!("admin_enter_room_{room_id}")).await;
    app.outbound.clear();
    app.outbound.fail_for(CLIENT);

    app.text(ADMIN, "broadcast").await;

    assert!(app.outbound.sent_to(CLIENT).is_empty());
    assert_eq!(app.outbound.sent_to(CODER).len(), 1);
    // The sender hears nothing about the failure.
    assert!(app.outbound.sent_to(ADMIN).is_empty());
}

#[tokio::test]
async fn test_leave_room_stops_relay() {
    let (app, room_id) = alpha_with_both_inside().await;

    app.press(CLIENT, "exit_room").await;
    app.outbound.clear();
    app.text(CLIENT, "still there?").await;

    assert!(app.outbound.sent_to(CODER).is_empty());
    assert!(app.ctx().store().list_history(room_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleted_room_evicts_members() {
    let (app, room_id) = alpha_with_both_inside().await;
    app.text(CLIENT, "before").await;

    app.press(ADMIN, format!("delete_room_{room_id}")).await;

    let store = app.ctx().store();
    assert!(store.get_room(room_id).await.unwrap().is_none());
    assert!(store.list_history(room_id).await.unwrap().is_empty());
    assert!(store.list_members(room_id).await.unwrap().is_empty());
    assert!(!app.ctx().sessions.is_in_active_room(CLIENT).await);
    assert!(!app.ctx().sessions.is_in_active_room(CODER).await);

    app.outbound.clear();
    app.text(CLIENT, "after").await;
    assert!(app.outbound.sent_to(CODER).is_empty());
    assert_eq!(app.outbound.texts_to(CLIENT), vec![HELP_TEXT.to_string()]);
}

#[tokio::test]
async fn test_export_history_sends_file() {
    let (app, room_id) = alpha_with_both_inside().await;
    app.text(CLIENT, "ping").await;
    app.text(CODER, "pong").await;
    app.outbound.clear();

    app.press(ADMIN, format!("export_history_{room_id}")).await;

    match &app.outbound.sent_to(ADMIN)[0] {
        Sent::File {
            file_name, bytes, ..
        } => {
            assert_eq!(file_name, &format!("room_{room_id}_history.txt"));
            let text = String::from_utf8(bytes.clone()).unwrap();
            assert!(text.starts_with(roomrelay::room::EXPORT_HEADER));
            assert!(text.contains("\tping\n"));
            assert!(text.contains("\tpong\n"));
        }
        other => panic!("expected a file, got {other:?}"),
    }
}
