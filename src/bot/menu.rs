//! Inline keyboards and the texts that go with them.

use super::action::Action;
use crate::admin::RoomInfo;
use crate::db::Role;
use crate::outbound::Button;
use crate::room::Room;

pub const ACCESS_DENIED_NOTICE: &str = "You do not have access to this function.";
pub const ROOM_NOT_FOUND_NOTICE: &str = "Room not found.";
pub const NO_ROOM_ACCESS_NOTICE: &str = "You do not have access to this room.";
pub const NOT_IN_ANY_ROOM_NOTICE: &str = "You are not in any room.";
pub const NOTHING_TO_CANCEL_NOTICE: &str = "There is nothing to cancel.";
pub const HELP_TEXT: &str = "Available commands:\n\
/start - start working with the bot\n\
/cancel - cancel room creation\n\
/help - show this message";

fn button(label: impl Into<String>, action: Action) -> Button {
    Button::new(label, action.to_token())
}

/// Main menu; admins also get the admin panel.
pub fn main_menu(is_admin: bool) -> Vec<Vec<Button>> {
    let mut rows = vec![vec![button("My rooms", Action::ViewRooms)]];
    if is_admin {
        rows.push(vec![button("Admin panel", Action::AdminPanel)]);
    }
    rows
}

pub fn admin_panel() -> Vec<Vec<Button>> {
    vec![
        vec![button("Create room", Action::CreateRoom)],
        vec![button("List rooms", Action::ListRooms)],
        vec![button("Main menu", Action::MainMenu)],
    ]
}

pub fn room_exit() -> Vec<Vec<Button>> {
    vec![vec![button("Leave room", Action::ExitRoom)]]
}

pub fn back_to_main() -> Vec<Vec<Button>> {
    vec![vec![button("Main menu", Action::MainMenu)]]
}

pub fn after_exit() -> Vec<Vec<Button>> {
    vec![
        vec![button("My rooms", Action::ViewRooms)],
        vec![button("Main menu", Action::MainMenu)],
    ]
}

/// One button per room to enter it, optionally followed by "Main menu".
pub fn room_picker(rooms: &[Room], with_main_menu: bool) -> Vec<Vec<Button>> {
    let mut rows: Vec<Vec<Button>> = rooms
        .iter()
        .map(|room| vec![button(room.name.clone(), Action::EnterRoom(room.id))])
        .collect();
    if with_main_menu {
        rows.push(vec![button("Main menu", Action::MainMenu)]);
    }
    rows
}

/// Admin room list linking to each room's info page.
pub fn room_list(rooms: &[Room]) -> Vec<Vec<Button>> {
    let mut rows: Vec<Vec<Button>> = rooms
        .iter()
        .map(|room| {
            vec![button(
                format!("{} (ID: {})", room.name, room.id),
                Action::RoomInfo(room.id),
            )]
        })
        .collect();
    rows.push(vec![button("Back", Action::AdminPanel)]);
    rows
}

pub fn room_actions(room_id: i64) -> Vec<Vec<Button>> {
    vec![
        vec![button("Enter room", Action::AdminEnterRoom(room_id))],
        vec![button("Export history", Action::ExportHistory(room_id))],
        vec![button("Delete room", Action::DeleteRoom(room_id))],
        vec![button("Back to list", Action::ListRooms)],
        vec![button("Main menu", Action::MainMenu)],
    ]
}

pub fn entered_room_text(room: &Room) -> String {
    format!(
        "You have entered the room: {}\n\
         All messages will be sent to the other participants.\n\
         Press the button below to leave.",
        room.name
    )
}

pub fn admin_entered_room_text(room: &Room) -> String {
    format!(
        "You have entered the room: {} (as administrator)\n\
         All messages will be sent to the other participants.\n\
         Press the button below to leave.",
        room.name
    )
}

fn role_label(role: Option<Role>) -> &'static str {
    role.map(|r| r.as_str()).unwrap_or("unknown")
}

pub fn room_info_text(info: &RoomInfo) -> String {
    let mut text = format!(
        "Room information:\nID: {}\nName: {}\nCreated: {}\n\nMembers:",
        info.room.id, info.room.name, info.room.created_at
    );
    if info.members.is_empty() {
        text.push_str("\n(none)");
    }
    for member in &info.members {
        text.push_str(&format!(
            "\n- {} (ID: {}, role: {})",
            member.username,
            member.user_id,
            role_label(member.role)
        ));
    }
    text
}
