//! Button action tokens.
//!
//! Inline buttons carry an opaque string; this module parses it into a
//! closed [`Action`] set and renders it back.

use std::fmt;

/// An action requested by pressing an inline button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewRooms,
    MainMenu,
    EnterRoom(i64),
    ExitRoom,
    AdminPanel,
    CreateRoom,
    ListRooms,
    RoomInfo(i64),
    AdminEnterRoom(i64),
    ExportHistory(i64),
    DeleteRoom(i64),
}

impl Action {
    /// Parse a token. Unknown tokens and malformed room ids yield None.
    pub fn parse(token: &str) -> Option<Self> {
        let action = match token {
            "view_rooms" => Action::ViewRooms,
            "main_menu" => Action::MainMenu,
            "exit_room" => Action::ExitRoom,
            "admin_panel" => Action::AdminPanel,
            "create_room" => Action::CreateRoom,
            "list_rooms" => Action::ListRooms,
            _ => return Self::parse_with_room(token),
        };
        Some(action)
    }

    fn parse_with_room(token: &str) -> Option<Self> {
        const PREFIXED: &[(&str, fn(i64) -> Action)] = &[
            ("admin_enter_room_", Action::AdminEnterRoom),
            ("enter_room_", Action::EnterRoom),
            ("room_info_", Action::RoomInfo),
            ("export_history_", Action::ExportHistory),
            ("delete_room_", Action::DeleteRoom),
        ];
        PREFIXED.iter().find_map(|(prefix, build)| {
            token
                .strip_prefix(prefix)
                .and_then(|id| id.parse::<i64>().ok())
                .map(build)
        })
    }

    /// Render the token carried by a button.
    pub fn to_token(&self) -> String {
        self.to_string()
    }

    /// Whether the action is restricted to administrators.
    pub fn is_admin_only(&self) -> bool {
        !matches!(
            self,
            Action::ViewRooms | Action::MainMenu | Action::EnterRoom(_) | Action::ExitRoom
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ViewRooms => write!(f, "view_rooms"),
            Action::MainMenu => write!(f, "main_menu"),
            Action::EnterRoom(id) => write!(f, "enter_room_{id}"),
            Action::ExitRoom => write!(f, "exit_room"),
            Action::AdminPanel => write!(f, "admin_panel"),
            Action::CreateRoom => write!(f, "create_room"),
            Action::ListRooms => write!(f, "list_rooms"),
            Action::RoomInfo(id) => write!(f, "room_info_{id}"),
            Action::AdminEnterRoom(id) => write!(f, "admin_enter_room_{id}"),
            Action::ExportHistory(id) => write!(f, "export_history_{id}"),
            Action::DeleteRoom(id) => write!(f, "delete_room_{id}"),
        }
    }
}
