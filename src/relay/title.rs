//! Sender title resolution.

use crate::db::Role;

/// Label used for members without a recognised room role.
pub const DEFAULT_TITLE: &str = "User";

/// Resolve the label shown in front of a relayed message.
///
/// Global admins are always "Administrator", whatever their role in the
/// room; otherwise the membership role decides.
pub fn sender_title(is_global_admin: bool, room_role: Option<Role>) -> &'static str {
    if is_global_admin {
        return Role::Admin.title();
    }
    match room_role {
        Some(Role::Client) => Role::Client.title(),
        Some(Role::Coder) => Role::Coder.title(),
        Some(Role::Admin) | None => DEFAULT_TITLE,
    }
}
