//! Process-wide application context.

use std::sync::Arc;

use crate::admin::{AdminAccess, AdminService, RoomWizard};
use crate::db::Database;
use crate::outbound::Outbound;
use crate::relay::RelayEngine;
use crate::room::RoomStore;
use crate::session::SessionStore;

/// Everything an event handler needs, owned once per process and shared
/// through an `Arc`.
pub struct AppContext {
    pub db: Database,
    pub sessions: SessionStore,
    pub admins: AdminAccess,
    pub outbound: Arc<dyn Outbound>,
}

impl AppContext {
    pub fn new(db: Database, admins: AdminAccess, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
            admins,
            outbound,
        }
    }

    pub fn store(&self) -> RoomStore<'_> {
        RoomStore::new(&self.db)
    }

    pub fn relay(&self) -> RelayEngine<'_> {
        RelayEngine::new(
            &self.db,
            &self.sessions,
            &self.admins,
            self.outbound.as_ref(),
        )
    }

    pub fn wizard(&self) -> RoomWizard<'_> {
        RoomWizard::new(
            &self.db,
            &self.sessions,
            &self.admins,
            self.outbound.as_ref(),
        )
    }

    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(
            &self.db,
            &self.sessions,
            &self.admins,
            self.outbound.as_ref(),
        )
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.is_admin(user_id)
    }
}
