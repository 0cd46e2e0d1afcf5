//! Admin allow-list.

use std::collections::BTreeSet;

use crate::{RelayError, Result};

/// Static set of administrator user ids, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct AdminAccess {
    ids: BTreeSet<i64>,
}

impl AdminAccess {
    /// Build the allow-list from configured ids.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Whether `user_id` is an administrator.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    /// Require administrator access.
    ///
    /// # Returns
    ///
    /// `Ok(())` for listed ids, `RelayError::Authorization` otherwise.
    pub fn require(&self, user_id: i64) -> Result<()> {
        if self.is_admin(user_id) {
            Ok(())
        } else {
            Err(RelayError::Authorization(format!(
                "user {user_id} is not an administrator"
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        let access = AdminAccess::new([10, 20]);
        assert!(access.is_admin(10));
        assert!(access.is_admin(20));
        assert!(!access.is_admin(30));
        assert_eq!(access.len(), 2);
    }

    #[test]
    fn test_require() {
        let access = AdminAccess::new([10]);
        assert!(access.require(10).is_ok());
        assert!(matches!(
            access.require(11),
            Err(RelayError::Authorization(_))
        ));
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        let access = AdminAccess::default();
        assert!(access.is_empty());
        assert!(access.require(0).is_err());
    }

    #[test]
    fn test_ids_deduplicated() {
        let access = AdminAccess::new([30, 10, 30]);
        assert_eq!(access.len(), 2);
        assert!(access.is_admin(10));
        assert!(access.is_admin(30));
    }
}
