//! Who counts as an administrator.
//!
//! Rule v1: the identity's email, trimmed and lowercased, belongs to the
//! configured allow-list. An empty allow-list admits nobody.

use std::collections::BTreeSet;

use super::backend::IdentityUser;

pub const ADMIN_RULE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList(BTreeSet<String>);

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            emails
                .into_iter()
                .map(|email| normalize(email.as_ref()))
                .filter(|email| !email.is_empty())
                .collect(),
        )
    }

    /// Parse a comma separated list (`VITRINE_ADMIN_EMAILS`).
    #[must_use]
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(&normalize(email))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Admin predicate, rule version 1.
#[must_use]
pub fn is_admin_v1(user: &IdentityUser, allow_list: &AdminAllowList) -> bool {
    user.email
        .as_deref()
        .is_some_and(|email| allow_list.contains(email))
}
