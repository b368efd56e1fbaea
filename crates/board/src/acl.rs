// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_events::{CategoryId, OrderedSet};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Append-only decrypt grants. Modeled as sets, so repeating a grant leaves
/// the state semantically unchanged. There is no revocation operation; if one
/// is ever needed this becomes a versioned ACL (epoch per category) rather
/// than deletion from a set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclState {
    categories: BTreeMap<CategoryId, OrderedSet<Address>>,
    all: OrderedSet<Address>,
}

impl AclState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a category-scoped grant. Returns false when it already existed.
    pub fn grant(&mut self, category_id: CategoryId, grantee: Address) -> bool {
        self.categories
            .entry(category_id)
            .or_default()
            .insert(grantee)
    }

    /// Record a blanket grant covering every category.
    pub fn grant_all(&mut self, grantee: Address) -> bool {
        self.all.insert(grantee)
    }

    /// Whether the account may decrypt the given category's aggregate.
    pub fn is_authorized(&self, category_id: CategoryId, account: Address) -> bool {
        self.all.contains(&account)
            || self
                .categories
                .get(&category_id)
                .map(|set| set.contains(&account))
                .unwrap_or(false)
    }

    /// Accounts holding standing permission for the category: the
    /// category-scoped grantees plus every blanket grantee.
    pub fn grantees_for(&self, category_id: CategoryId) -> Vec<Address> {
        let mut set = OrderedSet::from_iter(self.all.iter().copied());
        if let Some(scoped) = self.categories.get(&category_id) {
            set.extend(scoped.iter().copied());
        }
        set.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    #[test]
    fn grants_are_idempotent() {
        let mut acl = AclState::new();
        assert!(acl.grant(CategoryId(1), alice()));
        assert!(!acl.grant(CategoryId(1), alice()));
        assert!(acl.is_authorized(CategoryId(1), alice()));
        assert!(!acl.is_authorized(CategoryId(0), alice()));
    }

    #[test]
    fn blanket_grants_cover_every_category() {
        let mut acl = AclState::new();
        assert!(acl.grant_all(bob()));
        assert!(!acl.grant_all(bob()));
        assert!(acl.is_authorized(CategoryId(0), bob()));
        assert!(acl.is_authorized(CategoryId(4), bob()));
    }

    #[test]
    fn grantees_for_merges_scopes_without_duplicates() {
        let mut acl = AclState::new();
        acl.grant(CategoryId(2), alice());
        acl.grant_all(alice());
        acl.grant_all(bob());

        let grantees = acl.grantees_for(CategoryId(2));
        assert_eq!(grantees.len(), 2);
        assert!(grantees.contains(&alice()));
        assert!(grantees.contains(&bob()));
    }
}
