use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const PUBLIC_KEY: &str = "*";
const ROLE_PREFIX: &str = "role:";

/// Read/write permission pair for one principal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub write: bool,
}

impl AccessRule {
    fn is_empty(&self) -> bool {
        !self.read && !self.write
    }
}

/// Access-control list in the server's wire format.
///
/// Keys are `"*"` for public access, a user's object id, or `"role:<name>"`.
/// Only the REST server enforces ACLs; the document and key-value adapters
/// ignore them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acl {
    rules: BTreeMap<String, AccessRule>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    /// An ACL granting public read and nothing else.
    pub fn public_read() -> Self {
        let mut acl = Self::new();
        acl.set_public_read(true);
        acl
    }

    pub fn set_public_read(&mut self, allowed: bool) {
        self.update(PUBLIC_KEY, |r| r.read = allowed);
    }

    pub fn set_public_write(&mut self, allowed: bool) {
        self.update(PUBLIC_KEY, |r| r.write = allowed);
    }

    pub fn set_read(&mut self, principal: &str, allowed: bool) {
        self.update(principal, |r| r.read = allowed);
    }

    pub fn set_write(&mut self, principal: &str, allowed: bool) {
        self.update(principal, |r| r.write = allowed);
    }

    pub fn set_role_read(&mut self, role: &str, allowed: bool) {
        self.set_read(&format!("{ROLE_PREFIX}{role}"), allowed);
    }

    pub fn set_role_write(&mut self, role: &str, allowed: bool) {
        self.set_write(&format!("{ROLE_PREFIX}{role}"), allowed);
    }

    pub fn can_read(&self, principal: &str) -> bool {
        self.rule(principal).read || self.rule(PUBLIC_KEY).read
    }

    pub fn can_write(&self, principal: &str) -> bool {
        self.rule(principal).write || self.rule(PUBLIC_KEY).write
    }

    pub fn rule(&self, principal: &str) -> AccessRule {
        self.rules.get(principal).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    // Principals left with no permission are dropped so the wire form never
    // carries `{}` entries.
    fn update(&mut self, principal: &str, f: impl FnOnce(&mut AccessRule)) {
        let mut rule = self.rule(principal);
        f(&mut rule);
        if rule.is_empty() {
            self.rules.remove(principal);
        } else {
            self.rules.insert(principal.to_string(), rule);
        }
    }
}
