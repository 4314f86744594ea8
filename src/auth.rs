//! Boundary to the identity collaborator. Account management and token
//! issuance live elsewhere; the coordinator only needs a credential turned
//! into a [`MemberId`].

use dashmap::DashMap;

use crate::state::room::MemberId;

/// Resolve an opaque caller credential into a member identity.
pub trait IdentityResolver: Send + Sync {
    /// Return the member behind `credential`, or `None` when unknown.
    fn resolve(&self, credential: &str) -> Option<MemberId>;
}

/// Token → member table fed from configuration or by an upstream issuer.
#[derive(Debug, Default)]
pub struct TokenDirectory {
    tokens: DashMap<String, MemberId>,
}

impl TokenDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from `(token, member)` pairs, skipping blank entries.
    pub fn from_pairs<I, T, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, M)>,
        T: Into<String>,
        M: Into<String>,
    {
        let directory = Self::new();
        for (token, member) in pairs {
            directory.register(token, MemberId::new(member));
        }
        directory
    }

    /// Map `token` to `member`, replacing any previous mapping.
    pub fn register(&self, token: impl Into<String>, member: MemberId) {
        let token = token.into();
        if token.trim().is_empty() || member.as_str().trim().is_empty() {
            return;
        }
        self.tokens.insert(token, member);
    }

    /// Drop a token.
    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is known.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityResolver for TokenDirectory {
    fn resolve(&self, credential: &str) -> Option<MemberId> {
        self.tokens.get(credential).map(|entry| entry.value().clone())
    }
}
