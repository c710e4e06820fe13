//! Configuration for the wishlist sync engine

/// Authority mode for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No identity bound; the local store is authoritative
    Guest,
    /// An identity is bound; the remote store is authoritative
    Identified,
}

/// Wishlist engine configuration
///
/// Supplied once at controller construction and immutable for the
/// controller's lifetime. Binding a new identity means constructing a new
/// controller, not mutating config in place.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the sync API (e.g. `https://api.example.com/wishlist`)
    pub api_url: String,

    /// Bearer token for authenticated sync calls
    pub access_token: Option<String>,

    /// Tenant (shop/storefront) identifier sent with every remote call
    pub tenant: String,

    /// Bound identity, when the session is authenticated
    pub identity: Option<String>,

    /// Allow operating without an identity against the local store
    pub enable_guest_mode: bool,

    /// Reconcile local items into the remote store on identified init
    pub enable_auto_merge: bool,
}

impl Config {
    /// Create a guest-mode configuration with both feature toggles enabled
    #[must_use]
    pub fn guest(api_url: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            access_token: None,
            tenant: tenant.into(),
            identity: None,
            enable_guest_mode: true,
            enable_auto_merge: true,
        }
    }

    /// Create an identified configuration with both feature toggles enabled
    #[must_use]
    pub fn identified(
        api_url: impl Into<String>,
        tenant: impl Into<String>,
        identity: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            access_token: Some(access_token.into()),
            tenant: tenant.into(),
            identity: Some(identity.into()),
            enable_guest_mode: true,
            enable_auto_merge: true,
        }
    }

    /// Authority mode this configuration yields
    ///
    /// Remote calls additionally require a credential; an identity without
    /// an access token still counts as identified for state ownership, but
    /// the sync client will not be constructed for it.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.identity.is_some() {
            Mode::Identified
        } else {
            Mode::Guest
        }
    }

    /// Whether remote sync calls can be issued at all
    #[must_use]
    pub const fn can_sync(&self) -> bool {
        self.identity.is_some() && self.access_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_config_mode() {
        let cfg = Config::guest("https://api.test", "shop-1");
        assert_eq!(cfg.mode(), Mode::Guest);
        assert!(!cfg.can_sync());
    }

    #[test]
    fn identified_config_mode() {
        let cfg = Config::identified("https://api.test", "shop-1", "cust-1", "tok");
        assert_eq!(cfg.mode(), Mode::Identified);
        assert!(cfg.can_sync());
    }

    #[test]
    fn identity_without_token_cannot_sync() {
        let mut cfg = Config::guest("https://api.test", "shop-1");
        cfg.identity = Some("cust-1".to_string());
        assert_eq!(cfg.mode(), Mode::Identified);
        assert!(!cfg.can_sync());
    }
}
