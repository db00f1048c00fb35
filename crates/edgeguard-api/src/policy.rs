//! Static per-route policy table, built once at startup.
//!
//! A pattern is either an exact path (`/api/health`) or a prefix ending in
//! `/*` (`/docs/*`, which also matches `/docs` itself). Exact patterns beat
//! prefixes; among prefixes the longest wins. Paths no pattern matches fall
//! under the `default` policy: authenticated, standard rate.

use std::collections::BTreeMap;

use edgeguard_core::config::{AuthConfig, RateLimitConfig, RatePolicyKind};

/// Route key used for paths that match no declared pattern.
pub const DEFAULT_ROUTE: &str = "default";

/// Requirements a route imposes on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    /// The pattern this policy was declared under; also the rate and metrics route key.
    pub pattern: String,
    /// Whether a valid session is required.
    pub requires_auth: bool,
    /// Any one of these roles admits the caller.
    pub required_roles: Vec<String>,
    /// The caller must hold all of these permissions.
    pub required_permissions: Vec<String>,
    /// Rate admission policy.
    pub rate: RatePolicyKind,
}

impl RoutePolicy {
    fn new(pattern: &str, requires_auth: bool, rate: RatePolicyKind) -> Self {
        Self {
            pattern: pattern.to_string(),
            requires_auth,
            required_roles: Vec::new(),
            required_permissions: Vec::new(),
            rate,
        }
    }

    /// Whether the auth stage must consult the access decider.
    pub fn needs_access_decision(&self) -> bool {
        !self.required_roles.is_empty() || !self.required_permissions.is_empty()
    }
}

/// Route policy lookup.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    exact: BTreeMap<String, RoutePolicy>,
    /// Keyed by the prefix with the `/*` stripped.
    prefixes: BTreeMap<String, RoutePolicy>,
    default: RoutePolicy,
}

impl PolicyTable {
    /// An empty table: every path gets the default policy.
    pub fn new() -> Self {
        Self {
            exact: BTreeMap::new(),
            prefixes: BTreeMap::new(),
            default: RoutePolicy::new(DEFAULT_ROUTE, true, RatePolicyKind::Standard),
        }
    }

    /// Built-in routes, then `auth.public_paths`, then `auth.routes`.
    pub fn from_config(auth: &AuthConfig, rate_limit: &RateLimitConfig) -> Self {
        let public_rate = rate_limit.public_policy;
        let mut table = Self::new();

        table.insert(RoutePolicy::new("/api/health", false, public_rate));
        table.insert(RoutePolicy::new(
            "/api/auth/login",
            false,
            RatePolicyKind::Standard,
        ));
        table.insert(RoutePolicy::new("/api/auth/*", true, RatePolicyKind::Standard));

        for pattern in &auth.public_paths {
            match table.get_mut(pattern) {
                Some(existing) => existing.requires_auth = false,
                None => table.insert(RoutePolicy::new(pattern, false, public_rate)),
            }
        }

        for rule in &auth.routes {
            let rate = rule.rate.unwrap_or(if rule.requires_auth {
                RatePolicyKind::Standard
            } else {
                public_rate
            });
            table.insert(RoutePolicy {
                pattern: rule.pattern.clone(),
                requires_auth: rule.requires_auth,
                required_roles: rule.roles.clone(),
                required_permissions: rule.permissions.clone(),
                rate,
            });
        }

        table
    }

    /// Declare a policy, replacing any with the same pattern.
    pub fn insert(&mut self, policy: RoutePolicy) {
        match policy.pattern.strip_suffix("/*") {
            Some(prefix) => {
                self.prefixes.insert(prefix.to_string(), policy);
            }
            None => {
                self.exact.insert(policy.pattern.clone(), policy);
            }
        }
    }

    fn get_mut(&mut self, pattern: &str) -> Option<&mut RoutePolicy> {
        match pattern.strip_suffix("/*") {
            Some(prefix) => self.prefixes.get_mut(prefix),
            None => self.exact.get_mut(pattern),
        }
    }

    /// The policy governing `path`.
    pub fn resolve(&self, path: &str) -> &RoutePolicy {
        if let Some(policy) = self.exact.get(path) {
            return policy;
        }

        self.prefixes
            .iter()
            .filter(|(prefix, _)| {
                path == prefix.as_str()
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, policy)| policy)
            .unwrap_or(&self.default)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}
