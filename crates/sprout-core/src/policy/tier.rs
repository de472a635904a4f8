use crate::{
    config::IdentityConfig,
    domain::{identity::SessionClaims, profile::Tier},
};

///
/// TierPolicy
///
/// Resolution order is fixed: a demo-shaped username wins over anything the
/// session claims say, then claims, then FREE. PRO is never produced here.
///

pub struct TierPolicy;

impl TierPolicy {
    /// Username starts with a configured demo prefix followed by at least
    /// one more character. Matching ignores ASCII case.
    #[must_use]
    pub fn is_demo_username(username: &str, cfg: &IdentityConfig) -> bool {
        let username = username.trim();

        cfg.demo_username_prefixes.iter().any(|prefix| {
            username.len() > prefix.len()
                && username
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }

    #[must_use]
    pub fn from_claims(claims: &SessionClaims, cfg: &IdentityConfig) -> Tier {
        if claims.in_group(&cfg.demo_group) || claims.has_role(&cfg.demo_role) {
            Tier::Demo
        } else {
            Tier::Free
        }
    }

    #[must_use]
    pub fn resolve(username: &str, claims: Option<&SessionClaims>, cfg: &IdentityConfig) -> Tier {
        if Self::is_demo_username(username, cfg) {
            return Tier::Demo;
        }

        claims.map_or(Tier::Free, |c| Self::from_claims(c, cfg))
    }

    /// Stored tier should be moved to `desired`. PRO is never moved.
    #[must_use]
    pub fn should_reconcile(current: Tier, desired: Tier) -> bool {
        current != Tier::Pro && current != desired
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn claims(groups: &[&str], role: Option<&str>) -> SessionClaims {
        SessionClaims {
            groups: groups.iter().map(|g| (*g).to_string()).collect::<BTreeSet<_>>(),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn demo_username_shapes() {
        let cfg = IdentityConfig::default();

        assert!(TierPolicy::is_demo_username("demo-42", &cfg));
        assert!(TierPolicy::is_demo_username("DEMO_visitor", &cfg));
        assert!(!TierPolicy::is_demo_username("demo-", &cfg));
        assert!(!TierPolicy::is_demo_username("demolition", &cfg));
        assert!(!TierPolicy::is_demo_username("alice", &cfg));
        assert!(!TierPolicy::is_demo_username("dé", &cfg));
    }

    #[test]
    fn resolution_order_is_username_then_claims_then_free() {
        let cfg = IdentityConfig::default();

        struct Case {
            name: &'static str,
            username: &'static str,
            claims: Option<SessionClaims>,
            expected: Tier,
        }

        let cases = [
            Case {
                name: "demo username without claims",
                username: "demo-1",
                claims: None,
                expected: Tier::Demo,
            },
            Case {
                name: "demo username wins over plain claims",
                username: "demo-1",
                claims: Some(claims(&["Admins"], Some("User"))),
                expected: Tier::Demo,
            },
            Case {
                name: "demo group",
                username: "alice",
                claims: Some(claims(&["Demo"], None)),
                expected: Tier::Demo,
            },
            Case {
                name: "demo role",
                username: "alice",
                claims: Some(claims(&[], Some("Demo"))),
                expected: Tier::Demo,
            },
            Case {
                name: "claims unavailable",
                username: "alice",
                claims: None,
                expected: Tier::Free,
            },
            Case {
                name: "unrelated claims",
                username: "alice",
                claims: Some(claims(&["demo"], Some("demo"))),
                expected: Tier::Free,
            },
        ];

        for case in cases {
            assert_eq!(
                TierPolicy::resolve(case.username, case.claims.as_ref(), &cfg),
                case.expected,
                "{}",
                case.name
            );
        }
    }

    #[test]
    fn pro_is_never_reconciled() {
        assert!(!TierPolicy::should_reconcile(Tier::Pro, Tier::Demo));
        assert!(!TierPolicy::should_reconcile(Tier::Pro, Tier::Free));
        assert!(!TierPolicy::should_reconcile(Tier::Demo, Tier::Demo));
        assert!(TierPolicy::should_reconcile(Tier::Free, Tier::Demo));
        assert!(TierPolicy::should_reconcile(Tier::Demo, Tier::Free));
    }
}
