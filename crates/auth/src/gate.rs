//! Session/route authorization gate.
//!
//! A four-branch decision table recomputed on every navigation; nothing is
//! stored between requests.

/// Path namespace that requires an active session.
pub const PROTECTED_PREFIX: &str = "/dashboard";

/// Sign-in page unauthenticated users are sent to.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// No session on a protected path; the caller redirects to sign-in.
    Deny,
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    protected_prefix: String,
    login_path: String,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::new(PROTECTED_PREFIX, LOGIN_PATH)
    }
}

impl RouteGate {
    pub fn new(protected_prefix: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
            login_path: login_path.into(),
        }
    }

    /// Segment-aware prefix match: `/dashboard` and `/dashboard/...`, not `/dashboards`.
    ///
    /// This is stricter than a plain `starts_with("/dashboard")`. Paths such
    /// as `/dashboards` or `/dashboard-old` are unprotected, so a signed-out
    /// request for them is allowed through (and usually answers 404) instead
    /// of being sent to sign-in.
    pub fn is_protected(&self, path: &str) -> bool {
        match path.strip_prefix(self.protected_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn decide(&self, has_session: bool, path: &str) -> RouteDecision {
        match (self.is_protected(path), has_session) {
            (true, true) => RouteDecision::Allow,
            (true, false) => RouteDecision::Deny,
            (false, true) => RouteDecision::Redirect(self.protected_prefix.clone()),
            (false, false) => RouteDecision::Allow,
        }
    }

    /// Sign-in location for a denied request, remembering where it was headed.
    pub fn login_redirect(&self, original_path: &str) -> String {
        format!(
            "{}?callbackUrl={}",
            self.login_path,
            urlencoding::encode(original_path)
        )
    }
}

/// Decide with the default `/dashboard` gate.
pub fn authorize_route(has_session: bool, path: &str) -> RouteDecision {
    RouteGate::default().decide(has_session, path)
}

/// Whether the gate runs for `path` at all: API routes, framework static
/// assets and `.png` files bypass it.
pub fn gate_applies(path: &str) -> bool {
    const BYPASS: [&str; 3] = ["/api", "/_next/static", "/_next/image"];

    let bypassed = BYPASS.iter().any(|prefix| match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    });
    !bypassed && !path.ends_with(".png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decision_table() {
        assert_eq!(authorize_route(false, "/dashboard/x"), RouteDecision::Deny);
        assert_eq!(authorize_route(true, "/dashboard/x"), RouteDecision::Allow);
        assert_eq!(
            authorize_route(true, "/login"),
            RouteDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(authorize_route(false, "/login"), RouteDecision::Allow);
    }

    #[test]
    fn protected_root_itself_is_protected() {
        assert_eq!(authorize_route(false, "/dashboard"), RouteDecision::Deny);
    }

    #[test]
    fn prefix_match_respects_segments() {
        let gate = RouteGate::default();
        assert!(gate.is_protected("/dashboard/invoices/1/edit"));
        assert!(!gate.is_protected("/dashboards"));
        assert!(!gate.is_protected("/"));
    }

    #[test]
    fn login_redirect_carries_encoded_callback() {
        assert_eq!(
            RouteGate::default().login_redirect("/dashboard/invoices?page=2"),
            "/login?callbackUrl=%2Fdashboard%2Finvoices%3Fpage%3D2"
        );
    }

    #[test]
    fn matcher_skips_api_and_assets() {
        assert!(!gate_applies("/api/health"));
        assert!(!gate_applies("/_next/static/chunk.js"));
        assert!(!gate_applies("/_next/image"));
        assert!(!gate_applies("/customers/evil-rabbit.png"));
        assert!(gate_applies("/apidocs"));
        assert!(gate_applies("/dashboard"));
        assert!(gate_applies("/login"));
    }

    proptest! {
        /// Property: with a session, every unprotected path bounces to the dashboard.
        #[test]
        fn sessions_never_see_unprotected_pages(path in "/[a-z]{0,12}") {
            prop_assume!(!RouteGate::default().is_protected(&path));
            prop_assert_eq!(
                authorize_route(true, &path),
                RouteDecision::Redirect("/dashboard".to_string())
            );
            prop_assert_eq!(authorize_route(false, &path), RouteDecision::Allow);
        }
    }
}
