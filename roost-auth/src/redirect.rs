//! Post-sign-in redirect policy
//!
//! Decides where the browser lands after a sign-in attempt. The decision is
//! an explicit value so the open-redirect behaviour can be inspected and
//! tested on its own.

use tracing::{debug, warn};
use url::Url;

/// Error code the sign-in surface appends when a federated sign-in aborts
/// mid-flow.
pub const CALLBACK_ERROR: &str = "Callback";

/// Outcome of a redirect decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Send the browser to the site's base URL
    Base,
    /// Target is on the site's own origin
    SameOrigin(String),
    /// Target is on a foreign origin (or could not be parsed)
    External(String),
}

/// Redirect policy.
///
/// The default policy returns external targets unchanged, which is an open
/// redirect. [`RedirectPolicy::same_origin_only`] rewrites them to the base
/// URL instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectPolicy {
    allow_external: bool,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            allow_external: true,
        }
    }
}

impl RedirectPolicy {
    /// Policy that follows external targets.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Policy that never leaves the base origin.
    pub fn same_origin_only() -> Self {
        Self {
            allow_external: false,
        }
    }

    /// Whether external targets are followed.
    pub fn allows_external(&self) -> bool {
        self.allow_external
    }

    /// Classify a requested redirect target against the base URL.
    pub fn decide(&self, url: &str, base_url: &str) -> RedirectDecision {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                warn!("Base URL {} is not absolute: {}", base_url, e);
                return RedirectDecision::External(url.to_string());
            }
        };

        if url.starts_with('/') && !url.starts_with("//") {
            return match base.join(url) {
                Ok(joined) if has_callback_error(&joined) => RedirectDecision::Base,
                Ok(_) => RedirectDecision::SameOrigin(format!(
                    "{}{}",
                    base_url.trim_end_matches('/'),
                    url
                )),
                Err(_) => RedirectDecision::Base,
            };
        }

        match Url::parse(url) {
            Ok(target) if has_callback_error(&target) => RedirectDecision::Base,
            Ok(target) if target.origin() == base.origin() => {
                RedirectDecision::SameOrigin(url.to_string())
            }
            _ => RedirectDecision::External(url.to_string()),
        }
    }

    /// Resolve a requested redirect target to the URL the browser is sent to.
    pub fn resolve(&self, url: &str, base_url: &str) -> String {
        match self.decide(url, base_url) {
            RedirectDecision::Base => {
                debug!("Redirecting to base URL");
                base_url.to_string()
            }
            RedirectDecision::SameOrigin(target) => target,
            RedirectDecision::External(target) if self.allow_external => {
                debug!("Following external redirect to {}", target);
                target
            }
            RedirectDecision::External(target) => {
                warn!("Refusing external redirect to {}", target);
                base_url.to_string()
            }
        }
    }
}

fn has_callback_error(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == "error" && value == CALLBACK_ERROR)
}
