//! Webhook subscription handshake.
//!
//! When the webhook is registered, the platform calls
//! `GET /webhook?hub.mode=subscribe&hub.verify_token=<token>&hub.challenge=<value>`
//! and expects the challenge echoed back if the token matches the one typed
//! into its dashboard.

use tracing::warn;

/// The only `hub.mode` that can succeed.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Check a verification handshake.
///
/// # Arguments
///
/// * `mode` - The `hub.mode` query parameter
/// * `token` - The `hub.verify_token` query parameter
/// * `challenge` - The `hub.challenge` query parameter
/// * `expected_token` - The configured verify token, if any
///
/// # Returns
///
/// The challenge to echo back (empty when the platform sent none) on
/// success, `None` otherwise.
pub fn verify_subscription<'a>(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&'a str>,
    expected_token: Option<&str>,
) -> Option<&'a str> {
    let Some(expected) = expected_token else {
        warn!("verify_token_not_configured");
        return None;
    };

    if mode != Some(SUBSCRIBE_MODE) {
        return None;
    }

    match token {
        Some(provided) if constant_time_compare(provided, expected) => {
            Some(challenge.unwrap_or_default())
        }
        _ => None,
    }
}

/// Constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check if a usable verify token is configured.
pub fn is_verification_enabled(verify_token: &Option<String>) -> bool {
    verify_token
        .as_ref()
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Option<&str> = Some("ardanai");

    #[test]
    fn test_verify_subscription_valid() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("ardanai"), Some("1158201444"), TOKEN),
            Some("1158201444")
        );
    }

    #[test]
    fn test_verify_subscription_empty_challenge() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("ardanai"), Some(""), TOKEN),
            Some("")
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("ardanai"), None, TOKEN),
            Some("")
        );
    }

    #[test]
    fn test_verify_subscription_wrong_mode() {
        assert!(verify_subscription(Some("unsubscribe"), Some("ardanai"), Some("c"), TOKEN).is_none());
        assert!(verify_subscription(Some("Subscribe"), Some("ardanai"), Some("c"), TOKEN).is_none());
        assert!(verify_subscription(None, Some("ardanai"), Some("c"), TOKEN).is_none());
    }

    #[test]
    fn test_verify_subscription_wrong_token() {
        assert!(verify_subscription(Some("subscribe"), Some("ardana"), Some("c"), TOKEN).is_none());
        assert!(verify_subscription(Some("subscribe"), Some("ardanai "), Some("c"), TOKEN).is_none());
        assert!(verify_subscription(Some("subscribe"), None, Some("c"), TOKEN).is_none());
    }

    #[test]
    fn test_verify_subscription_not_configured() {
        assert!(verify_subscription(Some("subscribe"), Some(""), Some("c"), None).is_none());
        assert!(verify_subscription(Some("subscribe"), Some("ardanai"), Some("c"), None).is_none());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[test]
    fn test_is_verification_enabled() {
        assert!(!is_verification_enabled(&None));
        assert!(!is_verification_enabled(&Some("".to_string())));
        assert!(!is_verification_enabled(&Some("   ".to_string())));
        assert!(is_verification_enabled(&Some("ardanai".to_string())));
    }
}
