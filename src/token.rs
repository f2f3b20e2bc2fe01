//! Encoded channel tokens for shareable deep links.
//!
//! A token is the URL-safe base64 encoding (with `=` padding) of the decimal
//! string of a channel id, e.g. `-1001` becomes `LTEwMDE=`. Tokens issued by
//! earlier deployments use the same scheme, so the alphabet and padding must
//! stay as they are.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

/// Encodes a channel id as a token.
#[must_use]
pub fn encode_channel_id(channel_id: i64) -> String {
    URL_SAFE.encode(channel_id.to_string())
}

/// Encodes the secondary ("request") token of a channel: the same scheme
/// applied to `req_{id}`, so it never collides with a primary token.
#[must_use]
pub fn encode_request_token(channel_id: i64) -> String {
    URL_SAFE.encode(format!("req_{channel_id}"))
}

/// Decodes a token back to a channel id. Returns `None` for malformed input.
#[must_use]
pub fn decode_channel_token(token: &str) -> Option<i64> {
    let bytes = URL_SAFE.decode(token.trim()).ok()?;
    let text = std::str::from_utf8(&bytes).ok()?;
    text.parse().ok()
}

/// Builds the `t.me` deep link that starts the bot with `token`.
#[must_use]
pub fn deep_link(bot_username: &str, token: &str) -> String {
    format!(
        "https://t.me/{}?start={token}",
        bot_username.trim_start_matches('@')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_tokens() {
        assert_eq!(encode_channel_id(100), "MTAw");
        assert_eq!(encode_channel_id(-1001), "LTEwMDE=");
        assert_eq!(encode_channel_id(-1_002_751_155_801), "LTEwMDI3NTExNTU4MDE=");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_channel_token(""), None);
        assert_eq!(decode_channel_token("!!!"), None);
        // Valid base64 of a non-number
        assert_eq!(decode_channel_token("aGVsbG8="), None);
        // Standard alphabet characters are not accepted
        assert_eq!(decode_channel_token("+/+/"), None);
    }

    #[test]
    fn test_request_token_differs_from_primary() {
        let primary = encode_channel_id(-1001);
        let request = encode_request_token(-1001);
        assert_ne!(primary, request);
        assert_eq!(decode_channel_token(&request), None);
    }

    #[test]
    fn test_deep_link() {
        assert_eq!(
            deep_link("@LinkShareBot", "MTAw"),
            "https://t.me/LinkShareBot?start=MTAw"
        );
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(id in any::<i64>()) {
            prop_assert_eq!(decode_channel_token(&encode_channel_id(id)), Some(id));
        }

        #[test]
        fn prop_tokens_are_url_safe(id in any::<i64>()) {
            let token = encode_channel_id(id);
            prop_assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')));
        }
    }
}
