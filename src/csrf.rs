//! Anti-forgery token handling
//!
//! The server hands out its token in the `csrftoken` cookie and expects it
//! echoed back in the `X-CSRFToken` header on every state-mutating request.

/// Cookie carrying the token
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header the token is echoed in
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Extract the anti-forgery token from a `Cookie`-style string
/// (`name=value; other=value`). The value is passed through untouched.
pub fn token_from_cookies(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_found_among_cookies() {
        let cookies = "sessionid=abc; csrftoken=Xy9z; theme=dark";
        assert_eq!(token_from_cookies(cookies), Some("Xy9z".to_string()));
    }

    #[test]
    fn test_token_missing() {
        assert_eq!(token_from_cookies(""), None);
        assert_eq!(token_from_cookies("sessionid=abc"), None);
        assert_eq!(token_from_cookies("csrftoken="), None);
    }

    #[test]
    fn test_similar_cookie_names_not_confused() {
        let cookies = "mycsrftoken=wrong;csrftoken=right";
        assert_eq!(token_from_cookies(cookies), Some("right".to_string()));
    }

    #[test]
    fn test_value_containing_equals_kept_whole() {
        assert_eq!(
            token_from_cookies("csrftoken=a=b=c"),
            Some("a=b=c".to_string())
        );
    }
}
