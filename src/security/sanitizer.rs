//! Log-safe rendering of credentials and request URLs
//!
//! Adapters log every outbound request; Gemini carries its key in the query
//! string, so URLs are stripped before they reach a log line.

/// Sanitizer for values that may carry credentials
pub struct Sanitizer;

impl Sanitizer {
    /// Shows only the last 4 characters of a key
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_gateway::security::Sanitizer;
    ///
    /// assert_eq!(Sanitizer::sanitize_token("sk-proj-abcdefghijklmnop"), "***mnop");
    /// assert_eq!(Sanitizer::sanitize_token("abc"), "****");
    /// ```
    pub fn sanitize_token(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() > 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("***{}", tail)
        } else {
            "****".to_string()
        }
    }

    /// Removes the query string and fragment from a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_gateway::security::Sanitizer;
    ///
    /// assert_eq!(
    ///     Sanitizer::sanitize_url("https://generativelanguage.googleapis.com/v1/models?key=AIza"),
    ///     "https://generativelanguage.googleapis.com/v1/models"
    /// );
    /// ```
    pub fn sanitize_url(url: &str) -> String {
        let end = url.find(['?', '#']).unwrap_or(url.len());
        url[..end].to_string()
    }

    /// Truncates an upstream body for logging
    pub fn truncate_body(body: &str, max_chars: usize) -> String {
        if body.chars().count() <= max_chars {
            body.to_string()
        } else {
            let head: String = body.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_token_normal() {
        assert_eq!(Sanitizer::sanitize_token("sk-ant-REDACTED"), "***mnop");
    }

    #[test]
    fn test_sanitize_token_short() {
        assert_eq!(Sanitizer::sanitize_token(""), "****");
        assert_eq!(Sanitizer::sanitize_token("abcd"), "****");
        assert_eq!(Sanitizer::sanitize_token("abcde"), "***bcde");
    }

    #[test]
    fn test_sanitize_token_multibyte() {
        assert_eq!(Sanitizer::sanitize_token("密钥密钥密钥"), "***密钥密钥");
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(
            Sanitizer::sanitize_url("https://example.com/v1/models/x:generateContent?key=secret"),
            "https://example.com/v1/models/x:generateContent"
        );
        assert_eq!(
            Sanitizer::sanitize_url("https://example.com/page#frag"),
            "https://example.com/page"
        );
        assert_eq!(
            Sanitizer::sanitize_url("https://api.openai.com/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(Sanitizer::truncate_body("short", 10), "short");
        assert_eq!(Sanitizer::truncate_body("abcdefghij", 4), "abcd...");
    }
}
