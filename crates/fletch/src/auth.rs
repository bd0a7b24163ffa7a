//! Authentication modes.

/// Authentication applied to every outgoing request.
///
/// Exactly one mode is active at a time; switching modes replaces the stored
/// credentials rather than layering on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    /// No authentication header.
    #[default]
    None,
    /// HTTP basic credentials, applied only when both fields are non-empty.
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`.
    Bearer { token: String },
    /// `PRIVATE-TOKEN: <token>` (GitLab-style personal token).
    PrivateToken { token: String },
}

impl Auth {
    /// Apply this mode to an outgoing request.
    pub(crate) fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Auth::None => req,
            Auth::Basic { username, password } => {
                if username.is_empty() || password.is_empty() {
                    req
                } else {
                    req.basic_auth(username, Some(password))
                }
            }
            Auth::Bearer { token } => req.bearer_auth(token),
            Auth::PrivateToken { token } => req.header("PRIVATE-TOKEN", token),
        }
    }
}
