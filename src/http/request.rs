/// HTTP request methods.
///
/// The server only implements GET. Any other token is carried verbatim so it
/// can be logged before the connection is answered with 501.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// Any other method token, kept as received
    Unsupported(String),
}

impl Method {
    /// Classifies a method token from the request line.
    ///
    /// Matching is case-sensitive, as in the request line grammar.
    ///
    /// # Example
    ///
    /// ```
    /// # use webserver::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Unsupported("get".into()));
    /// ```
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            other => Method::Unsupported(other.to_string()),
        }
    }

    /// Returns the method token as it appeared on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::Unsupported(token) => token.as_str(),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request line plus header lines of one HTTP request.
///
/// Only built once the terminating blank line has been seen, so a value of
/// this type is always a syntactically complete head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    /// The HTTP method
    pub method: Method,
    /// The request target, exactly as sent (no decoding, no query splitting)
    pub path: String,
    /// HTTP version token, not validated
    pub version: String,
    /// Raw header lines in arrival order
    pub header_lines: Vec<String>,
}

impl RequestHead {
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}
