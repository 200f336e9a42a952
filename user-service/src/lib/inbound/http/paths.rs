//! Routes reachable without a bearer token.

pub const REGISTER: &str = "/api/v1/users/register";
pub const LOGIN: &str = "/api/v1/users/login";
pub const USER_BY_ID: &str = "/api/v1/users/:user_id";

/// Path patterns that bypass the authentication gate.
pub const PUBLIC_ENDPOINTS: &[&str] = &[
    REGISTER,
    LOGIN,
    "/v3/api-docs/**",
    "/swagger-ui/**",
    "/swagger-ui.html",
    "/swagger-resources/**",
    "/webjars/**",
];

#[derive(Debug, Clone)]
pub struct PublicPaths {
    patterns: Vec<String>,
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self::new(PUBLIC_ENDPOINTS.iter().copied())
    }
}

impl PublicPaths {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            patterns: patterns.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| matches_pattern(pattern, path))
    }
}

/// Ant-style path matching.
///
/// `**` spans zero or more whole segments, `*` any run of characters inside one
/// segment and `?` exactly one character.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = segments(pattern).collect();
    let path: Vec<&str> = segments(path).collect();
    match_segments(&pattern, &path)
}

fn segments(s: &str) -> impl Iterator<Item = &str> {
    s.split('/').filter(|segment| !segment.is_empty())
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((head, rest)) => match path.split_first() {
            Some((segment, remaining)) => {
                match_segment(head.as_bytes(), segment.as_bytes()) && match_segments(rest, remaining)
            }
            None => false,
        },
    }
}

fn match_segment(pattern: &[u8], segment: &[u8]) -> bool {
    match pattern.split_first() {
        None => segment.is_empty(),
        Some((b'*', rest)) => (0..=segment.len()).any(|skip| match_segment(rest, &segment[skip..])),
        Some((b'?', rest)) => !segment.is_empty() && match_segment(rest, &segment[1..]),
        Some((c, rest)) => segment.first() == Some(c) && match_segment(rest, &segment[1..]),
    }
}
