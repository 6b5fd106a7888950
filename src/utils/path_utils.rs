/// Path normalization and segment helpers shared by derivation and lookup
pub struct PathUtils;

impl PathUtils {
    /// Canonical form of a claim or request path.
    ///
    /// Trims surrounding whitespace and the trailing slash, collapses empty
    /// segments, and rewrites `:id` and `<id>` (or `<int:id>`) parameter
    /// syntaxes to `{id}`. Paths without a slash (CLI commands) only get
    /// their whitespace collapsed.
    pub fn normalize(path: &str) -> String {
        let trimmed = path.trim();
        if !trimmed.contains('/') {
            return trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
        }

        let absolute = trimmed.starts_with('/');
        let segments: Vec<String> = trimmed
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Self::canonical_segment)
            .collect();

        match (absolute, segments.is_empty()) {
            (true, true) => "/".to_string(),
            (true, false) => format!("/{}", segments.join("/")),
            (false, _) => segments.join("/"),
        }
    }

    fn canonical_segment(segment: &str) -> String {
        if let Some(name) = segment.strip_prefix(':') {
            if !name.is_empty() {
                return format!("{{{}}}", name);
            }
        }
        if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            let name = inner.rsplit(':').next().unwrap_or(inner);
            if !name.is_empty() {
                return format!("{{{}}}", name);
            }
        }
        segment.to_string()
    }

    /// Parameter name of a `{name}` segment
    pub fn param_name(segment: &str) -> Option<&str> {
        segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .filter(|name| !name.is_empty())
    }

    /// Join a base path and a relative suffix with exactly one slash
    pub fn join(base: &str, suffix: &str) -> String {
        let base = base.trim_end_matches('/');
        let suffix = suffix.trim_start_matches('/');
        if suffix.is_empty() {
            if base.is_empty() {
                "/".to_string()
            } else {
                base.to_string()
            }
        } else {
            format!("{}/{}", base, suffix)
        }
    }
}
