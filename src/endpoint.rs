//! Endpoint state and combo-capability detection.
//!
//! The delivery endpoint is the only piece of state the embedding
//! environment mutates at runtime. Every assignment recomputes whether the
//! endpoint supports request combination by scanning the configured
//! allow-list for a substring match.

/// True when `endpoint` contains any allow-list entry as a substring.
/// First match wins; an empty allow-list never matches.
pub fn is_combo_endpoint(endpoint: &str, allow_list: &[String]) -> bool {
    allow_list.iter().any(|prefix| endpoint.contains(prefix.as_str()))
}

/// Latest endpoint value plus the derived combo capability.
#[derive(Debug, Default)]
pub(crate) struct EndpointState {
    value: String,
    combo_capable: bool,
}

impl EndpointState {
    /// Assign a new endpoint and recompute capability. Returns the new
    /// capability so the caller can swap the dispatch timer.
    pub(crate) fn set(&mut self, value: String, allow_list: &[String]) -> bool {
        self.combo_capable = is_combo_endpoint(&value, allow_list);
        self.value = value;
        self.combo_capable
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn combo_capable(&self) -> bool {
        self.combo_capable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_allow_list_never_matches() {
        assert!(!is_combo_endpoint("https://cdn.example/assets/", &[]));
    }

    #[test]
    fn substring_match_qualifies() {
        let list = allow(&["https://cdn.example/"]);
        assert!(is_combo_endpoint("https://cdn.example/assets/", &list));
        assert!(!is_combo_endpoint("https://other.example/assets/", &list));
    }

    #[test]
    fn any_entry_qualifies() {
        let list = allow(&["https://a.example/", "https://b.example/"]);
        assert!(is_combo_endpoint("https://b.example/static/", &list));
    }

    #[test]
    fn capability_is_pure_function_of_latest_value() {
        let list = allow(&["https://cdn.example/"]);
        let mut state = EndpointState::default();

        assert!(state.set("https://cdn.example/assets/".to_string(), &list));
        assert!(state.combo_capable());
        assert_eq!(state.value(), "https://cdn.example/assets/");

        assert!(!state.set("https://origin.example/assets/".to_string(), &list));
        assert!(!state.combo_capable());
        assert_eq!(state.value(), "https://origin.example/assets/");

        // Re-assigning the same value is idempotent.
        assert!(!state.set("https://origin.example/assets/".to_string(), &list));
        assert!(!state.combo_capable());
    }
}
