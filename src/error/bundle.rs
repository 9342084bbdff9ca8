//! Data stream resolution errors

use super::OvalError;

/// Creates a bundle parse error
pub fn parse_failed(origin: impl Into<String>, reason: impl Into<String>) -> OvalError {
    OvalError::BundleParseError {
        origin: origin.into(),
        reason: reason.into(),
    }
}

/// Creates an ambiguous data stream error from the candidate ids
pub fn ambiguous_datastream<S: AsRef<str>>(candidates: &[S]) -> OvalError {
    OvalError::AmbiguousDatastream {
        candidates: join(candidates),
    }
}

/// Creates a data stream not found error
pub fn datastream_not_found(id: impl Into<String>) -> OvalError {
    OvalError::DatastreamNotFound { id: id.into() }
}

/// Creates an ambiguous component error from the candidate ids
pub fn ambiguous_component<S: AsRef<str>>(role: impl Into<String>, candidates: &[S]) -> OvalError {
    OvalError::AmbiguousComponent {
        role: role.into(),
        candidates: join(candidates),
    }
}

/// Creates a component not found error
pub fn component_not_found(role: impl Into<String>, id: impl Into<String>) -> OvalError {
    OvalError::ComponentNotFound {
        role: role.into(),
        id: id.into(),
    }
}

/// Creates an internal resolution error
pub fn internal_resolution(href: impl Into<String>) -> OvalError {
    OvalError::InternalResolutionError { href: href.into() }
}

fn join<S: AsRef<str>>(candidates: &[S]) -> String {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_datastream_lists_candidates() {
        let err = ambiguous_datastream(&["scap_a_datastream_1", "scap_a_datastream_2"]);
        assert!(matches!(err, OvalError::AmbiguousDatastream { .. }));
        assert!(
            err.to_string()
                .contains("scap_a_datastream_1, scap_a_datastream_2")
        );
    }

    #[test]
    fn test_ambiguous_component() {
        let err = ambiguous_component("checks", &["scap_a_cref_1", "scap_a_cref_2"]);
        assert!(matches!(err, OvalError::AmbiguousComponent { .. }));
        assert!(err.to_string().contains("'checks'"));
    }

    #[test]
    fn test_internal_resolution() {
        let err = internal_resolution("oval.xml");
        assert!(matches!(err, OvalError::InternalResolutionError { .. }));
        assert!(err.to_string().contains("Internal error"));
    }
}
