use serde::Deserialize;

/// Opt-in to the stable OpenTelemetry semantic conventions (`OTEL_SEMCONV_STABILITY_OPT_IN`).
///
/// Not setting any value keeps the old, legacy semantic attribute names.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SemconvStabilityOptIn {
    /// Emit the new, stable HTTP and networking attributes and stop emitting the old experimental
    /// ones.
    #[serde(rename = "http")]
    Http,
    /// Emit both the old and the stable HTTP and networking attributes.
    #[serde(rename = "http/dup")]
    HttpDup,
}

/// Attribute naming generations that instrumentations emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemanticConventions {
    #[default]
    Legacy,
    Stable,
    Duplicate,
}

impl SemanticConventions {
    pub fn emit_legacy(&self) -> bool {
        matches!(self, Self::Legacy | Self::Duplicate)
    }

    pub fn emit_stable(&self) -> bool {
        matches!(self, Self::Stable | Self::Duplicate)
    }
}

impl From<Option<SemconvStabilityOptIn>> for SemanticConventions {
    fn from(value: Option<SemconvStabilityOptIn>) -> Self {
        match value {
            None => Self::Legacy,
            Some(SemconvStabilityOptIn::Http) => Self::Stable,
            Some(SemconvStabilityOptIn::HttpDup) => Self::Duplicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::legacy(None, true, false)]
    #[case::stable(Some(SemconvStabilityOptIn::Http), false, true)]
    #[case::duplicate(Some(SemconvStabilityOptIn::HttpDup), true, true)]
    fn emitted_conventions(
        #[case] opt_in: Option<SemconvStabilityOptIn>,
        #[case] legacy: bool,
        #[case] stable: bool,
    ) {
        let conventions = SemanticConventions::from(opt_in);
        assert_eq!(conventions.emit_legacy(), legacy);
        assert_eq!(conventions.emit_stable(), stable);
    }

    #[test]
    fn deserialize_opt_in() {
        assert_eq!(
            serde_yaml::from_str::<SemconvStabilityOptIn>("http").unwrap(),
            SemconvStabilityOptIn::Http
        );
        assert_eq!(
            serde_yaml::from_str::<SemconvStabilityOptIn>("http/dup").unwrap(),
            SemconvStabilityOptIn::HttpDup
        );
        assert!(serde_yaml::from_str::<SemconvStabilityOptIn>("database").is_err());
    }
}
