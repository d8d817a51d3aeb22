//! Hardware-address frame filter.

/// Which frames make it into the trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    target: Option<String>,
}

impl FilterCriteria {
    /// Let every frame through.
    pub fn any() -> Self {
        Self { target: None }
    }

    /// Only frames sent to or from `target`, given as `AA:BB:CC:DD:EE:FF`.
    ///
    /// The comparison is exact: lowercase hex never matches.
    pub fn mac(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Check formatted source and destination MACs against the target.
    pub fn matches(&self, source: &str, destination: &str) -> bool {
        match &self.target {
            Some(target) => source == target || destination == target,
            None => true,
        }
    }
}
