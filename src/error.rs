use thiserror::Error;

/// Faults detected while setting up an engine. Steady-state interaction
/// never produces an error: degenerate input, empty history stacks and a
/// reached polygon cap are all ordinary outcomes.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("no map renderer was supplied")]
    MissingRenderer,
    #[error("no clipping primitive was supplied")]
    MissingClipper,
    #[error("hull algorithm `{0}` is selected but no implementation was supplied")]
    MissingHull(String),
    #[error("option `{name}` is invalid: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_fault() {
        let err = ConfigError::MissingHull("concave".to_string());
        assert!(err.to_string().contains("concave"));

        let err = ConfigError::InvalidOption {
            name: "simplify_factor",
            reason: "must be finite".to_string(),
        };
        assert!(err.to_string().contains("simplify_factor"));
        assert!(err.to_string().contains("finite"));
    }
}
