//! Error taxonomy for the interior core.
//!
//! None of these abort vessel loading. Load-path callers log them and skip
//! the single feature that failed.

use crate::components::{ModelId, PartId};

#[derive(Debug)]
pub enum IvaError {
    /// A named transform or object required by configuration was not found
    Configuration { model: ModelId, name: String },
    /// A hide-when-open object had no candidate within tolerance
    ResourceMissing { model: ModelId, name: String },
    /// The cut barrier tried to fire outside the asset-loading phase
    BarrierMisuse { model: ModelId, discarded: usize },
    /// Interiors may only be spawned for parts on the active vessel
    InactiveVessel { part: PartId },
    /// The part has no interior model to spawn
    NoInterior { part: PartId },
    Parse(serde_json::Error),
}

impl From<serde_json::Error> for IvaError {
    fn from(e: serde_json::Error) -> Self {
        IvaError::Parse(e)
    }
}

impl std::fmt::Display for IvaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IvaError::Configuration { model, name } => {
                write!(f, "model {}: no object named '{}'", model, name)
            }
            IvaError::ResourceMissing { model, name } => {
                write!(
                    f,
                    "model {}: no '{}' within tolerance, treating as absent",
                    model, name
                )
            }
            IvaError::BarrierMisuse { model, discarded } => write!(
                f,
                "model {}: cut batch outside loading phase, discarded {} request(s)",
                model, discarded
            ),
            IvaError::InactiveVessel { part } => {
                write!(f, "part {} is not on the active vessel", part)
            }
            IvaError::NoInterior { part } => write!(f, "part {} has no interior model", part),
            IvaError::Parse(e) => write!(f, "Config parse error: {}", e),
        }
    }
}

impl std::error::Error for IvaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IvaError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_object() {
        let err = IvaError::Configuration {
            model: 4,
            name: "hatch_cutout".into(),
        };
        assert_eq!(err.to_string(), "model 4: no object named 'hatch_cutout'");
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: IvaError = parse.into();
        assert!(matches!(err, IvaError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
