//! Configuration validators.
//!
//! Plugins compose one of these instead of inheriting a base behaviour:
//!
//! - [`AcceptAnyConfig`] accepts every blob, including none at all.
//! - [`OptionalJsonConfig<T>`] accepts no configuration, or JSON that
//!   deserializes into `T` and passes [`ValidateConfig::check`].
//! - [`RequireJsonConfig<T>`] is the same but rejects a missing blob.
//!
//! Blank strings count as "no configuration".

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::errors::ValidationError;

/// Validates a plugin's raw configuration blob.
pub trait ConfigValidator: Send + Sync {
    fn validate(&self, config: Option<&str>) -> Result<(), ValidationError>;
}

/// Semantic checks run after a configuration type deserialized.
pub trait ValidateConfig {
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Accepts any configuration, including none.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyConfig;

impl ConfigValidator for AcceptAnyConfig {
    fn validate(&self, _config: Option<&str>) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Accepts no configuration, or JSON for `T`.
pub struct OptionalJsonConfig<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> OptionalJsonConfig<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for OptionalJsonConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigValidator for OptionalJsonConfig<T>
where
    T: DeserializeOwned + ValidateConfig,
{
    fn validate(&self, config: Option<&str>) -> Result<(), ValidationError> {
        match non_blank(config) {
            None => Ok(()),
            Some(raw) => parse_and_check::<T>(raw),
        }
    }
}

/// Requires JSON configuration for `T`.
pub struct RequireJsonConfig<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> RequireJsonConfig<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for RequireJsonConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigValidator for RequireJsonConfig<T>
where
    T: DeserializeOwned + ValidateConfig,
{
    fn validate(&self, config: Option<&str>) -> Result<(), ValidationError> {
        let raw = non_blank(config).ok_or(ValidationError::Required)?;
        parse_and_check::<T>(raw)
    }
}

fn non_blank(config: Option<&str>) -> Option<&str> {
    config.filter(|raw| !raw.trim().is_empty())
}

fn parse_and_check<T>(raw: &str) -> Result<(), ValidationError>
where
    T: DeserializeOwned + ValidateConfig,
{
    let parsed: T =
        serde_json::from_str(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    parsed.check()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Limits {
        max: u32,
    }

    impl ValidateConfig for Limits {
        fn check(&self) -> Result<(), ValidationError> {
            if self.max == 0 {
                return Err(ValidationError::rejected("max must be at least 1"));
            }
            Ok(())
        }
    }

    #[test]
    fn accept_any_accepts_everything() {
        assert!(AcceptAnyConfig.validate(None).is_ok());
        assert!(AcceptAnyConfig.validate(Some("not json")).is_ok());
    }

    #[test]
    fn optional_accepts_missing_and_blank() {
        let v = OptionalJsonConfig::<Limits>::new();
        assert!(v.validate(None).is_ok());
        assert!(v.validate(Some("")).is_ok());
        assert!(v.validate(Some("  \n")).is_ok());
    }

    #[test]
    fn optional_checks_present_configuration() {
        let v = OptionalJsonConfig::<Limits>::new();
        assert!(v.validate(Some(r#"{"max": 5}"#)).is_ok());
        assert!(matches!(
            v.validate(Some(r#"{"max": 0}"#)),
            Err(ValidationError::Rejected(_))
        ));
        assert!(matches!(
            v.validate(Some("{")),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            v.validate(Some(r#"{"max": 1, "extra": true}"#)),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn required_rejects_missing() {
        let v = RequireJsonConfig::<Limits>::new();
        assert_eq!(v.validate(None), Err(ValidationError::Required));
        assert_eq!(v.validate(Some(" ")), Err(ValidationError::Required));
        assert!(v.validate(Some(r#"{"max": 2}"#)).is_ok());
    }
}
