use std::error::Error;

/// A set of hyperparameters whose values have not been checked for validity. A reference to the
/// checked hyperparameters can only be obtained after checking has completed.
///
/// The hyperparameter validation done in `check_ref()` and `check()` should be identical.
pub trait ParamGuard {
    /// The checked hyperparameters
    type Checked;
    /// Error type resulting from failed hyperparameter checking
    type Error: Error;

    /// Checks the hyperparameters and returns a reference to the checked hyperparameters if
    /// successful
    fn check_ref(&self) -> Result<&Self::Checked, Self::Error>;

    /// Checks the hyperparameters and returns the checked hyperparameters if successful
    fn check(self) -> Result<Self::Checked, Self::Error>;

    /// Calls `check()` and unwraps the result
    fn check_unwrap(self) -> Self::Checked
    where
        Self: Sized,
    {
        self.check().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::ParamGuard;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("radius must be positive")]
    struct RadiusError;

    struct Radius(f64);

    impl ParamGuard for Radius {
        type Checked = f64;
        type Error = RadiusError;

        fn check_ref(&self) -> Result<&f64, RadiusError> {
            if self.0 > 0. {
                Ok(&self.0)
            } else {
                Err(RadiusError)
            }
        }

        fn check(self) -> Result<f64, RadiusError> {
            self.check_ref()?;
            Ok(self.0)
        }
    }

    #[test]
    fn check_and_check_ref_agree() {
        assert!(Radius(1.5).check_ref().is_ok());
        assert_eq!(Radius(1.5).check_unwrap(), 1.5);
        assert!(Radius(-1.).check_ref().is_err());
        assert!(Radius(-1.).check().is_err());
    }

    #[test]
    #[should_panic]
    fn check_unwrap_panics_on_invalid() {
        Radius(0.).check_unwrap();
    }
}
