//! Password generation port and the default random implementation.

pub mod random;

use crate::core::errors::{PwoError, Result};
use crate::options::state::GenerationRequest;

pub use random::RandomPasswordGenerator;

/// Produces a password for a set of options.
///
/// Implementations must return exactly `request.length` characters, include
/// at least `min_numbers` digits when numbers are enabled and `min_special`
/// symbols when special characters are enabled, and draw only from enabled
/// classes.
pub trait PasswordGenerator {
    /// Produce one password, or reject the request.
    fn generate(&mut self, request: &GenerationRequest) -> Result<String>;
}

/// Reject requests no generator can satisfy.
pub fn check_request(request: &GenerationRequest) -> Result<()> {
    if request.length == 0 {
        return Err(PwoError::InvalidLength {
            length: request.length,
        });
    }
    if !request.has_enabled_class() {
        return Err(PwoError::EmptyAlphabet);
    }
    let required = request.required_chars();
    if required > request.length {
        return Err(PwoError::InfeasibleMinimums {
            required,
            length: request.length,
        });
    }
    Ok(())
}
