//! Rounds Verify: item checks for processors.
//!
//! A [`Verifier`] builds [`Verification`]s against a single diagnostics sink.
//! Each verification carries a message template whose bracketed clause is
//! kept or dropped depending on whether the check was inverted:
//!
//! ```ignore
//! use rounds_verify::{Verifiable, Verifier};
//!
//! let verifier = Verifier::new(diagnostics);
//! verifier
//!     .is_interface(&item)
//!     .not()
//!     .because_annotated("Mapper")
//!     .fail_on_violation();
//! // error: "a.FooMapper should not be an interface, because it is annotated with @Mapper"
//! ```

pub mod template;
pub mod verification;
pub mod verifier;

pub use verification::{Reasoned, Verifiable, Verification};
pub use verifier::Verifier;
