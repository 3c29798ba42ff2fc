//! Log macros: `defmt` on the target, the `log` facade on the host and under test.
//!
//! Call sites use `crate::logging::info!` and friends so the same code builds for both.
//! Arguments are limited to integers, `bool`, `&str`, and [`crate::Error`], which both
//! backends can format with `{}`.

#[cfg(all(feature = "defmt", not(any(test, feature = "host"))))]
#[allow(unused_imports, reason = "not every level is used in every build")]
pub(crate) use defmt::{debug, info, trace, warn};

#[cfg(not(all(feature = "defmt", not(any(test, feature = "host")))))]
#[allow(unused_imports, reason = "not every level is used in every build")]
pub(crate) use log::{debug, info, trace, warn};
