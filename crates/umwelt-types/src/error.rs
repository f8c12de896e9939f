//! Unified error interface.
//!
//! Every umwelt error type implements [`ErrorCode`], giving each condition
//! a stable machine-readable code and a recoverability flag. Recoverable
//! conditions (obsolete timeout, stale intent, prediction addressed to a
//! different GM) are logged and ignored; non-recoverable conditions
//! (undefined conjecture, corrupted memory) bubble to the supervising
//! runtime, which restarts the owning GM.

/// Machine-readable error codes with recoverability information.
///
/// Codes are `UPPER_SNAKE_CASE`, prefixed per layer (`DEF_`, `MEMORY_`,
/// `ENGINE_`, `APP_`), and stable once defined.
///
/// # Example
///
/// ```
/// use umwelt_types::ErrorCode;
///
/// #[derive(Debug)]
/// enum ProbeError {
///     Late,
/// }
///
/// impl ErrorCode for ProbeError {
///     fn code(&self) -> &'static str {
///         "PROBE_LATE"
///     }
///     fn is_recoverable(&self) -> bool {
///         true
///     }
/// }
///
/// assert_eq!(ProbeError::Late.code(), "PROBE_LATE");
/// ```
pub trait ErrorCode {
    /// Returns the stable, machine-readable code for this error.
    fn code(&self) -> &'static str;

    /// Returns `true` if retrying or ignoring may be appropriate.
    ///
    /// Non-recoverable errors require a definition or configuration fix
    /// and restart the owning GM.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error's code follows the umwelt conventions.
///
/// # Panics
///
/// Panics when the code is empty, misses the expected prefix, or is not
/// `UPPER_SNAKE_CASE`. Intended for tests covering all variants of an
/// error enum.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();
    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// [`assert_error_code`] over every variant of an error enum.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
