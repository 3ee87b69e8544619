// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Shorthand for `Ok(())` and `Ok(value)` at the end of a fallible function.
///
/// ```
/// use vt100_readline::ok;
///
/// fn unit() -> std::io::Result<()> { ok!() }
/// fn value() -> std::io::Result<u8> { ok!(7) }
///
/// assert!(unit().is_ok());
/// assert_eq!(value().unwrap(), 7);
/// ```
#[macro_export]
macro_rules! ok {
    () => {
        Ok(())
    };
    ($value:expr) => {
        Ok($value)
    };
}
