//! Conversion of host run results into process exit codes.
//!
//! Every host result declares the integer type behind it, and
//! [`ExitCodeRepr`] turns that type into an `i32` the same way on every
//! platform.

use std::sync::atomic::{AtomicI32, Ordering};

/// Exit status recorded by the last completed run.
static EXIT_CODE: AtomicI32 = AtomicI32::new(0);

/// Integer types a host may use for its result codes.
pub trait ExitCodeRepr: Copy {
    /// Convert to a process exit code.
    ///
    /// Signed types and unsigned types narrower than 32 bits keep their
    /// value. `u32` keeps its bit pattern, as Windows exit codes do.
    fn to_exit_code(self) -> i32;
}

macro_rules! lossless_exit_code {
    ($($t:ty),*) => {
        $(
            impl ExitCodeRepr for $t {
                fn to_exit_code(self) -> i32 {
                    i32::from(self)
                }
            }
        )*
    };
}

lossless_exit_code!(i8, u8, i16, u16, i32);

impl ExitCodeRepr for u32 {
    fn to_exit_code(self) -> i32 {
        i32::from_ne_bytes(self.to_ne_bytes())
    }
}

/// Result returned by a host's run loop.
pub trait RunOutcome {
    /// Integer type the result is declared as
    type Code: ExitCodeRepr;

    fn code(&self) -> Self::Code;

    fn exit_code(&self) -> i32 {
        self.code().to_exit_code()
    }
}

impl RunOutcome for i32 {
    type Code = i32;

    fn code(&self) -> i32 {
        *self
    }
}

impl RunOutcome for u32 {
    type Code = u32;

    fn code(&self) -> u32 {
        *self
    }
}

/// Record the exit status the process should terminate with.
pub fn set_exit_code(code: i32) {
    EXIT_CODE.store(code, Ordering::SeqCst);
}

/// Exit status recorded by the last completed run, `0` if none.
pub fn exit_code() -> i32 {
    EXIT_CODE.load(Ordering::SeqCst)
}
