//! Logging shim.
//!
//! Forwards to `defmt` or `log` depending on the enabled feature (`defmt`
//! takes precedence when both are on). Without either feature the macros
//! only borrow their arguments so that no "unused variable" warnings leak out.

#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::defmt::trace!($s $(, $x)*)
            };
        }

        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::defmt::debug!($s $(, $x)*)
            };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::log::trace!($s $(, $x)*)
            };
        }

        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {
                ::log::debug!($s $(, $x)*)
            };
        }
    } else {
        macro_rules! trace {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }

        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }
    }
}
