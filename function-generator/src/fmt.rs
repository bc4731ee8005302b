//! Internal logging macros.
//!
//! With the `defmt` feature these forward to the matching `defmt` macro.
//! Without it they only borrow their arguments so call sites stay warning-free.

#![allow(unused_macros)]

macro_rules! log_event {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        let _ = ($( &$x, )*);
    }};
}

macro_rules! trace {
    ($($t:tt)*) => { log_event!(trace, $($t)*) };
}

macro_rules! debug {
    ($($t:tt)*) => { log_event!(debug, $($t)*) };
}

macro_rules! info {
    ($($t:tt)*) => { log_event!(info, $($t)*) };
}

macro_rules! warn {
    ($($t:tt)*) => { log_event!(warn, $($t)*) };
}

macro_rules! error {
    ($($t:tt)*) => { log_event!(error, $($t)*) };
}
