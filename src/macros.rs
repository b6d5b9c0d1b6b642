/// Early-return unless the condition holds. Used by event handlers to
/// express "this event is explicitly ignored in the current state".
#[macro_export]
macro_rules! must {
    ($cond:expr) => {
        if !($cond) {
            return;
        }
    };
}

/// Refutable let with early return, optionally logging an error.
#[macro_export]
macro_rules! guard {
    ($pat:pat = $expr:expr) => {
        let $pat = $expr else {
            return;
        };
    };
    ($pat:pat = $expr:expr; error: $($arg:tt)*) => {
        let $pat = $expr else {
            $crate::log_error!($($arg)*);
            return;
        };
    };
}
