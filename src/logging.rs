//! ANSI console logging. The `\r\x1b[2K` prefix clears the current prompt
//! line so log output and the interactive console can share one terminal.

#[macro_export]
macro_rules! log {
    () => {{
        println!("\r\x1b[2K")
    }};
    ($($arg:tt)*) => {{
        println!("\r\x1b[2K{}", format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_colored {
    ($color:literal; $($arg:tt)*) => {{
        print!(concat!("\r\x1b[2K\x1b[", $color, "m"));
        print!($($arg)*);
        println!("\x1b[39m");
    }};
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => { $crate::log_colored!("32"; $($arg)*) };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => { $crate::log_colored!("33"; $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log_colored!("31"; $($arg)*) };
}
