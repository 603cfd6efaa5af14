//! Error logging utilities for miette formatting in tracing

/// Log an error at ERROR level using its Debug form, which miette renders
/// with code and help
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let err = &$err;
        tracing::error!("{:?}", err);
    }};
    ($msg:expr, $err:expr) => {{
        let err = &$err;
        tracing::error!("{}: {:?}", $msg, err);
    }};
}

/// Format an error together with its cause chain
pub trait ErrorLogging {
    fn log_format(&self) -> String;
}

impl<E: std::error::Error> ErrorLogging for E {
    fn log_format(&self) -> String {
        use std::fmt::Write;
        let mut output = self.to_string();

        let mut current = self.source();
        let mut depth = 1;
        if current.is_some() {
            output.push_str("\n\nCaused by:");
        }
        while let Some(cause) = current {
            let _ = write!(output, "\n  {}: {}", depth, cause);
            current = cause.source();
            depth += 1;
        }

        output
    }
}
