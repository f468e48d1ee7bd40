use std::io::Write;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Destination for usage and error messages.
pub(crate) struct Output<'a> {
    sink: Box<dyn Write + 'a>,
}

impl<'a> Output<'a> {
    pub(crate) fn console() -> Self {
        Self::new(std::io::stderr())
    }

    pub(crate) fn new(sink: impl Write + 'a) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Write `message` followed by a newline.
    /// Output is best effort; a failing sink is not an error for the caller.
    pub(crate) fn print(&mut self, message: &str) {
        if let Err(_error) = writeln!(self.sink, "{message}").and_then(|_| self.sink.flush()) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Failed to write to the output: {_error}.");
            }
        }
    }
}

impl<'a> std::fmt::Debug for Output<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output{..}").finish()
    }
}
