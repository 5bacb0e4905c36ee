// Batch outcome tally

use std::fmt;
use std::time::Duration;

use crate::engine::ConversionOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Full video encodes committed
    pub encoded: usize,

    /// Already-compliant sources remuxed
    pub remuxed: usize,

    /// Outputs that already existed
    pub skipped: usize,

    /// Tasks that ended in any failure, including the interrupted one
    pub errors: usize,

    /// The batch stopped early on user cancellation
    pub interrupted: bool,

    /// Wall time of the whole batch
    pub elapsed: Duration,
}

impl BatchStats {
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        match outcome {
            ConversionOutcome::Encoded => self.encoded += 1,
            ConversionOutcome::Remuxed => self.remuxed += 1,
            ConversionOutcome::SkippedExists => self.skipped += 1,
            ConversionOutcome::Failed(_) => self.errors += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.encoded + self.remuxed + self.skipped + self.errors
    }

    /// Process exit code for the run
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.errors > 0 {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Encoded={}, Remuxed={}, Skipped={}, Errors={}",
            self.encoded, self.remuxed, self.skipped, self.errors
        )?;
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}
