use std::time::Instant;
use tracing::info;

use super::convert::Converter;
use super::runner::CommandRunner;
use super::types::{ConversionOutcome, ConversionTask};
use crate::engine::probe::StreamProbe;
use crate::stats::BatchStats;

/// Progress notifications for whoever displays the batch
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started {
        index: usize,
        total: usize,
        task: &'a ConversionTask,
    },
    Finished {
        index: usize,
        total: usize,
        task: &'a ConversionTask,
        outcome: &'a ConversionOutcome,
    },
}

/// Convert `tasks` one at a time, in order.
///
/// Outcomes only feed the tally; a failed task does not stop the batch, but a
/// cancelled one does.
pub fn run_batch<R, P, F>(
    converter: &Converter<R, P>,
    tasks: &[ConversionTask],
    mut on_event: F,
) -> BatchStats
where
    R: CommandRunner,
    P: StreamProbe,
    F: FnMut(BatchEvent<'_>),
{
    let mut stats = BatchStats::default();
    let total = tasks.len();
    let started = Instant::now();

    for (i, task) in tasks.iter().enumerate() {
        let index = i + 1;
        on_event(BatchEvent::Started { index, total, task });

        let outcome = converter.convert(task);
        stats.record(&outcome);
        on_event(BatchEvent::Finished {
            index,
            total,
            task,
            outcome: &outcome,
        });

        if outcome.is_cancelled() {
            info!(remaining = total - index, "batch interrupted");
            stats.interrupted = true;
            break;
        }
    }

    stats.elapsed = started.elapsed();
    stats
}
