//! Recipient batching and outbound pacing
//!
//! The `to` list is partitioned into consecutive fixed-size batches and
//! batch dispatch is paced so the upstream provider's requests-per-minute
//! ceiling is respected.

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::dispatch::value_objects::EmailAddress;

/// The batch partition for one send, preserving recipient order
#[derive(Debug)]
pub struct BatchPlan<'a> {
    batches: Vec<&'a [EmailAddress]>,
    pace: Option<Duration>,
}

impl<'a> BatchPlan<'a> {
    /// Partition `to` into batches of at most `batch_size`, with the
    /// inter-batch delay implied by `rate_limit` send operations per
    /// minute. A single batch needs no pacing.
    pub fn new(to: &'a [EmailAddress], batch_size: usize, rate_limit: u64) -> Self {
        let batch_size = batch_size.max(1);
        let batches: Vec<_> = to.chunks(batch_size).collect();

        let pace = (batches.len() > 1)
            .then(|| Duration::from_millis(60_000 * batch_size as u64 / rate_limit.max(1)));

        Self { batches, pace }
    }

    /// The batches, in dispatch order
    pub fn batches(&self) -> &[&'a [EmailAddress]] {
        &self.batches
    }

    /// The minimum delay between successive dispatches, if more than one
    /// batch exists
    pub fn pace(&self) -> Option<Duration> {
        self.pace
    }
}

/// Enforces the minimum spacing between batch dispatches.
///
/// The delay is a floor, not a schedule: the next dispatch may start as
/// soon as one pace interval has passed since the previous dispatch
/// *started*, so a slow provider call is credited against the wait.
#[derive(Debug)]
pub struct Pacer {
    pace: Option<Duration>,
    next_allowed: Option<Instant>,
}

impl Pacer {
    /// Create a pacer with the given inter-dispatch delay
    pub fn new(pace: Option<Duration>) -> Self {
        Self {
            pace,
            next_allowed: None,
        }
    }

    /// Suspend until the next dispatch is allowed, then mark it started
    pub async fn pace(&mut self) {
        if let Some(next_allowed) = self.next_allowed {
            tokio::time::sleep_until(next_allowed).await;
        }

        if let Some(pace) = self.pace {
            self.next_allowed = Some(Instant::now() + pace);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipients(count: usize) -> Vec<EmailAddress> {
        (0..count)
            .map(|i| EmailAddress::new_unchecked(&format!("user{i}@example.com")))
            .collect()
    }

    #[test]
    fn test_45_recipients_produce_three_ordered_batches() {
        let to = recipients(45);
        let plan = BatchPlan::new(&to, 20, 50);

        let sizes: Vec<_> = plan.batches().iter().map(|batch| batch.len()).collect();

        assert_eq!(sizes, vec![20, 20, 5]);
        assert_eq!(plan.batches()[0][0], to[0]);
        assert_eq!(plan.batches()[2][4], to[44]);
    }

    #[test]
    fn test_single_batch_has_no_pace() {
        let to = recipients(20);
        let plan = BatchPlan::new(&to, 20, 50);

        assert_eq!(plan.batches().len(), 1);
        assert_eq!(plan.pace(), None);
    }

    #[test]
    fn test_default_pace_is_24_seconds() {
        let to = recipients(45);
        let plan = BatchPlan::new(&to, 20, 50);

        assert_eq!(plan.pace(), Some(Duration::from_secs(24)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_enforces_floor_between_dispatches() {
        let mut pacer = Pacer::new(Some(Duration::from_secs(24)));
        let start = Instant::now();

        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::from_secs(24));

        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::from_secs(48));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_credits_time_spent_in_the_provider_call() {
        let mut pacer = Pacer::new(Some(Duration::from_secs(24)));

        pacer.pace().await;

        // A provider call slower than the pace satisfies the spacing on
        // its own; the pacer must not wait again.
        tokio::time::advance(Duration::from_secs(30)).await;

        let before = Instant::now();
        pacer.pace().await;

        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpaced_pacer_never_waits() {
        let mut pacer = Pacer::new(None);
        let start = Instant::now();

        pacer.pace().await;
        pacer.pace().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
