use common::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Runs `task` for every item with at most `concurrency` calls in flight.
///
/// The output is positional: `result[i]` is the outcome for the `i`-th item no
/// matter which call finished first. The first failure is returned and the
/// calls still in flight are dropped.
pub async fn fan_out<I, T, F, Fut>(items: I, concurrency: usize, task: F) -> Result<Vec<T>>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if concurrency == 0 {
        return Err(Error::InvalidInput("concurrency must be at least 1".into()));
    }

    let mut slots: Vec<Option<T>> = Vec::new();
    let mut in_flight = FuturesUnordered::new();

    for (index, item) in items.into_iter().enumerate() {
        slots.push(None);
        let call = task(item);
        in_flight.push(async move { (index, call.await) });

        if in_flight.len() >= concurrency {
            if let Some((done, outcome)) = in_flight.next().await {
                slots[done] = Some(outcome?);
            }
        }
    }

    while let Some((done, outcome)) = in_flight.next().await {
        slots[done] = Some(outcome?);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<T>>>()
        .ok_or_else(|| Error::InvalidInput("fan-out finished with unfilled slots".into()))
}
