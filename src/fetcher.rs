use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::addresses::Coordinate;
use crate::error::LookupError;
use crate::isochrone::IsochronePolygon;

/// A single-coordinate isochrone lookup. Shared across every worker, so it
/// must be usable from many tasks at once.
pub trait IsochroneLookup: Send + Sync + 'static {
    fn lookup(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<IsochronePolygon, LookupError>> + Send;
}

/// Terminal state of one lookup task, tied back to the input row it came from.
#[derive(Debug)]
pub struct Outcome {
    pub index: usize,
    pub coordinate: Coordinate,
    pub result: Result<IsochronePolygon, LookupError>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs one lookup per coordinate with at most `max_workers` in flight.
///
/// Returns exactly one outcome per coordinate, sorted by input index. Tasks
/// wait on a semaphore until a worker slot frees up; results are gathered in
/// completion order. A failed lookup is terminal, nothing is retried.
pub async fn fetch_all<L>(
    lookup: Arc<L>,
    coordinates: &[Coordinate],
    max_workers: usize,
) -> Vec<Outcome>
where
    L: IsochroneLookup,
{
    if coordinates.is_empty() {
        return Vec::new();
    }

    let workers = max_workers.max(1);
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    log::info!(
        "Fetching {} isochrones with {} workers",
        coordinates.len(),
        workers
    );

    for (index, &coordinate) in coordinates.iter().enumerate() {
        let lookup = Arc::clone(&lookup);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => lookup.lookup(coordinate).await,
                Err(e) => Err(LookupError::Aborted(e.to_string())),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<IsochronePolygon, LookupError>>> =
        (0..coordinates.len()).map(|_| None).collect();
    let mut completed = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Err(e) = &result {
                    log::warn!("Lookup {index} at {} failed: {e}", coordinates[index]);
                }
                slots[index] = Some(result);
                completed += 1;
                log::debug!("{completed}/{} lookups finished", coordinates.len());
            }
            // The index is lost with the panic; the empty slot is filled below
            Err(e) => log::error!("Lookup task did not finish: {e}"),
        }
    }

    slots
        .into_iter()
        .zip(coordinates)
        .enumerate()
        .map(|(index, (slot, &coordinate))| Outcome {
            index,
            coordinate,
            result: slot.unwrap_or_else(|| {
                Err(LookupError::Aborted("task panicked".to_string()))
            }),
        })
        .collect()
}
