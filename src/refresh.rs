//! Background fetch tasks
//!
//! Each pipeline runs as its own tokio task and reports back to the dashboard
//! over an mpsc channel. A relay task watches the pipeline so that a panic
//! still produces a message, and drops the result when the dashboard has
//! been torn down in the meantime.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error};

use crate::data::{
    ContaminationClient, ContaminationError, ContaminationReport, ForecastClient, ForecastError,
    ForecastPeriod, MonitoringSite, SitesError, WaterTemperatureClient, CONTAMINATION_SITE_IDS,
    FORECAST_POINT, TEMPERATURE_SITE_IDS,
};

/// The three independent view-model slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    Sites,
    Weather,
    Ecoli,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Sites, Source::Weather, Source::Ecoli];
}

/// Messages sent from fetch tasks to the dashboard
#[derive(Debug)]
pub enum FetchMessage {
    /// Water temperature batch finished
    SitesLoaded {
        generation: u64,
        result: Result<Vec<MonitoringSite>, SitesError>,
    },
    /// Forecast lookup finished
    ForecastLoaded {
        generation: u64,
        result: Result<Vec<ForecastPeriod>, ForecastError>,
    },
    /// E. coli batch finished
    ContaminationLoaded {
        generation: u64,
        result: Result<ContaminationReport, ContaminationError>,
    },
    /// A pipeline task panicked
    PipelineCrashed {
        source: Source,
        generation: u64,
        reason: String,
    },
}

impl FetchMessage {
    pub fn source(&self) -> Source {
        match self {
            FetchMessage::SitesLoaded { .. } => Source::Sites,
            FetchMessage::ForecastLoaded { .. } => Source::Weather,
            FetchMessage::ContaminationLoaded { .. } => Source::Ecoli,
            FetchMessage::PipelineCrashed { source, .. } => *source,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            FetchMessage::SitesLoaded { generation, .. }
            | FetchMessage::ForecastLoaded { generation, .. }
            | FetchMessage::ContaminationLoaded { generation, .. }
            | FetchMessage::PipelineCrashed { generation, .. } => *generation,
        }
    }
}

/// Shared flag set once the owning dashboard is gone
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for automatic reloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between reloads of all slices; `None` disables polling
    pub interval: Option<Duration>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(15 * 60)), // 15 minutes
        }
    }
}

impl RefreshConfig {
    pub fn disabled() -> Self {
        Self { interval: None }
    }

    /// Builds a config from a minute count, where zero disables polling
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            interval: (minutes > 0).then(|| Duration::from_secs(minutes * 60)),
        }
    }

    /// When the next reload is due, counting from `from`
    pub fn next_due(&self, from: Instant) -> Option<Instant> {
        self.interval.map(|interval| from + interval)
    }
}

/// Runs the water temperature pipeline
pub async fn run_sites(client: WaterTemperatureClient, generation: u64) -> FetchMessage {
    let result = client.fetch_all(&TEMPERATURE_SITE_IDS).await;
    FetchMessage::SitesLoaded { generation, result }
}

/// Runs the forecast pipeline
pub async fn run_forecast(client: ForecastClient, generation: u64) -> FetchMessage {
    let result = client.fetch_forecast(FORECAST_POINT).await;
    FetchMessage::ForecastLoaded { generation, result }
}

/// Runs the E. coli pipeline
pub async fn run_contamination(client: ContaminationClient, generation: u64) -> FetchMessage {
    let result = client.fetch_latest(&CONTAMINATION_SITE_IDS).await;
    FetchMessage::ContaminationLoaded { generation, result }
}

/// Spawns a pipeline plus the relay that forwards its result
///
/// Returns abort handles for both tasks so teardown can stop them.
pub fn spawn_pipeline<F>(
    source: Source,
    generation: u64,
    pipeline: F,
    sender: mpsc::Sender<FetchMessage>,
    cancel: CancellationFlag,
) -> [AbortHandle; 2]
where
    F: Future<Output = FetchMessage> + Send + 'static,
{
    let worker = tokio::spawn(pipeline);
    let worker_abort = worker.abort_handle();

    let relay = tokio::spawn(async move {
        let message = match worker.await {
            Ok(message) => message,
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                error!(?source, error = %e, "fetch pipeline crashed");
                FetchMessage::PipelineCrashed {
                    source,
                    generation,
                    reason: e.to_string(),
                }
            }
        };

        if cancel.is_cancelled() {
            debug!(?source, "dropping fetch result after teardown");
            return;
        }

        if sender.send(message).await.is_err() {
            debug!(?source, "dashboard receiver closed");
        }
    });

    [worker_abort, relay.abort_handle()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.interval, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_refresh_config_from_minutes() {
        assert_eq!(
            RefreshConfig::from_minutes(5).interval,
            Some(Duration::from_secs(300))
        );
        assert_eq!(RefreshConfig::from_minutes(0), RefreshConfig::disabled());
    }

    #[test]
    fn test_next_due() {
        let now = Instant::now();
        let config = RefreshConfig::from_minutes(1);
        assert_eq!(config.next_due(now), Some(now + Duration::from_secs(60)));
        assert_eq!(RefreshConfig::disabled().next_due(now), None);
    }

    #[test]
    fn test_cancellation_flag_is_shared_between_clones() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_message_source_and_generation() {
        let message = FetchMessage::ForecastLoaded {
            generation: 7,
            result: Ok(Vec::new()),
        };
        assert_eq!(message.source(), Source::Weather);
        assert_eq!(message.generation(), 7);

        let message = FetchMessage::PipelineCrashed {
            source: Source::Ecoli,
            generation: 2,
            reason: "panic".to_string(),
        };
        assert_eq!(message.source(), Source::Ecoli);
        assert_eq!(message.generation(), 2);
    }

    #[tokio::test]
    async fn test_spawn_pipeline_forwards_result() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_pipeline(
            Source::Weather,
            3,
            async {
                FetchMessage::ForecastLoaded {
                    generation: 3,
                    result: Ok(Vec::new()),
                }
            },
            tx,
            CancellationFlag::new(),
        );

        let message = rx.recv().await.unwrap();
        assert_eq!(message.source(), Source::Weather);
        assert_eq!(message.generation(), 3);
    }

    async fn exploding_pipeline() -> FetchMessage {
        panic!("decoder exploded")
    }

    #[tokio::test]
    async fn test_spawn_pipeline_reports_panic() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_pipeline(
            Source::Sites,
            5,
            exploding_pipeline(),
            tx,
            CancellationFlag::new(),
        );

        match rx.recv().await.unwrap() {
            FetchMessage::PipelineCrashed {
                source, generation, ..
            } => {
                assert_eq!(source, Source::Sites);
                assert_eq!(generation, 5);
            }
            other => panic!("expected crash message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_pipeline_drops_result_after_cancel() {
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationFlag::new();
        cancel.cancel();

        spawn_pipeline(
            Source::Ecoli,
            1,
            async {
                FetchMessage::ContaminationLoaded {
                    generation: 1,
                    result: Ok(ContaminationReport::default()),
                }
            },
            tx,
            cancel,
        );

        // Sender is dropped by the relay without sending
        assert!(rx.recv().await.is_none());
    }
}
