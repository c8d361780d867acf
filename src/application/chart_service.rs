// Chart service - drain, parse, project on a fixed render cadence
use crate::application::ingest_service::IngestService;
use crate::domain::chart::{ChartFrame, Projector};
use crate::domain::range::TimeRange;
use crate::domain::sample::Sample;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

#[derive(Clone)]
pub struct ChartService {
    ingest: Arc<IngestService>,
    projector: Projector,
    tick: Duration,
}

impl ChartService {
    pub fn new(ingest: Arc<IngestService>, projector: Projector, tick: Duration) -> Self {
        Self {
            ingest,
            projector,
            tick,
        }
    }

    /// Re-run the whole pipeline over a fresh buffer snapshot. Malformed
    /// events are dropped here, not reported.
    pub fn render(&self, range: TimeRange, now: NaiveDateTime) -> ChartFrame {
        let raw = self.ingest.snapshot();
        let samples: Vec<Sample> = raw.iter().filter_map(|r| Sample::parse(r)).collect();
        let dropped = raw.len() - samples.len();
        if dropped > 0 {
            tracing::debug!("dropped {} malformed events of {}", dropped, raw.len());
        }
        self.projector.project(&samples, range, now)
    }

    pub fn render_now(&self, range: TimeRange) -> ChartFrame {
        self.render(range, chrono::Local::now().naive_local())
    }

    /// Emit a fresh frame on every render tick until the consumer goes
    /// away. Each frame is a full regeneration, never a partial update.
    pub fn stream_frames(&self, range: TimeRange) -> mpsc::Receiver<ChartFrame> {
        let (tx, rx) = mpsc::channel(16);
        let service = self.clone();

        tokio::spawn(async move {
            let mut ticks = IntervalStream::new(tokio::time::interval(service.tick));
            while ticks.next().await.is_some() {
                let frame = service.render_now(range);
                if tx.send(frame).await.is_err() {
                    tracing::debug!("chart consumer gone, stopping {} stream", range.name());
                    break;
                }
            }
        });

        rx
    }
}
