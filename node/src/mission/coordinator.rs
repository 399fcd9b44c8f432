use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use audiocore::c2_interface::{
    epoch_seconds, DetectionEvent, InboundMessage, MessageReceiver, StreamingChannel,
};
use audiocore::classify::StateEstimator;
use audiocore::detection::{DetectionModel, DetectionResult};
use audiocore::prelude::Position;
use audiocore::telemetry::{LogManager, MetricsRecorder};
use audiocore::tracking::{CorrectionOutcome, TrackTable};
use log::{debug, warn};
use rand::{rngs::StdRng, SeedableRng};
use tokio::signal;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::mission::config::NodeConfig;

/// Wires the streaming channel, the track table, and the simulation loop
/// into one running sensor node, and owns shutdown sequencing.
pub struct Coordinator {
    config: NodeConfig,
    logger: LogManager,
}

impl Coordinator {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    /// Run until the hub closes the connection or Ctrl-C is received.
    /// A connect failure aborts startup; nothing else unwinds past here.
    pub async fn run(&self) -> anyhow::Result<()> {
        let channel = Arc::new(StreamingChannel::new(self.config.endpoint.clone()));
        channel
            .connect()
            .await
            .with_context(|| format!("connecting to C2 hub at {}", self.config.endpoint))?;
        let receiver = channel
            .receiver()
            .context("taking the inbound half of the C2 link")?;

        let table = Arc::new(TrackTable::new(self.config.seed_tracks(epoch_seconds())));
        let metrics = Arc::new(MetricsRecorder::new());
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        // Cloned before any send so a remote close can never be missed.
        let mut remote_closed = shutdown_rx.clone();

        let emitter = tokio::spawn(emission_loop(
            Arc::clone(&table),
            Arc::clone(&channel),
            DetectionModel::new(self.config.max_range_m),
            self.config.reference,
            self.config.interval_secs,
            Arc::clone(&metrics),
            shutdown_rx.clone(),
            rng,
        ));
        let dispatcher = tokio::spawn(dispatch_loop(
            receiver,
            Arc::clone(&table),
            Arc::clone(&metrics),
            shutdown_rx,
            shutdown_tx.clone(),
        ));

        tokio::select! {
            _ = signal::ctrl_c() => {
                self.logger.record("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            _ = remote_closed.changed() => {}
        }

        let _ = emitter.await;
        let _ = dispatcher.await;
        channel.close().await;

        let snapshot = metrics.snapshot();
        self.logger.record(&format!(
            "run complete: ticks {}, events {}, send failures {}, corrections {}, ignored {}",
            snapshot.ticks,
            snapshot.events_emitted,
            snapshot.send_failures,
            snapshot.corrections_applied,
            snapshot.messages_ignored
        ));
        Ok(())
    }
}

/// Timer-driven emission activity: dead-reckon every track, attempt a
/// detection per drone in stable table order, and stream the hits.
#[allow(clippy::too_many_arguments)]
async fn emission_loop(
    table: Arc<TrackTable>,
    channel: Arc<StreamingChannel>,
    model: DetectionModel,
    reference: Position,
    interval_secs: f64,
    metrics: Arc<MetricsRecorder>,
    mut shutdown: watch::Receiver<bool>,
    mut rng: StdRng,
) {
    let mut ticker = time::interval(Duration::from_secs_f64(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        table.advance_all(interval_secs, epoch_seconds());
        metrics.record_tick();

        for track in table.snapshot() {
            let rel = track.position.offset_from(&reference);
            let state = StateEstimator::estimate(&rel, &track.velocity);
            let Some(detection) = model.attempt(state, &rel, &mut rng) else {
                continue;
            };
            let result = DetectionResult::new(track.drone_id, state, detection);
            let event = DetectionEvent::from_result(&result, epoch_seconds());
            match channel.send(&event).await {
                Ok(()) => {
                    debug!(
                        "emitted {} for {} ({:.2})",
                        event.state.as_str(),
                        event.drone_id,
                        event.confidence
                    );
                    metrics.record_emitted();
                }
                Err(err) => {
                    // Non-fatal: skip this drone and let the tick continue.
                    warn!("event for {} not sent: {}", event.drone_id, err);
                    metrics.record_send_failure();
                }
            }
        }
    }
}

/// Inbound dispatch activity: applies hub corrections to the shared table
/// and announces shutdown when the hub closes the connection.
async fn dispatch_loop(
    mut receiver: MessageReceiver,
    table: Arc<TrackTable>,
    metrics: Arc<MetricsRecorder>,
    mut shutdown: watch::Receiver<bool>,
    shutdown_tx: watch::Sender<bool>,
) {
    loop {
        tokio::select! {
            message = receiver.next() => match message {
                Some(InboundMessage::DroneStateUpdate { drone_id, position, velocity }) => {
                    let outcome =
                        table.apply_correction(&drone_id, position, velocity, epoch_seconds());
                    if outcome == CorrectionOutcome::Registered {
                        debug!("registered new track {} from hub correction", drone_id);
                    }
                    metrics.record_correction();
                }
                Some(InboundMessage::Unknown) => {
                    debug!("ignoring unrecognized hub message type");
                    metrics.record_ignored();
                }
                None => {
                    debug!("hub closed the connection");
                    let _ = shutdown_tx.send(true);
                    break;
                }
            },
            _ = shutdown.changed() => break,
        }
    }
}
