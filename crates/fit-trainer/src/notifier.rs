//! Spoken feedback for session events

use crate::config::VoiceConfig;
use fit_core::FitResult;
use fit_processing::SessionEvent;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Output device for spoken cues
pub trait SpeechSink: Send {
    fn speak(&mut self, text: &str) -> FitResult<()>;
}

/// Writes cues to the log instead of an audio device
#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechSink for LogSpeech {
    fn speak(&mut self, text: &str) -> FitResult<()> {
        info!(target: "voice", "{}", text);
        Ok(())
    }
}

/// Counters reported when the notifier finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifierStats {
    pub spoken: u64,
    pub throttled: u64,
    pub failed: u64,
}

/// Turns session events into throttled voice cues.
///
/// Repetition cues that arrive within the minimum interval of the previous
/// cue are dropped. Set and workout milestones are always spoken.
pub struct VoiceNotifier<S: SpeechSink> {
    sink: S,
    config: VoiceConfig,
    last_cue: Option<Instant>,
    stats: NotifierStats,
}

impl<S: SpeechSink> VoiceNotifier<S> {
    pub fn new(sink: S, config: VoiceConfig) -> Self {
        VoiceNotifier {
            sink,
            config,
            last_cue: None,
            stats: NotifierStats::default(),
        }
    }

    /// Handle one event; returns true when a cue was spoken
    pub fn handle(&mut self, event: &SessionEvent) -> bool {
        self.handle_at(event, Instant::now())
    }

    fn handle_at(&mut self, event: &SessionEvent, now: Instant) -> bool {
        if !self.config.enabled {
            return false;
        }

        let Some(text) = event.announcement() else {
            return false;
        };

        let milestone = !matches!(event, SessionEvent::Repetition { .. });
        let min_interval = Duration::from_millis(self.config.min_cue_interval_ms);
        let too_soon = self
            .last_cue
            .is_some_and(|last| now.saturating_duration_since(last) < min_interval);

        if too_soon && !milestone {
            self.stats.throttled += 1;
            debug!(cue = %text, "Cue throttled");
            return false;
        }

        self.last_cue = Some(now);
        match self.sink.speak(&text) {
            Ok(()) => {
                self.stats.spoken += 1;
                true
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(error = %e, "Speech output failed");
                false
            }
        }
    }

    /// Speak cues until the event channel closes
    pub async fn run(mut self, mut events: broadcast::Receiver<SessionEvent>) -> NotifierStats {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Stale cues are worthless; resume from the newest event
                    self.stats.throttled += skipped;
                    debug!(skipped, "Notifier lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.stats
    }

    pub fn stats(&self) -> NotifierStats {
        self.stats
    }
}
