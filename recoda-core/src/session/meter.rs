use std::sync::Arc;
use std::time::Duration;

use crate::models::audio_models::AudioLevels;
use crate::models::error::CaptureError;
use crate::processing::levels;
use crate::session::ticker::Ticker;
use crate::traits::audio_graph::LevelTap;

/// Free-running level sampler over zero, one or two taps.
pub struct LevelMeter {
    ticker: Option<Ticker>,
}

impl LevelMeter {
    /// Start sampling. With no taps nothing is spawned.
    pub fn start<F>(
        mic: Option<Arc<dyn LevelTap>>,
        system: Option<Arc<dyn LevelTap>>,
        interval: Duration,
        on_levels: F,
    ) -> Result<Self, CaptureError>
    where
        F: Fn(&AudioLevels) + Send + 'static,
    {
        if mic.is_none() && system.is_none() {
            return Ok(Self { ticker: None });
        }

        let ticker = Ticker::spawn("level-meter", interval, move || {
            let levels = AudioLevels {
                mic: mic.as_deref().map(|t| levels::sample_level(Some(t))),
                system: system.as_deref().map(|t| levels::sample_level(Some(t))),
            };
            on_levels(&levels);
        })?;

        Ok(Self {
            ticker: Some(ticker),
        })
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_running)
    }

    pub fn stop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}
