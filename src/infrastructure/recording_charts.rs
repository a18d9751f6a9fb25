// Recording chart renderer - keeps live chart configs instead of painting them
use crate::application::chart_view::{ChartHandle, ChartRenderer};
use crate::application::charts::config::ChartConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Log {
    created: usize,
    destroyed: usize,
    redraws: usize,
    live: HashMap<String, usize>,
}

/// Counts chart lifecycles per canvas. The configs themselves stay with
/// the handles the registry owns.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<Log>>,
}

fn lock(log: &Mutex<Log>) -> MutexGuard<'_, Log> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        lock(&self.log).created
    }

    pub fn destroyed(&self) -> usize {
        lock(&self.log).destroyed
    }

    pub fn redraws(&self) -> usize {
        lock(&self.log).redraws
    }

    /// Number of charts currently bound to `canvas_id`.
    pub fn live_on(&self, canvas_id: &str) -> usize {
        lock(&self.log).live.get(canvas_id).copied().unwrap_or(0)
    }
}

impl ChartRenderer for RecordingRenderer {
    fn create(&self, canvas_id: &str, config: ChartConfig) -> Box<dyn ChartHandle> {
        let mut log = lock(&self.log);
        log.created += 1;
        *log.live.entry(canvas_id.to_string()).or_default() += 1;
        tracing::debug!(
            "Chart created on {} with {} datasets",
            canvas_id,
            config.data.datasets.len()
        );
        Box::new(RecordedChart {
            canvas_id: canvas_id.to_string(),
            config,
            log: self.log.clone(),
            destroyed: false,
        })
    }
}

struct RecordedChart {
    canvas_id: String,
    config: ChartConfig,
    log: Arc<Mutex<Log>>,
    destroyed: bool,
}

impl ChartHandle for RecordedChart {
    fn config(&self) -> &ChartConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ChartConfig {
        &mut self.config
    }

    fn redraw(&mut self) {
        lock(&self.log).redraws += 1;
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let mut log = lock(&self.log);
        log.destroyed += 1;
        if let Some(live) = log.live.get_mut(&self.canvas_id) {
            *live = live.saturating_sub(1);
        }
    }
}
