/// Controller input polling runs at a fixed 60 Hz regardless of the world
/// tick rate.
const CONTROLLER_PERIOD_MS: f64 = 1000.0 / 60.0;

/// TPS accounting window.
const TPS_WINDOW_MS: f64 = 1000.0;

/// Which cadences fired for a given slice of elapsed wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cadence {
    /// When the world tick fired, the wall-clock milliseconds that
    /// accumulated since the previous one. The in-game clock advances by
    /// exactly this amount.
    pub world_tick: Option<f64>,
    pub controller_tick: bool,
    /// Measured ticks-per-second, reported once per accounting window.
    pub tps_report: Option<u32>,
}

/// Drives the three loop cadences from wall-clock time deltas.
///
/// Accumulators reset to zero when their phase fires rather than carrying
/// the overshoot, matching a fixed floor on the inter-tick interval. While
/// frozen, accumulators are pinned at zero so no tick debt builds up
/// behind a menu.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    world_period_ms: f64,
    world_acc_ms: f64,
    controller_acc_ms: f64,
    tps_acc_ms: f64,
    ticks_in_window: u32,
    frozen: bool,
}

impl TickScheduler {
    pub fn new(ticks_per_second: u32) -> Self {
        TickScheduler {
            world_period_ms: 1000.0 / ticks_per_second as f64,
            world_acc_ms: 0.0,
            controller_acc_ms: 0.0,
            tps_acc_ms: 0.0,
            ticks_in_window: 0,
            frozen: false,
        }
    }

    pub fn world_period_ms(&self) -> f64 {
        self.world_period_ms
    }

    /// Freeze or thaw the scheduler. Freezing discards any accumulated
    /// time immediately.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        if frozen {
            self.world_acc_ms = 0.0;
            self.controller_acc_ms = 0.0;
            self.tps_acc_ms = 0.0;
            self.ticks_in_window = 0;
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Account for elapsed wall-clock time and report which phases fire.
    pub fn advance(&mut self, elapsed_ms: f64) -> Cadence {
        if self.frozen {
            return Cadence::default();
        }

        self.world_acc_ms += elapsed_ms;
        self.controller_acc_ms += elapsed_ms;
        self.tps_acc_ms += elapsed_ms;

        let mut cadence = Cadence::default();

        if self.world_acc_ms >= self.world_period_ms {
            cadence.world_tick = Some(self.world_acc_ms);
            self.world_acc_ms = 0.0;
            self.ticks_in_window += 1;
        }

        if self.controller_acc_ms >= CONTROLLER_PERIOD_MS {
            cadence.controller_tick = true;
            self.controller_acc_ms = 0.0;
        }

        if self.tps_acc_ms >= TPS_WINDOW_MS {
            cadence.tps_report = Some(self.ticks_in_window);
            self.tps_acc_ms = 0.0;
            self.ticks_in_window = 0;
        }

        cadence
    }
}
