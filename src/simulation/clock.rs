const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// The in-game clock. One in-game day passes every `day_length_mins` real
/// minutes; the timer advances by the world tick's accumulated wall-clock
/// milliseconds, so the clock only moves when the simulation does.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    day_length_ms: f64,
    timer_ms: f64,
    day: u32,
    pub twelve_hour: bool,
}

impl Clock {
    /// A fresh clock starting at 09:00 on day 0.
    pub fn new(day_length_mins: u32) -> Self {
        let mut clock = Clock {
            day_length_ms: day_length_mins as f64 * 60_000.0,
            timer_ms: 0.0,
            day: 0,
            twelve_hour: false,
        };
        clock.set_time(9, 0);
        clock
    }

    /// Restore a clock from persisted state.
    pub fn from_state(day_length_mins: u32, timer_ms: f64, day: u32, twelve_hour: bool) -> Self {
        Clock {
            day_length_ms: day_length_mins as f64 * 60_000.0,
            timer_ms: timer_ms.clamp(0.0, day_length_mins as f64 * 60_000.0),
            day,
            twelve_hour,
        }
    }

    /// Jump to a time of day without touching the day counter.
    pub fn set_time(&mut self, hour: u32, minute: u32) {
        let day_fraction = (hour as f64 * 60.0 + minute as f64) / MINUTES_PER_DAY;
        self.timer_ms = self.day_length_ms * day_fraction;
    }

    /// Advance by real milliseconds, rolling over at midnight.
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.timer_ms += elapsed_ms;
        while self.timer_ms >= self.day_length_ms {
            self.timer_ms -= self.day_length_ms;
            self.day += 1;
        }
    }

    /// Fraction of the current day elapsed, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.timer_ms / self.day_length_ms
    }

    pub fn timer_ms(&self) -> f64 {
        self.timer_ms
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// In-game minutes elapsed today. The epsilon absorbs float error from
    /// the set_time round trip so 09:00 never reads back as 08:59.
    fn minutes_of_day(&self) -> u32 {
        ((self.progress() * MINUTES_PER_DAY + 1e-6) as u32) % MINUTES_PER_DAY as u32
    }

    pub fn hour(&self) -> u32 {
        self.minutes_of_day() / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes_of_day() % 60
    }
}

impl std::fmt::Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hour = self.hour();
        let minute = self.minute();
        if self.twelve_hour {
            let meridiem = if hour < 12 { "am" } else { "pm" };
            let display_hour = match hour % 12 {
                0 => 12,
                h => h,
            };
            write!(f, "{}:{:02} {} (day {})", display_hour, minute, meridiem, self.day)
        } else {
            write!(f, "{:02}:{:02} (day {})", hour, minute, self.day)
        }
    }
}
