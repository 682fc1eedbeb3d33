/// Abstraction over time sources.
/// Implementations: SystemTimeProvider (production), MockTimeProvider (testing).
pub trait TimeProvider {
    /// Current time in microseconds from an arbitrary epoch.
    fn now_us(&self) -> i64;
}

/// System time provider using std::time::Instant.
pub struct SystemTimeProvider {
    start: std::time::Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_us(&self) -> i64 {
        i64::try_from(self.start.elapsed().as_micros()).unwrap_or(i64::MAX)
    }
}

/// Mock time provider for deterministic testing.
pub struct MockTimeProvider {
    current_us: std::cell::Cell<i64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self {
            current_us: std::cell::Cell::new(0),
        }
    }

    pub fn set_time(&self, us: i64) {
        self.current_us.set(us);
    }

    pub fn advance(&self, delta_us: i64) {
        self.current_us.set(self.current_us.get() + delta_us);
    }
}

impl Default for MockTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_us(&self) -> i64 {
        self.current_us.get()
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for &T {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }
}

/// User timing correction added to every clock read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockOffset {
    ms: i32,
}

impl ClockOffset {
    pub const MAX_MS: i32 = 500;

    /// Values outside ±500 ms are clamped.
    pub fn from_ms(ms: i32) -> Self {
        Self {
            ms: ms.clamp(-Self::MAX_MS, Self::MAX_MS),
        }
    }

    pub fn ms(self) -> i32 {
        self.ms
    }

    pub fn as_seconds(self) -> f64 {
        f64::from(self.ms) / 1000.0
    }
}

/// Song-time clock: provider time since playback start, minus the audio
/// output latency, plus the caller's offset.
pub struct PlaybackClock<T: TimeProvider> {
    provider: T,
    start_us: i64,
    output_latency_us: i64,
}

impl<T: TimeProvider> PlaybackClock<T> {
    /// Starts counting from the provider's current time.
    pub fn new(provider: T) -> Self {
        let start_us = provider.now_us();
        Self {
            provider,
            start_us,
            output_latency_us: 0,
        }
    }

    pub fn with_output_latency(mut self, latency_us: i64) -> Self {
        self.output_latency_us = latency_us.max(0);
        self
    }

    /// Reset song time zero to now.
    pub fn restart(&mut self) {
        self.start_us = self.provider.now_us();
    }

    /// Song time in seconds.
    pub fn read(&self, offset: ClockOffset) -> f64 {
        let elapsed_us = self.provider.now_us() - self.start_us - self.output_latency_us;
        elapsed_us as f64 / 1_000_000.0 + offset.as_seconds()
    }
}
