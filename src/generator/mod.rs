//! Periodic random sample generator
//!
//! Stands in for the board sketch: after an optional header line it writes
//! one `<integer> <float>` line per elapsed interval. Time comes from a
//! `Clock`, so the same loop runs against wall-clock time on a real port and
//! against a simulated clock in tests.

pub mod clock;
pub mod random;

pub use clock::{Clock, ManualClock, SystemClock};
pub use random::{random_float, random_integer};

use crate::error::CaptureError;
use crate::transport::Transport;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Header line announcing the two columns
pub const HEADER_LINE: &str = "Integers, Floats";

pub const DEFAULT_INTERVAL_MS: u64 = 500;
pub const DEFAULT_FLOAT_PRECISION: usize = 4;

/// Poll period while waiting for the transport to come up
const READY_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub interval_ms: u64,
    pub emit_header: bool,
    pub int_lower: i64,
    pub int_upper: i64,
    pub float_scale: f64,
    pub float_precision: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            emit_header: true,
            int_lower: random::DEFAULT_INT_LOWER,
            int_upper: random::DEFAULT_INT_UPPER,
            float_scale: random::DEFAULT_FLOAT_SCALE,
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

/// One generated pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub integer: i64,
    pub float: f64,
}

impl Sample {
    /// Wire form, e.g. `42 0.3782`
    pub fn to_line(&self, precision: usize) -> String {
        format!("{} {:.*}", self.integer, precision, self.float)
    }
}

pub struct Generator<R> {
    settings: GeneratorSettings,
    rng: R,
    last_emission: u64,
    emitted: u64,
}

impl<R: Rng> Generator<R> {
    pub fn new(settings: GeneratorSettings, rng: R) -> Self {
        Self {
            settings,
            rng,
            last_emission: 0,
            emitted: 0,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Samples written so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Wait for the transport, then write the header if configured
    ///
    /// Blocks indefinitely if the transport never reports ready.
    pub fn initialize<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), CaptureError> {
        if !transport.is_ready() {
            log::debug!("Waiting for transport to become ready");
            while !transport.is_ready() {
                std::thread::sleep(READY_POLL);
            }
        }

        if self.settings.emit_header {
            transport
                .write_line(HEADER_LINE)
                .map_err(CaptureError::Disconnected)?;
        }
        Ok(())
    }

    /// Draw a sample without emitting it
    pub fn sample(&mut self) -> Sample {
        Sample {
            integer: random_integer(&mut self.rng, self.settings.int_lower, self.settings.int_upper),
            float: random_float(&mut self.rng, self.settings.float_scale),
        }
    }

    /// Emit one sample if an interval has elapsed since the last emission
    pub fn tick<T: Transport + ?Sized>(
        &mut self,
        now: u64,
        transport: &mut T,
    ) -> Result<Option<Sample>, CaptureError> {
        if now.saturating_sub(self.last_emission) < self.settings.interval_ms {
            return Ok(None);
        }

        let sample = self.sample();
        transport
            .write_line(&sample.to_line(self.settings.float_precision))
            .map_err(CaptureError::Disconnected)?;

        self.last_emission = now;
        self.emitted += 1;
        log::trace!("Emitted {:?} at {} ms", sample, now);
        Ok(Some(sample))
    }

    /// Run the scheduling loop until `running` clears or `limit` samples are out
    pub fn run<T, C>(
        &mut self,
        transport: &mut T,
        clock: &C,
        running: &AtomicBool,
        limit: Option<u64>,
    ) -> Result<u64, CaptureError>
    where
        T: Transport + ?Sized,
        C: Clock,
    {
        let start = self.emitted;
        while running.load(Ordering::SeqCst) {
            if limit.is_some_and(|limit| self.emitted - start >= limit) {
                break;
            }
            self.tick(clock.now_ms(), transport)?;
            clock.idle();
        }
        Ok(self.emitted - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::{self, Write};

    fn generator(settings: GeneratorSettings) -> Generator<StdRng> {
        Generator::new(settings, StdRng::seed_from_u64(42))
    }

    /// Reports not ready a few times before accepting writes
    struct SlowStart {
        polls_left: usize,
        written: Vec<u8>,
    }

    impl Write for SlowStart {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for SlowStart {
        fn is_ready(&mut self) -> bool {
            if self.polls_left == 0 {
                return true;
            }
            self.polls_left -= 1;
            false
        }
    }

    struct Unplugged;

    impl Write for Unplugged {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for Unplugged {}

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_initialize_writes_header() {
        let mut sink = Vec::new();
        generator(GeneratorSettings::default())
            .initialize(&mut sink)
            .unwrap();
        assert_eq!(sink, b"Integers, Floats\r\n");
    }

    #[test]
    fn test_initialize_without_header() {
        let settings = GeneratorSettings {
            emit_header: false,
            ..Default::default()
        };
        let mut sink = Vec::new();
        generator(settings).initialize(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_initialize_waits_until_ready() {
        let mut transport = SlowStart {
            polls_left: 3,
            written: Vec::new(),
        };
        generator(GeneratorSettings::default())
            .initialize(&mut transport)
            .unwrap();
        assert_eq!(transport.polls_left, 0);
        assert_eq!(lines(&transport.written), vec![HEADER_LINE]);
    }

    #[test]
    fn test_tick_respects_interval() {
        let mut gen = generator(GeneratorSettings::default());
        let mut sink = Vec::new();

        assert!(gen.tick(0, &mut sink).unwrap().is_none());
        assert!(gen.tick(499, &mut sink).unwrap().is_none());
        assert!(gen.tick(500, &mut sink).unwrap().is_some());
        assert!(gen.tick(999, &mut sink).unwrap().is_none());
        assert!(gen.tick(1_000, &mut sink).unwrap().is_some());
        assert_eq!(gen.emitted(), 2);
        assert_eq!(lines(&sink).len(), 2);
    }

    #[test]
    fn test_emission_count_over_duration() {
        for (interval, step, duration) in [(500, 10, 10_000), (500, 7, 9_999), (250, 50, 3_000)] {
            let settings = GeneratorSettings {
                interval_ms: interval,
                ..Default::default()
            };
            let mut gen = generator(settings);
            let mut sink = Vec::new();

            let mut now = 0;
            while now <= duration {
                gen.tick(now, &mut sink).unwrap();
                now += step;
            }

            let expected = duration / interval;
            let emitted = gen.emitted();
            assert!(
                emitted + 1 >= expected && emitted <= expected + 1,
                "interval {interval} step {step}: emitted {emitted}, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_line_format() {
        let mut gen = generator(GeneratorSettings::default());
        let mut sink = Vec::new();
        let sample = gen.tick(500, &mut sink).unwrap().unwrap();

        let text = lines(&sink);
        assert_eq!(text[0], sample.to_line(DEFAULT_FLOAT_PRECISION));

        let fields: Vec<&str> = text[0].split(' ').collect();
        assert_eq!(fields.len(), 2);
        let integer: i64 = fields[0].parse().unwrap();
        let float: f64 = fields[1].parse().unwrap();
        assert!((0..100).contains(&integer));
        assert!(float > 0.0 && float < 1.0);
        assert_eq!(fields[1].split('.').nth(1).unwrap().len(), 4);
    }

    #[test]
    fn test_sample_to_line() {
        let sample = Sample {
            integer: 42,
            float: 0.378_21,
        };
        assert_eq!(sample.to_line(4), "42 0.3782");
        assert_eq!(sample.to_line(2), "42 0.38");
    }

    #[test]
    fn test_run_with_limit() {
        let mut gen = generator(GeneratorSettings::default());
        let clock = ManualClock::new(100);
        let running = AtomicBool::new(true);
        let mut sink = Vec::new();

        gen.initialize(&mut sink).unwrap();
        let emitted = gen.run(&mut sink, &clock, &running, Some(3)).unwrap();

        assert_eq!(emitted, 3);
        let text = lines(&sink);
        assert_eq!(text.len(), 4);
        assert_eq!(text[0], HEADER_LINE);
        assert!(clock.now_ms() >= 1_500);
    }

    #[test]
    fn test_run_stops_when_flag_clears() {
        let mut gen = generator(GeneratorSettings::default());
        let clock = ManualClock::new(100);
        let running = AtomicBool::new(false);
        let mut sink = Vec::new();

        assert_eq!(gen.run(&mut sink, &clock, &running, None).unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_write_failure_is_disconnect() {
        let mut gen = generator(GeneratorSettings::default());
        let err = gen.tick(500, &mut Unplugged).unwrap_err();
        assert!(matches!(err, CaptureError::Disconnected(_)));
        assert_eq!(gen.emitted(), 0);
    }

    #[test]
    fn test_generated_stream_collects() {
        use crate::collector::{Collector, CollectorSettings, SessionProgress};

        let mut gen = generator(GeneratorSettings::default());
        let clock = ManualClock::new(50);
        let running = AtomicBool::new(true);
        let mut sink = Vec::new();
        gen.initialize(&mut sink).unwrap();
        gen.run(&mut sink, &clock, &running, Some(5)).unwrap();

        let mut collector = Collector::new(io::Cursor::new(sink), CollectorSettings::default());
        let dataset = collector
            .read_session(5, &SessionProgress::hidden())
            .unwrap();

        assert_eq!(dataset.columns(), &["Integers".to_string(), "Floats".to_string()]);
        assert_eq!(dataset.len(), 5);
        for row in dataset.rows() {
            assert!(row.values.iter().all(|v| v.is_numeric()));
        }
    }
}
