//! Feeding keys through a cache and rendering the results.
//!
//! A run reads keys from a key source ([`SampledKeys`] or [`LineKeys`]), resolves
//! each one with a [`Resolver`] and writes `Number,Steps` records with a
//! [`RecordWriter`].
//!
//! # Example
//!
//! ```rust
//! use collatz_arc::driver::{run, LineKeys, Policy, RecordWriter};
//!
//! let input = "6\n6\n27\n6\n";
//! let mut resolver = Policy::Arc.resolver(4);
//! let mut out = RecordWriter::new(Vec::new());
//!
//! let summary = run(LineKeys::new(input.as_bytes()), resolver.as_mut(), &mut out).unwrap();
//! assert_eq!(summary.records, 4);
//!
//! let text = String::from_utf8(out.finish().unwrap()).unwrap();
//! assert_eq!(text, "Number,Steps\n6,8\n6,8\n27,111\n6,8\n");
//! ```
//!
//! [`SampledKeys`]: struct.SampledKeys.html
//! [`LineKeys`]: struct.LineKeys.html
//! [`Resolver`]: trait.Resolver.html
//! [`RecordWriter`]: struct.RecordWriter.html
use crate::collatz::{Collatz, StepCounter};
use crate::AdaptiveCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::boxed::Box;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::string::{String, ToString};

/// `DriverError` is the error of a run.
#[derive(Debug)]
pub enum DriverError {
    /// The number of keys to sample must be positive
    InvalidCount(u64),
    /// The sampling range must be positive and ordered
    InvalidRange {
        /// lower bound, inclusive
        min: u64,
        /// upper bound, inclusive
        max: u64,
    },
    /// A line of the key source is not a positive integer
    InvalidKey {
        /// 1-based line number
        line: usize,
        /// the offending text, trimmed
        text: String,
    },
    /// A sampling argument is not a number
    InvalidNumber {
        /// which argument, e.g. `"COUNT"`
        name: &'static str,
        /// the offending text
        text: String,
    },
    /// The key has no step count, its trajectory overflows a `u64`
    Overflow {
        /// the offending key
        key: u64,
    },
    /// Unknown resolution policy name
    UnknownPolicy(String),
    /// Reading keys or writing records failed
    Io(io::Error),
}

impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::InvalidCount(n) => {
                write!(f, "invalid number of keys {}, which should be positive", *n)
            }
            DriverError::InvalidRange { min, max } => write!(
                f,
                "invalid range [{}, {}], bounds should be positive and min <= max",
                *min, *max
            ),
            DriverError::InvalidKey { line, text } => {
                write!(f, "invalid key {:?} on line {}", text, *line)
            }
            DriverError::InvalidNumber { name, text } => {
                write!(f, "invalid {} {:?}, which should be an unsigned integer", name, text)
            }
            DriverError::Overflow { key } => {
                write!(f, "collatz trajectory of {} overflows u64", *key)
            }
            DriverError::UnknownPolicy(name) => {
                write!(f, "unknown cache policy {:?}, expected \"none\" or \"arc\"", name)
            }
            DriverError::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DriverError {
    fn from(e: io::Error) -> Self {
        DriverError::Io(e)
    }
}

/// `SampledKeys` yields `count` keys drawn uniformly from `[min, max]`.
pub struct SampledKeys {
    remaining: u64,
    min: u64,
    max: u64,
    rng: StdRng,
}

impl SampledKeys {
    /// Creates a source of `count` random keys in `[min, max]`, seeded from the OS.
    ///
    /// Returns an error if `count` is `0`, if either bound is `0`, or if `min > max`.
    pub fn new(count: u64, min: u64, max: u64) -> Result<Self, DriverError> {
        if count == 0 {
            return Err(DriverError::InvalidCount(count));
        }
        if min == 0 || max == 0 || min > max {
            return Err(DriverError::InvalidRange { min, max });
        }

        Ok(Self {
            remaining: count,
            min,
            max,
            rng: StdRng::from_entropy(),
        })
    }

    /// Like [`new`], but parses `count`, `min` and `max` from text first.
    ///
    /// Returns [`DriverError::InvalidNumber`] if one of them is not an unsigned integer.
    ///
    /// [`new`]: struct.SampledKeys.html#method.new
    /// [`DriverError::InvalidNumber`]: enum.DriverError.html#variant.InvalidNumber
    pub fn parse(count: &str, min: &str, max: &str) -> Result<Self, DriverError> {
        fn number(name: &'static str, text: &str) -> Result<u64, DriverError> {
            text.trim().parse().map_err(|_| DriverError::InvalidNumber {
                name,
                text: text.to_string(),
            })
        }

        Self::new(number("COUNT", count)?, number("MIN", min)?, number("MAX", max)?)
    }

    /// Replaces the random generator with one seeded by `seed`, for reproducible runs.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..self
        }
    }
}

impl Iterator for SampledKeys {
    type Item = Result<u64, DriverError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(Ok(self.rng.gen_range(self.min..=self.max)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = usize::try_from(self.remaining).ok();
        (upper.unwrap_or(usize::MAX), upper)
    }
}

/// `LineKeys` yields one key per line of a text source.
///
/// Surrounding whitespace is trimmed and blank lines are skipped. Anything else
/// which is not a positive integer is an error.
pub struct LineKeys<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> LineKeys<R> {
    /// Creates a key source reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for LineKeys<R> {
    type Item = Result<u64, DriverError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            return Some(match text.parse::<u64>() {
                Ok(key) if key > 0 => Ok(key),
                _ => Err(DriverError::InvalidKey {
                    line: self.line,
                    text: text.to_string(),
                }),
            });
        }
    }
}

/// `Resolver` turns a key into its step count.
pub trait Resolver {
    /// Returns the step count of `key`, or [`DriverError::Overflow`] if it has none.
    ///
    /// [`DriverError::Overflow`]: enum.DriverError.html#variant.Overflow
    fn resolve(&mut self, key: u64) -> Result<u64, DriverError>;
}

impl<C: StepCounter> Resolver for AdaptiveCache<C> {
    fn resolve(&mut self, key: u64) -> Result<u64, DriverError> {
        self.try_lookup(key).ok_or(DriverError::Overflow { key })
    }
}

/// `Uncached` computes every key from scratch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Uncached<C = Collatz> {
    counter: C,
}

impl<C: StepCounter> Uncached<C> {
    /// Creates a resolver which calls `counter` for every key.
    pub fn new(counter: C) -> Self {
        Self { counter }
    }
}

impl<C: StepCounter> Resolver for Uncached<C> {
    fn resolve(&mut self, key: u64) -> Result<u64, DriverError> {
        self.counter
            .checked_steps(key)
            .ok_or(DriverError::Overflow { key })
    }
}

/// `Policy` selects how keys are resolved during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// No caching, every key is computed
    None,
    /// Keys go through an [`AdaptiveCache`]
    ///
    /// [`AdaptiveCache`]: ../struct.AdaptiveCache.html
    Arc,
}

impl Default for Policy {
    fn default() -> Self {
        Policy::None
    }
}

impl Policy {
    /// Builds the resolver for this policy. `cache_size` is ignored by [`Policy::None`].
    ///
    /// [`Policy::None`]: enum.Policy.html#variant.None
    pub fn resolver(self, cache_size: usize) -> Box<dyn Resolver> {
        match self {
            Policy::None => Box::new(Uncached::<Collatz>::default()),
            Policy::Arc => Box::new(AdaptiveCache::new(cache_size)),
        }
    }
}

impl FromStr for Policy {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Policy::None),
            "arc" => Ok(Policy::Arc),
            _ => Err(DriverError::UnknownPolicy(s.to_string())),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::None => write!(f, "none"),
            Policy::Arc => write!(f, "arc"),
        }
    }
}

/// `RecordWriter` renders `(key, steps)` records as two column CSV with a
/// `Number,Steps` header.
pub struct RecordWriter<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> RecordWriter<W> {
    /// Creates a record writer on top of `writer`. Nothing is written until the
    /// first record, or until [`finish`] for an empty run.
    ///
    /// [`finish`]: struct.RecordWriter.html#method.finish
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    /// Writes one record, preceded by the header if it is the first one.
    pub fn write_record(&mut self, key: u64, steps: u64) -> io::Result<()> {
        self.write_header()?;
        writeln!(self.writer, "{},{}", key, steps)
    }

    /// Writes the header if no record was written, flushes and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_header()?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            self.header_written = true;
            writeln!(self.writer, "Number,Steps")?;
        }
        Ok(())
    }
}

/// Summary of a successful [`run`].
///
/// [`run`]: fn.run.html
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of records written
    pub records: u64,
}

/// Resolves every key of `keys`, in order, and writes one record per key.
///
/// Stops at the first error of the key source, the resolver or the writer.
pub fn run<I, R, W>(
    keys: I,
    resolver: &mut R,
    writer: &mut RecordWriter<W>,
) -> Result<RunSummary, DriverError>
where
    I: IntoIterator<Item = Result<u64, DriverError>>,
    R: Resolver + ?Sized,
    W: Write,
{
    let mut summary = RunSummary::default();
    for key in keys {
        let key = key?;
        let steps = resolver.resolve(key)?;
        writer.write_record(key, steps)?;
        summary.records += 1;
    }
    tracing::debug!(records = summary.records, "run finished");
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::{BufReader, Read};
    use std::vec;
    use std::vec::Vec;

    fn collect_keys<I: Iterator<Item = Result<u64, DriverError>>>(keys: I) -> Vec<u64> {
        keys.map(|k| k.unwrap()).collect()
    }

    fn render<R: Resolver + ?Sized>(input: &str, resolver: &mut R) -> String {
        let mut out = RecordWriter::new(Vec::new());
        run(LineKeys::new(input.as_bytes()), resolver, &mut out).unwrap();
        String::from_utf8(out.finish().unwrap()).unwrap()
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn test_sampled_keys_in_range() {
        let keys = collect_keys(SampledKeys::new(1_000, 10, 20).unwrap());
        assert_eq!(keys.len(), 1_000);
        assert!(keys.iter().all(|k| (10..=20).contains(k)));
    }

    #[test]
    fn test_sampled_keys_single_value_range() {
        let keys = collect_keys(SampledKeys::new(5, 7, 7).unwrap());
        assert_eq!(keys, vec![7; 5]);
    }

    #[test]
    fn test_sampled_keys_seeded_is_reproducible() {
        let a = collect_keys(SampledKeys::new(100, 1, 1_000).unwrap().with_seed(42));
        let b = collect_keys(SampledKeys::new(100, 1, 1_000).unwrap().with_seed(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sampled_keys_size_hint() {
        let mut keys = SampledKeys::new(3, 1, 2).unwrap();
        assert_eq!(keys.size_hint(), (3, Some(3)));
        keys.next();
        assert_eq!(keys.size_hint(), (2, Some(2)));
    }

    #[test]
    fn test_sampled_keys_size_hint_huge_count() {
        let keys = SampledKeys::new(u64::MAX, 1, 2).unwrap();
        let (lower, upper) = keys.size_hint();
        assert_eq!(lower, usize::MAX);
        assert_eq!(upper, usize::try_from(u64::MAX).ok());
    }

    #[test]
    fn test_sampled_keys_parse() {
        let keys = collect_keys(SampledKeys::parse("4", " 7", "7 ").unwrap());
        assert_eq!(keys, vec![7; 4]);

        match SampledKeys::parse("10", "x", "20") {
            Err(DriverError::InvalidNumber { name, text }) => {
                assert_eq!(name, "MIN");
                assert_eq!(text, "x");
            }
            _ => panic!("expected an invalid number error"),
        }
        assert!(matches!(
            SampledKeys::parse("-1", "1", "2"),
            Err(DriverError::InvalidNumber { name: "COUNT", .. })
        ));
        assert!(matches!(
            SampledKeys::parse("0", "1", "2"),
            Err(DriverError::InvalidCount(0))
        ));
    }

    #[test]
    fn test_sampled_keys_invalid() {
        assert!(matches!(
            SampledKeys::new(0, 1, 2),
            Err(DriverError::InvalidCount(0))
        ));
        assert!(matches!(
            SampledKeys::new(1, 0, 2),
            Err(DriverError::InvalidRange { min: 0, max: 2 })
        ));
        assert!(matches!(
            SampledKeys::new(1, 1, 0),
            Err(DriverError::InvalidRange { .. })
        ));
        assert!(matches!(
            SampledKeys::new(1, 5, 4),
            Err(DriverError::InvalidRange { min: 5, max: 4 })
        ));
    }

    #[test]
    fn test_line_keys() {
        let input = "  6\n\n27\r\n 1 \n";
        assert_eq!(collect_keys(LineKeys::new(input.as_bytes())), vec![6, 27, 1]);
    }

    #[test]
    fn test_line_keys_invalid_line() {
        let input = "6\n\nabc\n27\n";
        let mut keys = LineKeys::new(input.as_bytes());
        assert_eq!(keys.next().unwrap().unwrap(), 6);
        match keys.next() {
            Some(Err(DriverError::InvalidKey { line, text })) => {
                assert_eq!(line, 3);
                assert_eq!(text, "abc");
            }
            _ => panic!("expected an invalid key error"),
        }
        // the source can keep going past a bad line
        assert_eq!(keys.next().unwrap().unwrap(), 27);
        assert!(keys.next().is_none());
    }

    #[test]
    fn test_line_keys_rejects_zero_and_negative() {
        let mut keys = LineKeys::new("0\n-4\n".as_bytes());
        assert!(matches!(
            keys.next(),
            Some(Err(DriverError::InvalidKey { line: 1, .. }))
        ));
        assert!(matches!(
            keys.next(),
            Some(Err(DriverError::InvalidKey { line: 2, .. }))
        ));
    }

    #[test]
    fn test_line_keys_io_error() {
        let mut keys = LineKeys::new(BufReader::new(FailingReader));
        assert!(matches!(keys.next(), Some(Err(DriverError::Io(_)))));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("none".parse::<Policy>().unwrap(), Policy::None);
        assert_eq!("ARC".parse::<Policy>().unwrap(), Policy::Arc);
        assert!(matches!(
            "lru".parse::<Policy>(),
            Err(DriverError::UnknownPolicy(ref name)) if name == "lru"
        ));
        assert_eq!(Policy::default(), Policy::None);
        assert_eq!(Policy::Arc.to_string(), "arc");
    }

    #[test]
    fn test_run_policies_agree() {
        let input = "6\n6\n27\n6\n1\n97\n27\n";
        let expected = "Number,Steps\n6,8\n6,8\n27,111\n6,8\n1,0\n97,118\n27,111\n";

        assert_eq!(render(input, Policy::None.resolver(0).as_mut()), expected);
        assert_eq!(render(input, Policy::Arc.resolver(4).as_mut()), expected);
        assert_eq!(render(input, Policy::Arc.resolver(0).as_mut()), expected);
    }

    #[test]
    fn test_run_through_cache_hits() {
        let mut cache = AdaptiveCache::new(4);
        render("6\n6\n27\n6\n", &mut cache);
        assert_eq!(cache.stats().misses(), 2);
        assert_eq!(cache.stats().hits(), 2);
    }

    #[test]
    fn test_run_stops_on_bad_key() {
        let mut out = RecordWriter::new(Vec::new());
        let mut resolver = Uncached::new(Collatz);
        let rst = run(LineKeys::new("6\nx\n27\n".as_bytes()), &mut resolver, &mut out);
        assert!(matches!(rst, Err(DriverError::InvalidKey { line: 2, .. })));

        let text = String::from_utf8(out.finish().unwrap()).unwrap();
        assert_eq!(text, "Number,Steps\n6,8\n");
    }

    #[test]
    fn test_run_rejects_overflowing_key() {
        let input = "6\n18446744073709551615\n27\n";
        for mut resolver in vec![Policy::None.resolver(0), Policy::Arc.resolver(4)] {
            let mut out = RecordWriter::new(Vec::new());
            let rst = run(LineKeys::new(input.as_bytes()), resolver.as_mut(), &mut out);
            assert!(matches!(
                rst,
                Err(DriverError::Overflow {
                    key: 18446744073709551615
                })
            ));

            let text = String::from_utf8(out.finish().unwrap()).unwrap();
            assert_eq!(text, "Number,Steps\n6,8\n");
        }
    }

    #[test]
    fn test_run_sampled_overflowing_key() {
        let mut out = RecordWriter::new(Vec::new());
        let keys = SampledKeys::new(3, u64::MAX, u64::MAX).unwrap();
        let mut cache = AdaptiveCache::new(4);
        let rst = run(keys, &mut cache, &mut out);
        assert!(matches!(rst, Err(DriverError::Overflow { key: u64::MAX })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_run_sampled() {
        let mut out = RecordWriter::new(Vec::new());
        let keys = SampledKeys::new(50, 1, 100).unwrap().with_seed(7);
        let summary = run(keys, &mut AdaptiveCache::new(16), &mut out).unwrap();
        assert_eq!(summary.records, 50);

        let text = String::from_utf8(out.finish().unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Number,Steps"));
        lines.for_each(|line| {
            let mut cols = line.split(',');
            let key: u64 = cols.next().unwrap().parse().unwrap();
            let steps: u64 = cols.next().unwrap().parse().unwrap();
            assert_eq!(steps, crate::collatz::steps(key));
        });
    }

    #[test]
    fn test_record_writer_empty_run_has_header() {
        let out = RecordWriter::new(Vec::new());
        assert_eq!(out.finish().unwrap(), b"Number,Steps\n".to_vec());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DriverError::InvalidRange { min: 5, max: 4 }.to_string(),
            "invalid range [5, 4], bounds should be positive and min <= max"
        );
        assert_eq!(
            DriverError::InvalidKey {
                line: 3,
                text: "abc".to_string()
            }
            .to_string(),
            "invalid key \"abc\" on line 3"
        );
        assert_eq!(
            DriverError::Overflow { key: u64::MAX }.to_string(),
            "collatz trajectory of 18446744073709551615 overflows u64"
        );
    }
}
