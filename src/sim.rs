//! Scripted replay of `GET`/`PUT` commands against an engine.
//!
//! A script is one command per line:
//!
//! ```text
//! # warm up
//! PUT 1 100
//! PUT 2 200
//! GET 1
//! PUT 3 300
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Verbs are matched
//! case-insensitively; keys and values go through [`FromStr`].
//!
//! ## Example
//!
//! ```
//! use cachetrace::builder::{EngineBuilder, Policy};
//! use cachetrace::sim::{Simulator, parse_script};
//!
//! let ops = parse_script::<u32, u32>("PUT 1 1\nPUT 2 2\nGET 1\nPUT 3 3").unwrap();
//! let engine = EngineBuilder::new(2).build::<u32, u32>(Policy::Lru).unwrap();
//! let mut sim = Simulator::new(engine);
//! let steps = sim.run(ops);
//!
//! assert_eq!(steps[3].trace.evicted(), Some(&2));
//! assert_eq!(sim.stats().hits, 1);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use tracing::{debug, info};

use crate::event::Trace;
use crate::stats::TraceStats;
use crate::traits::CacheEngine;

/// One cache command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op<K, V> {
    Get(K),
    Put(K, V),
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Op<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Get(key) => write!(f, "GET {key}"),
            Op::Put(key, value) => write!(f, "PUT {key} {value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Empty,
    UnknownVerb,
    MissingKey,
    MissingValue,
    BadKey,
    BadValue,
    TrailingInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseErrorKind::Empty => "empty command",
            ParseErrorKind::UnknownVerb => "unknown verb (expected GET or PUT)",
            ParseErrorKind::MissingKey => "missing key",
            ParseErrorKind::MissingValue => "PUT needs a value",
            ParseErrorKind::BadKey => "key does not parse",
            ParseErrorKind::BadValue => "value does not parse",
            ParseErrorKind::TrailingInput => "unexpected trailing input",
        };
        f.write_str(msg)
    }
}

/// Error returned when a command line does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based script line, when parsing a whole script.
    pub line: Option<usize>,
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn new(kind: ParseErrorKind) -> Self {
        Self { line: None, kind }
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ParseError {}

impl<K: FromStr, V: FromStr> FromStr for Op<K, V> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().ok_or_else(|| ParseError::new(ParseErrorKind::Empty))?;
        let key = words
            .next()
            .ok_or_else(|| ParseError::new(ParseErrorKind::MissingKey))?;

        let op = if verb.eq_ignore_ascii_case("get") {
            let key = key
                .parse()
                .map_err(|_| ParseError::new(ParseErrorKind::BadKey))?;
            Op::Get(key)
        } else if verb.eq_ignore_ascii_case("put") {
            let key = key
                .parse()
                .map_err(|_| ParseError::new(ParseErrorKind::BadKey))?;
            let value = words
                .next()
                .ok_or_else(|| ParseError::new(ParseErrorKind::MissingValue))?
                .parse()
                .map_err(|_| ParseError::new(ParseErrorKind::BadValue))?;
            Op::Put(key, value)
        } else {
            return Err(ParseError::new(ParseErrorKind::UnknownVerb));
        };

        if words.next().is_some() {
            return Err(ParseError::new(ParseErrorKind::TrailingInput));
        }
        Ok(op)
    }
}

/// Parses a whole script, stopping at the first bad line.
pub fn parse_script<K: FromStr, V: FromStr>(script: &str) -> Result<Vec<Op<K, V>>, ParseError> {
    script
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(lineno, line)| line.parse().map_err(|err: ParseError| err.at_line(lineno)))
        .collect()
}

/// Outcome of one replayed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<K, V> {
    pub op: Op<K, V>,
    /// Value returned by a `GET`; always `None` for `PUT`.
    pub result: Option<V>,
    pub trace: Trace<K, V>,
}

/// Drives an engine with [`Op`]s and keeps running [`TraceStats`].
#[derive(Debug)]
pub struct Simulator<K, V, E> {
    engine: E,
    stats: TraceStats,
    _marker: PhantomData<(K, V)>,
}

impl<K, V, E> Simulator<K, V, E>
where
    K: Clone,
    V: Clone,
    E: CacheEngine<K, V>,
{
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            stats: TraceStats::default(),
            _marker: PhantomData,
        }
    }

    /// Applies one command.
    pub fn apply(&mut self, op: Op<K, V>) -> Step<K, V> {
        let (result, trace) = match &op {
            Op::Get(key) => self.engine.get(key),
            Op::Put(key, value) => (None, self.engine.put(key.clone(), value.clone())),
        };
        self.stats.record(&trace);
        debug!(
            policy = %self.engine.policy(),
            events = trace.len(),
            len = self.engine.len(),
            "applied op"
        );
        Step { op, result, trace }
    }

    /// Applies every command in order.
    pub fn run<I>(&mut self, ops: I) -> Vec<Step<K, V>>
    where
        I: IntoIterator<Item = Op<K, V>>,
    {
        let steps: Vec<_> = ops.into_iter().map(|op| self.apply(op)).collect();
        info!(
            policy = %self.engine.policy(),
            ops = steps.len(),
            hit_ratio = self.stats.hit_ratio(),
            "replay finished"
        );
        steps
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn stats(&self) -> &TraceStats {
        &self.stats
    }

    /// Empties the engine and zeroes the counters.
    pub fn reset(&mut self) {
        self.engine.clear();
        self.stats.reset();
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::policy::lfu::LfuEngine;
    use crate::policy::lru::LruEngine;

    mod parsing {
        use super::*;

        #[test]
        fn parses_both_verbs_any_case() {
            assert_eq!("GET 4".parse::<Op<u8, u8>>(), Ok(Op::Get(4)));
            assert_eq!("put 4 9".parse::<Op<u8, u8>>(), Ok(Op::Put(4, 9)));
            assert_eq!(
                "  Put   a   b ".parse::<Op<String, String>>(),
                Ok(Op::Put("a".to_string(), "b".to_string()))
            );
        }

        #[test]
        fn display_round_trips_through_parse() {
            let op: Op<u8, u8> = Op::Put(1, 2);
            assert_eq!(op.to_string(), "PUT 1 2");
            assert_eq!(op.to_string().parse::<Op<u8, u8>>(), Ok(op));
        }

        #[test]
        fn rejects_malformed_commands() {
            let kind = |s: &str| s.parse::<Op<u8, u8>>().unwrap_err().kind;
            assert_eq!(kind(""), ParseErrorKind::Empty);
            assert_eq!(kind("DEL 1"), ParseErrorKind::UnknownVerb);
            assert_eq!(kind("GET"), ParseErrorKind::MissingKey);
            assert_eq!(kind("PUT 1"), ParseErrorKind::MissingValue);
            assert_eq!(kind("GET x"), ParseErrorKind::BadKey);
            assert_eq!(kind("PUT 1 300"), ParseErrorKind::BadValue);
            assert_eq!(kind("GET 1 2"), ParseErrorKind::TrailingInput);
        }

        #[test]
        fn script_skips_comments_and_reports_lines() {
            let ops = parse_script::<u8, u8>("# header\n\nPUT 1 1\n  GET 1\n").unwrap();
            assert_eq!(ops, vec![Op::Put(1, 1), Op::Get(1)]);

            let err = parse_script::<u8, u8>("PUT 1 1\n\nGET\n").unwrap_err();
            assert_eq!(err.line, Some(3));
            assert_eq!(err.to_string(), "line 3: missing key");
        }
    }

    mod replay {
        use super::*;

        #[test]
        fn lru_replay_records_steps_and_stats() {
            let ops = parse_script::<u8, u8>("PUT 1 1\nPUT 2 2\nGET 1\nPUT 3 3\nGET 2").unwrap();
            let mut sim = Simulator::new(LruEngine::new(2).unwrap());
            let steps = sim.run(ops);

            assert_eq!(steps.len(), 5);
            assert_eq!(steps[2].result, Some(1));
            assert_eq!(steps[3].trace.evicted(), Some(&2));
            assert_eq!(steps[4].trace.kinds(), vec![EventKind::Miss]);

            let stats = sim.stats();
            assert_eq!(stats.calls, 5);
            assert_eq!(stats.hits, 1);
            assert_eq!(stats.misses, 1);
            assert_eq!(stats.evictions, 1);
        }

        #[test]
        fn lfu_replay_and_reset() {
            let ops = parse_script::<u8, u8>("PUT 1 1\nPUT 2 2\nGET 1\nPUT 3 3").unwrap();
            let mut sim = Simulator::new(LfuEngine::new(2).unwrap());
            let steps = sim.run(ops);
            assert_eq!(steps[3].trace.evicted(), Some(&2));
            assert_eq!(sim.engine().frequency(&1), Some(2));

            sim.reset();
            assert!(sim.engine().is_empty());
            assert_eq!(*sim.stats(), TraceStats::default());

            let step = sim.apply(Op::Get(1));
            assert_eq!(step.result, None);
            assert_eq!(sim.into_engine().len(), 0);
        }
    }
}
