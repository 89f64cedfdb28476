// SPDX-License-Identifier: AGPL-3.0-only

//! Diagnostic test runner
//!
//! Drives a fixed list of operand triples through a [`MacAccelerator`] and
//! reports each one as PASS or FAIL on a line-oriented sink. The sink is
//! best-effort: write or flush errors are logged and otherwise ignored, so
//! a broken console never changes a verdict.
//!
//! Sink transcript for one vector:
//!
//! ```text
//! Writing A=0x5
//! Writing B=0x3
//! Writing C=0x2
//! Starting MAC
//! Reading result
//! Result=0x11 (expected=0x11)
//! PASS
//! ```

use crate::accelerator::MacAccelerator;
use crate::backend::RegisterBlock;
use crate::error::Result;
use mac_chip::mac;
use std::fmt;
use std::io::Write;
use tracing::{debug, info, warn};

/// Operand triple for one MAC operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestVector {
    /// Multiplicand
    pub a: i32,
    /// Multiplier
    pub b: i32,
    /// Addend
    pub c: i32,
}

impl TestVector {
    /// Create a vector
    pub const fn new(a: i32, b: i32, c: i32) -> Self {
        Self { a, b, c }
    }

    /// Result a correct device produces
    pub const fn expected(&self) -> u32 {
        mac::expected(self.a, self.b, self.c)
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.a, self.b, self.c)
    }
}

/// The bring-up sequence: two small products and one signed case.
pub const DEFAULT_VECTORS: [TestVector; 3] = [
    TestVector::new(5, 3, 2),   // 0x11
    TestVector::new(7, 4, 1),   // 0x1d
    TestVector::new(-3, 6, 10), // -8 = 0xfffffff8
];

/// Classification of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Device result equals the reference bit for bit
    Pass,
    /// Anything else
    Fail,
}

impl Verdict {
    /// Compare a device result with the reference
    pub const fn classify(result: u32, expected: u32) -> Self {
        if result == expected {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// Outcome of one vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestOutcome {
    /// Operands driven
    pub vector: TestVector,
    /// Raw `RESULT` read back
    pub result: u32,
    /// Reference value
    pub expected: u32,
    /// PASS / FAIL
    pub verdict: Verdict,
}

/// Outcomes of a whole run, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    /// One entry per vector
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteSummary {
    /// Vectors that passed
    pub fn passed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.verdict == Verdict::Pass)
            .count()
    }

    /// Vectors that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// True when every vector passed
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs vectors through an accelerator, reporting on `sink`
#[derive(Debug)]
pub struct TestRunner<R, W> {
    accel: MacAccelerator<R>,
    sink: W,
}

impl<R: RegisterBlock, W: Write> TestRunner<R, W> {
    /// Create a runner
    pub const fn new(accel: MacAccelerator<R>, sink: W) -> Self {
        Self { accel, sink }
    }

    /// Borrow the accelerator
    pub const fn accelerator(&self) -> &MacAccelerator<R> {
        &self.accel
    }

    /// Borrow the sink
    pub const fn sink(&self) -> &W {
        &self.sink
    }

    /// Release accelerator and sink
    pub fn into_parts(self) -> (MacAccelerator<R>, W) {
        (self.accel, self.sink)
    }

    /// Emit one line and flush it.
    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.sink, "{line}") {
            warn!("Output sink write failed: {e}");
        }
        if let Err(e) = self.sink.flush() {
            warn!("Output sink flush failed: {e}");
        }
    }

    /// Drive one vector through the device and report it
    ///
    /// # Errors
    ///
    /// Returns [`crate::MacError::PollTimeout`] if the accelerator has a poll
    /// bound and the device does not complete within it.
    pub fn run_vector(&mut self, vector: TestVector) -> Result<TestOutcome> {
        let TestVector { a, b, c } = vector;

        self.emit(format_args!("Writing A=0x{:x}", mac::operand_bits(a)));
        self.accel.write_operand_a(a);

        self.emit(format_args!("Writing B=0x{:x}", mac::operand_bits(b)));
        self.accel.write_operand_b(b);

        self.emit(format_args!("Writing C=0x{:x}", mac::operand_bits(c)));
        self.accel.write_operand_c(c);

        self.emit(format_args!("Starting MAC"));
        self.accel.start();

        let polls = self.accel.wait_done()?;
        debug!("{vector}: DONE after {polls} polls");

        self.emit(format_args!("Reading result"));
        let result = self.accel.read_result();
        let expected = vector.expected();

        self.emit(format_args!("Result=0x{result:x} (expected=0x{expected:x})"));

        let verdict = Verdict::classify(result, expected);
        self.emit(format_args!("{verdict}"));

        Ok(TestOutcome {
            vector,
            result,
            expected,
            verdict,
        })
    }

    /// Run every vector in order, framed by the suite banner
    ///
    /// Verdicts never stop the run; only a poll timeout does.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::MacError::PollTimeout`] from [`Self::run_vector`].
    pub fn run_suite(&mut self, vectors: &[TestVector]) -> Result<SuiteSummary> {
        self.emit(format_args!("MAC Test Suite"));

        let mut summary = SuiteSummary::default();
        for &vector in vectors {
            let outcome = self.run_vector(vector)?;
            summary.outcomes.push(outcome);
        }

        self.emit(format_args!("Done"));
        self.emit(format_args!(
            "Summary: {} passed, {} failed",
            summary.passed(),
            summary.failed()
        ));

        info!(
            "MAC suite: {} passed, {} failed",
            summary.passed(),
            summary.failed()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Fault, SoftwareMac};

    fn runner(sim: SoftwareMac) -> TestRunner<SoftwareMac, Vec<u8>> {
        TestRunner::new(MacAccelerator::new(sim).with_max_polls(Some(1_000)), Vec::new())
    }

    fn transcript(runner: &TestRunner<SoftwareMac, Vec<u8>>) -> Vec<String> {
        String::from_utf8_lossy(runner.sink())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn default_vectors_expectations() {
        let expected: Vec<u32> = DEFAULT_VECTORS.iter().map(TestVector::expected).collect();
        assert_eq!(expected, [0x11, 0x1D, 0xFFFF_FFF8]);
    }

    #[test]
    fn vector_transcript() {
        let mut runner = runner(SoftwareMac::new().with_latency(2));
        let outcome = runner.run_vector(TestVector::new(5, 3, 2)).unwrap();
        assert_eq!(outcome.verdict, Verdict::Pass);
        assert_eq!(outcome.result, 17);
        assert_eq!(
            transcript(&runner),
            [
                "Writing A=0x5",
                "Writing B=0x3",
                "Writing C=0x2",
                "Starting MAC",
                "Reading result",
                "Result=0x11 (expected=0x11)",
                "PASS",
            ]
        );
    }

    #[test]
    fn negative_operands_print_as_unsigned_hex() {
        let mut runner = runner(SoftwareMac::new());
        runner.run_vector(TestVector::new(-3, 6, 10)).unwrap();
        let lines = transcript(&runner);
        assert_eq!(lines[0], "Writing A=0xfffffffd");
        assert_eq!(lines[5], "Result=0xfffffff8 (expected=0xfffffff8)");
        assert_eq!(lines[6], "PASS");
    }

    #[test]
    fn corrupted_result_fails_without_stopping_suite() {
        let sim = SoftwareMac::new().with_fault(Fault::CorruptResult { xor: 0x8000_0000 });
        let mut runner = runner(sim);
        let summary = runner.run_suite(&DEFAULT_VECTORS).unwrap();

        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(summary.failed(), 3);
        assert!(!summary.all_passed());
        assert_eq!(summary.outcomes[2].result, 0x7FFF_FFF8);

        let lines = transcript(&runner);
        assert_eq!(lines.iter().filter(|l| *l == "FAIL").count(), 3);
        assert_eq!(lines.last().unwrap(), "Summary: 0 passed, 3 failed");
    }

    #[test]
    fn suite_framing() {
        let mut runner = runner(SoftwareMac::new().with_latency(1));
        let summary = runner.run_suite(&DEFAULT_VECTORS).unwrap();
        assert!(summary.all_passed());
        assert_eq!(summary.passed(), 3);

        let lines = transcript(&runner);
        assert_eq!(lines.first().unwrap(), "MAC Test Suite");
        assert_eq!(lines.len(), 1 + 3 * 7 + 2);
        assert_eq!(lines[lines.len() - 2], "Done");
    }

    #[test]
    fn timeout_aborts_the_run() {
        let sim = SoftwareMac::new().with_fault(Fault::NeverComplete);
        let mut runner = runner(sim);
        assert!(runner.run_suite(&DEFAULT_VECTORS).is_err());

        let lines = transcript(&runner);
        assert_eq!(lines.last().unwrap(), "Starting MAC");
        assert!(!lines.iter().any(|l| l == "Reading result"));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn sink_errors_do_not_change_verdicts() {
        let accel = MacAccelerator::new(SoftwareMac::new());
        let mut runner = TestRunner::new(accel, BrokenSink);
        let summary = runner.run_suite(&DEFAULT_VECTORS).unwrap();
        assert!(summary.all_passed());
    }
}
