//! Interactive query loop.
//!
//! Results go to `out`, timing and counts to `status`, so stdout can be
//! piped while stderr carries everything else.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::runner::{QueryReport, QueryRunner};

/// Typing this (any case) ends the session.
pub const EXIT_WORD: &str = "exit";

pub const PROMPT: &str = "Enter your search term";

/// Where search terms come from.
pub trait QueryInput {
    /// Next raw search term, or `None` at end of input.
    fn next_query(&mut self) -> io::Result<Option<String>>;
}

/// Reads one search term per line.
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> QueryInput for LineInput<R> {
    fn next_query(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    }
}

/// Run queries until `exit` or end of input. Returns how many ran.
///
/// An empty term is still run; with the substring strategy it matches every
/// profile that has text.
pub async fn run_session<I, W, E>(
    runner: &QueryRunner,
    input: &mut I,
    out: &mut W,
    status: &mut E,
) -> io::Result<usize>
where
    I: QueryInput + ?Sized,
    W: Write,
    E: Write,
{
    let mut ran = 0;

    while let Some(raw) = input.next_query()? {
        let query = raw.trim();
        if query.eq_ignore_ascii_case(EXIT_WORD) {
            debug!("Exit requested");
            break;
        }

        let report = runner.run(query).await;
        write_report(&report, out, status)?;
        ran += 1;
    }

    Ok(ran)
}

/// Print matches to `out` and the timing line to `status`.
pub fn write_report<W: Write, E: Write>(
    report: &QueryReport,
    out: &mut W,
    status: &mut E,
) -> io::Result<()> {
    writeln!(out, "Found {} matching lawyers:", report.matches.len())?;
    for url in &report.matches {
        writeln!(out, "{}", url)?;
    }
    out.flush()?;

    writeln!(
        status,
        "Query completed in {:.2} seconds ({} scanned, {} skipped, {} failed)",
        report.elapsed.as_secs_f64(),
        report.scanned(),
        report.skipped(),
        report.failed()
    )
}
