//! Console reviewer for the interactive strategies.
//!
//! Candidates are printed as a ranked table; the answer is one line of input.
//! Prompts go to the output stream (stderr in the binary) so stdout stays
//! clean for `--json`.

use std::io::{BufRead, Write};

use labelmatch_recon::channel::{ChannelError, Confirmation, Decision, DisambiguationChannel};
use labelmatch_recon::model::{CandidateSet, MatchValue, RankedCandidate};

use crate::util::{pad_right, percent, truncate_display};

const RANK_WIDTH: usize = 5;
const SCORE_WIDTH: usize = 8;

pub struct ConsoleChannel<R, W> {
    input: R,
    output: W,
    width: usize,
    show_auto: bool,
}

impl<R: BufRead, W: Write> ConsoleChannel<R, W> {
    pub fn new(input: R, output: W, width: usize, show_auto: bool) -> Self {
        Self {
            input,
            output,
            width,
            show_auto,
        }
    }

    fn read_answer(&mut self) -> Result<String, ChannelError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ChannelError::Closed);
        }
        Ok(line.trim().to_string())
    }

    fn target_width(&self) -> usize {
        self.width.saturating_sub(RANK_WIDTH + SCORE_WIDTH + 2).max(8)
    }
}

/// Interprets one answer to the candidate table.
pub fn parse_decision(answer: &str) -> Decision {
    match answer.trim() {
        "" => Decision::Default,
        "n" | "N" | "none" => Decision::Skip,
        "break" => Decision::Abandon,
        other => match other.parse::<usize>() {
            Ok(n) => Decision::Index(n),
            Err(_) => Decision::Unrecognized(other.to_string()),
        },
    }
}

/// Interprets one answer to a single-candidate question.
pub fn parse_confirmation(answer: &str) -> Confirmation {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Accept,
        "break" => Confirmation::Abandon,
        _ => Confirmation::Reject,
    }
}

impl<R: BufRead, W: Write> DisambiguationChannel for ConsoleChannel<R, W> {
    fn present(&mut self, source: &str, candidates: &CandidateSet) -> Result<Decision, ChannelError> {
        let target_width = self.target_width();
        writeln!(
            self.output,
            "\n{} ({} candidates)",
            truncate_display(&format!("{source:?}"), self.width),
            candidates.len()
        )?;
        writeln!(
            self.output,
            "{}{}{}",
            pad_right("  #", RANK_WIDTH),
            pad_right("score", SCORE_WIDTH),
            "target"
        )?;
        for (rank, candidate) in candidates.ranked().iter().enumerate() {
            writeln!(
                self.output,
                "{}{}{}",
                pad_right(&format!("{rank:>3}"), RANK_WIDTH),
                pad_right(&percent(candidate.score), SCORE_WIDTH),
                truncate_display(&candidate.target, target_width)
            )?;
        }
        write!(
            self.output,
            "enter = top match, number = that candidate, n = none, break = stop: "
        )?;

        let answer = self.read_answer()?;
        Ok(parse_decision(&answer))
    }

    fn confirm(
        &mut self,
        source: &str,
        _rank: usize,
        candidate: &RankedCandidate,
    ) -> Result<Confirmation, ChannelError> {
        write!(
            self.output,
            "match {:?} to {:?} ({})? [y/N/break]: ",
            source,
            truncate_display(&candidate.target, self.target_width()),
            percent(candidate.score)
        )?;
        let answer = self.read_answer()?;
        Ok(parse_confirmation(&answer))
    }

    fn auto_matched(&mut self, source: &str, value: &MatchValue) {
        if !self.show_auto {
            return;
        }
        if let Err(e) = writeln!(self.output, "auto: {source} -> {value}") {
            tracing::debug!(source, error = %e, "auto match notice not written");
        }
    }
}
