//! `lmatch match`, `lmatch validate` and `lmatch score`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;

use labelmatch_recon::{
    compute_summary, run, similarity, MatchConfig, MatchResult, NoChannel, Normalization,
    Strategy, StripChars,
};

use crate::exit_codes::EXIT_UNMATCHED;
use crate::labels::load_labels;
use crate::output::{summary_line, write_human, MatchReport, ReportMeta};
use crate::prompt::ConsoleChannel;
use crate::util::terminal_width;
use crate::CliError;

#[derive(Args)]
pub struct MatchArgs {
    /// Labels to match (.json, .csv header row, or one label per line)
    pub left: PathBuf,

    /// Labels to match to
    pub right: PathBuf,

    /// TOML config file; flags below override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// per_entry_greedy, global_greedy, interactive, interactive_manual_selection
    #[arg(long, short = 's')]
    pub strategy: Option<Strategy>,

    /// Pairs must score strictly above this (0-1)
    #[arg(long)]
    pub floor: Option<f64>,

    /// Score distance that lets interactive strategies skip the question (0-1)
    #[arg(long)]
    pub min_auto_distance: Option<f64>,

    /// Compare labels case-insensitively
    #[arg(long)]
    pub lower_case: bool,

    /// Characters to strip before comparing: none, default, or a literal set
    #[arg(long, value_name = "CHARS")]
    pub strip: Option<String>,

    /// Print matches taken without asking (interactive strategies)
    #[arg(long)]
    pub show_auto: bool,

    /// Output JSON to stdout instead of the human listing
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Exit 1 when any label stays unmatched
    #[arg(long)]
    pub strict: bool,
}

fn load_config(path: &Path) -> Result<MatchConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    MatchConfig::from_toml(&config_str).map_err(CliError::recon)
}

/// Flags win over config file values.
fn apply_overrides(config: &mut MatchConfig, args: &MatchArgs) {
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(floor) = args.floor {
        config.thresholds.similarity_floor = floor;
    }
    if let Some(distance) = args.min_auto_distance {
        config.thresholds.min_auto_distance = distance;
    }
    if args.lower_case || args.strip.is_some() {
        let mut normalization = config.normalization.clone().unwrap_or(Normalization {
            lower_case: false,
            strip: StripChars::None,
        });
        if args.lower_case {
            normalization.lower_case = true;
        }
        if let Some(ref strip) = args.strip {
            normalization.strip = StripChars::parse(strip);
        }
        config.normalization = Some(normalization);
    }
    if args.show_auto {
        config.output.report_auto_matches = true;
    }
}

pub fn cmd_match(args: MatchArgs) -> Result<(), CliError> {
    let mut config = match args.config {
        Some(ref path) => load_config(path)?,
        None => MatchConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate().map_err(CliError::recon)?;

    let left = load_labels(&args.left)?;
    let right = load_labels(&args.right)?;
    tracing::debug!(
        left = left.len(),
        right = right.len(),
        strategy = %config.strategy,
        "labels loaded"
    );

    let result = match_labels(&config, &left, &right)?;
    let summary = compute_summary(&result, &right);
    let report = MatchReport::new(ReportMeta::new(&config), &result, &summary);

    // --output wins; a config path is relative to the config file
    let json_path = args.output.clone().or_else(|| {
        config.output.json.as_ref().map(|p| {
            let base = args
                .config
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or_else(|| Path::new("."));
            base.join(p)
        })
    });

    if args.json || json_path.is_some() {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = json_path {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    if !args.json {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_human(&mut handle, &result).map_err(|e| CliError::io(e.to_string()))?;
        handle.flush().map_err(|e| CliError::io(e.to_string()))?;
    }

    eprintln!("{}", summary_line(&summary));

    if args.strict && !result.unmatched.is_empty() {
        return Err(CliError {
            code: EXIT_UNMATCHED,
            message: format!("{} labels left unmatched", result.unmatched.len()),
            hint: None,
        });
    }

    Ok(())
}

fn match_labels(
    config: &MatchConfig,
    left: &[String],
    right: &[String],
) -> Result<MatchResult, CliError> {
    if config.strategy.is_interactive() {
        let stdin = io::stdin();
        let mut channel = ConsoleChannel::new(
            stdin.lock(),
            io::stderr(),
            terminal_width(),
            config.output.report_auto_matches,
        );
        run(config, left, right, &mut channel).map_err(CliError::recon)
    } else {
        run(config, left, right, &mut NoChannel).map_err(CliError::recon)
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let normalization = match config.normalization {
        Some(ref n) => format!("lower_case={}, strip={:?}", n.lower_case, n.strip),
        None => "none".into(),
    };
    eprintln!(
        "{}: ok ({}, floor {}, min auto distance {}, normalization {})",
        config.name,
        config.strategy,
        config.thresholds.similarity_floor,
        config.thresholds.min_auto_distance,
        normalization
    );
    Ok(())
}

pub fn cmd_score(a: String, b: String, json: bool) -> Result<(), CliError> {
    let score = similarity(&a, &b);
    if json {
        let value = serde_json::json!({ "a": a, "b": b, "score": score });
        println!("{value}");
    } else {
        println!("{score:.4}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_IO, EXIT_PARSE};

    fn args(extra: impl FnOnce(&mut MatchArgs)) -> MatchArgs {
        let mut a = MatchArgs {
            left: "l.txt".into(),
            right: "r.txt".into(),
            config: None,
            strategy: None,
            floor: None,
            min_auto_distance: None,
            lower_case: false,
            strip: None,
            show_auto: false,
            json: false,
            output: None,
            strict: false,
        };
        extra(&mut a);
        a
    }

    #[test]
    fn flags_override_config() {
        let mut config = MatchConfig::default();
        apply_overrides(
            &mut config,
            &args(|a| {
                a.strategy = Some(Strategy::GlobalGreedy);
                a.floor = Some(0.75);
                a.show_auto = true;
            }),
        );
        assert_eq!(config.strategy, Strategy::GlobalGreedy);
        assert_eq!(config.thresholds.similarity_floor, 0.75);
        assert_eq!(config.thresholds.min_auto_distance, 0.1);
        assert!(config.output.report_auto_matches);
        assert!(config.normalization.is_none());
    }

    #[test]
    fn lower_case_flag_alone_keeps_labels_unstripped() {
        let mut config = MatchConfig::default();
        apply_overrides(&mut config, &args(|a| a.lower_case = true));
        let n = config.normalization.unwrap();
        assert!(n.lower_case);
        assert_eq!(n.strip, StripChars::None);
    }

    #[test]
    fn strip_flag_extends_config_normalization() {
        let mut config = MatchConfig {
            normalization: Some(Normalization::default()),
            ..MatchConfig::default()
        };
        apply_overrides(&mut config, &args(|a| a.strip = Some("none".into())));
        let n = config.normalization.unwrap();
        assert!(n.lower_case);
        assert_eq!(n.strip, StripChars::None);
    }

    #[test]
    fn unreadable_config_is_io_error() {
        let err = load_config(Path::new("/nonexistent/lmatch.toml")).unwrap_err();
        assert_eq!(err.code, EXIT_IO);
    }

    #[test]
    fn malformed_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "name = ").unwrap();
        let err = load_config(&path).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
    }
}
