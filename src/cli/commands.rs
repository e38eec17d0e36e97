// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `submit`, `run` and `toc`
// and all their configurable flags.
//
// clap's derive macros generate --help text, error messages
// for missing args and type conversion (string → usize, f64).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::{submit_use_case::SubmitConfig, train_use_case::TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a baseline model on a competition's training split
    Train(TrainArgs),

    /// Write a submission CSV from a trained checkpoint
    Submit(SubmitArgs),

    /// Train, then write the submission with the fresh model
    Run(RunArgs),

    /// Extract a nested table of contents from a PDF's bookmarks
    Toc(TocArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Competition identifier (e.g. lish-moa, playground-series-s5e7)
    #[arg(long, default_value = "playground-series-s5e7")]
    pub competition: String,

    /// Directory holding the competition CSV files
    /// (or a `dataset/` subdirectory with them)
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory to save checkpoints, encoders and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Hidden layer widths, comma separated (e.g. 256,128)
    #[arg(long, value_delimiter = ',', default_value = "128,64")]
    pub hidden_dims: Vec<usize>,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training rows
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Dropout probability after each hidden layer
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// Share of training rows held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Seed for the split, the shuffle and weight init
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            competition:    a.competition,
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            hidden_dims:    a.hidden_dims,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            dropout:        a.dropout,
            val_fraction:   a.val_fraction,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `submit` command
#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Directory holding the competition CSV files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory where `train` saved its checkpoints
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Submission file to write
    #[arg(long, default_value = "submission.csv")]
    pub output: PathBuf,
}

impl From<SubmitArgs> for SubmitConfig {
    fn from(a: SubmitArgs) -> Self {
        SubmitConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            output:         a.output,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Submission file to write
    #[arg(long, default_value = "submission.csv")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    /// PDF whose bookmarks describe the chapters
    #[arg(long)]
    pub pdf: PathBuf,

    #[arg(long, default_value = "toc.json")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use clap::Parser;

    use super::*;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["kaggle-lab", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(TrainConfig::from(args), TrainConfig::default());
    }

    #[test]
    fn test_hidden_dims_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "kaggle-lab", "run", "--competition", "lish-moa", "--hidden-dims", "256,32", "--output", "out.csv",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(args.train.hidden_dims, vec![256, 32]);
        assert_eq!(args.train.competition, "lish-moa");
        assert_eq!(args.output, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_toc_requires_pdf() {
        assert!(Cli::try_parse_from(["kaggle-lab", "toc"]).is_err());
    }
}
