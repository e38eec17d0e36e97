// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application); this layer
// only routes and prints the results.
//
//   1. `train`  — fit a baseline model, save checkpoints
//   2. `submit` — checkpoint → submission.csv
//   3. `run`    — train + submit in one go
//   4. `toc`    — PDF bookmarks → toc.json
//
// Reference: Rust Book §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, RunArgs, SubmitArgs, TocArgs, TrainArgs};

use crate::ml::scoring::Score;

#[derive(Parser, Debug)]
#[command(
    name = "kaggle-lab",
    version,
    about = "Load a Kaggle competition dataset, train a baseline model and write the submission."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)  => run_train(args),
            Commands::Submit(args) => run_submit(args),
            Commands::Run(args)    => run_all(args),
            Commands::Toc(args)    => run_toc(args),
        }
    }
}

fn print_score(score: Option<Score>) {
    if let Some(s) = score {
        println!("Final validation {}: {:.5}", s.metric, s.value);
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training for '{}' from '{}'", args.competition, args.data_dir);
    let use_case = TrainUseCase::new(args.into());
    let outcome  = use_case.execute()?;

    print_score(outcome.last_score);
    println!("Training complete. Checkpoints saved to '{}'.", use_case.config().checkpoint_dir);
    Ok(())
}

fn run_submit(args: SubmitArgs) -> Result<()> {
    use crate::application::submit_use_case::SubmitUseCase;

    let use_case   = SubmitUseCase::new(args.into());
    let submission = use_case.execute()?;
    if submission.is_empty() {
        tracing::warn!("The test split has no rows; only the header was written");
    }
    println!("Wrote {} rows to '{}'.", submission.len(), use_case.output().display());
    Ok(())
}

fn run_all(args: RunArgs) -> Result<()> {
    use crate::application::run_use_case::RunUseCase;

    let output = args.output.clone();
    let report = RunUseCase::new(args.train.into(), &output).execute()?;

    print_score(report.outcome.last_score);
    println!("Wrote {} rows to '{}'.", report.submission.len(), output.display());
    Ok(())
}

fn run_toc(args: TocArgs) -> Result<()> {
    use crate::application::toc_use_case::TocUseCase;

    let kept = TocUseCase::new(&args.pdf, &args.output).execute()?;
    println!("Wrote {} TOC entries to '{}'.", kept, args.output.display());
    Ok(())
}
