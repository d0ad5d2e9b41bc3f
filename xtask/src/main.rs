use std::process::{Command, ExitCode};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "nmtkit dev tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run clippy --fix then cargo +nightly fmt
    Fmt {
        /// Extra arguments passed to `cargo fmt`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run clippy over every feature combination of the library
    Lint,
    /// Run the test suite over every feature combination of the library
    Test,
    /// Run the library benchmarks
    Bench {
        /// Extra arguments passed to the bench harness
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Library feature sets checked by `lint` and `test`.
const FEATURE_SETS: &[&[&str]] = &[
    &["--no-default-features"],
    &[],
    &["--features", "rayon"],
    &["--all-features"],
];

fn run(cmd: &mut Command) -> Result<(), String> {
    let status = cmd
        .status()
        .map_err(|e| format!("failed to run {:?}: {e}", cmd.get_program()))?;
    if !status.success() {
        return Err(format!("{:?} exited with {status}", cmd.get_program()));
    }
    Ok(())
}

fn cmd_fmt(args: &[String]) -> Result<(), String> {
    run(Command::new("cargo").args(["clippy", "--fix", "--allow-dirty", "--allow-staged"]))?;
    let mut cmd = Command::new("cargo");
    cmd.args(["+nightly", "fmt"]);
    cmd.args(args);
    run(&mut cmd)
}

fn for_each_feature_set(task: &[&str]) -> Result<(), String> {
    for features in FEATURE_SETS {
        println!("cargo {} -p nmtkit {}", task.join(" "), features.join(" "));
        run(Command::new("cargo")
            .args(task)
            .args(["-p", "nmtkit"])
            .args(*features))?;
    }
    Ok(())
}

fn cmd_lint() -> Result<(), String> {
    for_each_feature_set(&["clippy", "--all-targets"])?;
    run(Command::new("cargo").args(["clippy", "-p", "nmtkit-cli", "--all-targets"]))
}

fn cmd_test() -> Result<(), String> {
    for_each_feature_set(&["test"])?;
    run(Command::new("cargo").args(["test", "-p", "nmtkit-cli"]))
}

fn cmd_bench(args: &[String]) -> Result<(), String> {
    let mut cmd = Command::new("cargo");
    cmd.args(["bench", "-p", "nmtkit", "--bench", "search", "--"]);
    cmd.args(args);
    run(&mut cmd)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match &cli.cmd {
        Cmd::Fmt { args } => cmd_fmt(args),
        Cmd::Lint => cmd_lint(),
        Cmd::Test => cmd_test(),
        Cmd::Bench { args } => cmd_bench(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}
