use clap::Parser;
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use seam::config::PatchConfiguration;
use seam::diff::FilePatch;
use seam::error::AppError;
use seam::patcher::{self, HunkStatus};
use seam::{parser, paths};

#[derive(Parser, Debug)]
#[command(version, about = "Apply unified diffs with fuzzy, offset-tolerant matching", long_about = None)]
struct Args {
    /// Patch file; read from stdin when omitted and input is piped
    #[arg(index = 1)]
    patch_file: Option<PathBuf>,
    /// Apply everything to this one file, ignoring the paths in the patch
    #[arg(short, long)]
    target: Option<PathBuf>,
    /// Directory the patch's stripped paths are resolved under
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Leading path segments to strip from patch paths
    #[arg(short = 'p', long, default_value_t = 1)]
    strip: usize,
    /// Fuzz factor: context lines allowed to mismatch; -1 widens automatically
    #[arg(short = 'F', long, default_value_t = 0, allow_hyphen_values = true)]
    fuzz: i32,
    /// Apply the patch in reverse
    #[arg(short = 'R', long)]
    reverse: bool,
    /// Compare lines with whitespace runs collapsed
    #[arg(short = 'l', long)]
    ignore_whitespace: bool,
    /// Report what would happen without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("seam: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool, AppError> {
    let patch_text = read_patch_text(args)?;
    let patches = parser::parse_patch(&patch_text)?;
    if patches.is_empty() {
        return Err(AppError::EmptyPatch);
    }

    let mut config = PatchConfiguration::new();
    config.set_fuzz(args.fuzz)?;
    config.set_reversed(args.reverse);
    config.set_ignore_whitespace(args.ignore_whitespace);
    config.set_strip_prefix_segments(args.strip);

    let mut all_applied = true;
    for patch in &patches {
        match apply_one(patch, &config, args) {
            Ok(applied) => all_applied &= applied,
            Err(err) => {
                eprintln!("seam: {err}");
                all_applied = false;
            }
        }
    }
    Ok(all_applied)
}

fn read_patch_text(args: &Args) -> Result<String, AppError> {
    match &args.patch_file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            if io::stdin().is_terminal() {
                return Err(AppError::NoInput);
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn apply_one(patch: &FilePatch, config: &PatchConfiguration, args: &Args) -> Result<bool, AppError> {
    let relative = paths::target_path(patch, config);
    let path = match &args.target {
        Some(explicit) => explicit.clone(),
        None => args.dir.join(relative),
    };

    let creating = if config.reversed() { patch.is_deletion() } else { patch.is_addition() };
    let deleting = if config.reversed() { patch.is_addition() } else { patch.is_deletion() };

    let original = if creating {
        String::new()
    } else {
        fs::read_to_string(&path).map_err(|_| AppError::TargetMissing {
            path: path.display().to_string(),
        })?
    };
    let target_lines: Vec<String> = original.lines().map(String::from).collect();

    let result = patcher::apply(patch, &target_lines, config);

    println!("patching {}", path.display());
    for (index, hunk_result) in result.hunks.iter().enumerate() {
        let number = index + 1;
        match hunk_result.status {
            HunkStatus::Applied if hunk_result.offset == 0 => {
                println!("Hunk #{number} applied");
            }
            HunkStatus::Applied => {
                println!("Hunk #{number} applied at offset {} lines", hunk_result.offset);
            }
            HunkStatus::AppliedWithFuzz(fuzz) => {
                println!(
                    "Hunk #{number} applied with fuzz {fuzz} (offset {} lines)",
                    hunk_result.offset
                );
            }
            HunkStatus::Skipped => {
                println!("Hunk #{number} skipped by filter");
            }
            HunkStatus::Failed(reason) => {
                println!("Hunk #{number} FAILED: {reason}");
            }
        }
    }
    println!(
        "{} of {} hunks applied",
        result.applied_count(),
        result.hunks.len()
    );

    if args.dry_run {
        return Ok(result.all_applied());
    }

    if deleting && result.all_applied() && result.new_content.is_empty() {
        fs::remove_file(&path)?;
        println!("removed {}", path.display());
    } else {
        let mut output = result.new_content.join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, output)?;
    }

    Ok(result.all_applied())
}
