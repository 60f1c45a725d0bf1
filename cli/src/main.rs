//! filekit CLI - PDF splitting, merging and file utilities

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use filekit::convert::{convert_to_pdf, ConvertOptions, DEFAULT_PROGRAM};
use filekit::partition;
use filekit::{
    DeletePolicy, PageRange, PageSplitMode, PartSplitMode, PartitionPlan, SplitOptions,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "filekit")]
#[command(version)]
#[command(about = "Split, merge and trim PDFs; convert office files; zip and delete safely", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of pages of a PDF
    Pages {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print a partition plan as JSON without writing any PDF
    Plan(PlanArgs),

    /// Concatenate PDFs in the given order
    Merge {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Split a PDF into parts of N pages
    SplitPages {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages per part
        #[arg(short = 'n', long, value_name = "N")]
        pages_per_part: u32,

        /// Where the short part goes
        #[arg(long, value_enum, default_value = "end")]
        mode: PageMode,

        #[command(flatten)]
        output: SplitOutput,
    },

    /// Split a PDF into N parts of near-equal size
    SplitParts {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of parts
        #[arg(short = 'n', long, value_name = "N")]
        parts: u32,

        /// Which parts get the extra pages
        #[arg(long, value_enum, default_value = "back")]
        mode: PartMode,

        #[command(flatten)]
        output: SplitOutput,
    },

    /// Remove page ranges from a PDF
    Drop {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages to remove (e.g., "2-4,7")
        #[arg(long, value_name = "RANGES")]
        pages: String,

        /// Output file (defaults to <stem>_trimmed.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert an office document or image to PDF
    Convert {
        /// Input file (pdf docx doc xls xlsx png jpg ppt pptx)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <stem>.pdf next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Directory for the converter's staging directories
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,

        /// Converter executable
        #[arg(long, env = "FILEKIT_SOFFICE", default_value = DEFAULT_PROGRAM)]
        soffice: PathBuf,

        /// Extra argument placed before the conversion arguments (repeatable)
        #[arg(long = "launcher-arg", value_name = "ARG", allow_hyphen_values = true)]
        launcher_args: Vec<OsString>,

        /// Timeout in seconds
        #[arg(long, default_value = "3600")]
        timeout: u64,

        /// Delete the input after a successful conversion
        #[arg(long)]
        clean_source: bool,
    },

    /// Pack a single file into a zip archive
    Zip {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output archive (defaults to <FILE>.zip)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Entry name inside the archive
        #[arg(long)]
        name: Option<String>,
    },

    /// Extract the single file of a zip archive
    Unzip {
        /// Input archive
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Delete files and directories, refusing protected paths
    Rm {
        /// Paths to delete
        #[arg(value_name = "PATH", required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// Also refuse this directory and everything below it (repeatable)
        #[arg(long, value_name = "DIR")]
        protect: Vec<PathBuf>,

        /// Only keep the built-in root rules, not the system directories
        #[arg(long)]
        no_system: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
#[command(group(ArgGroup::new("divisor").required(true).args(["pages_per_part", "parts"])))]
#[command(group(ArgGroup::new("document").required(true).args(["input", "count"])))]
struct PlanArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Plan for this many pages instead of reading a file
    #[arg(long, value_name = "PAGES")]
    count: Option<u32>,

    /// Split into parts of N pages
    #[arg(long, value_name = "N")]
    pages_per_part: Option<u32>,

    /// Split into N parts
    #[arg(long, value_name = "N")]
    parts: Option<u32>,

    /// Mode for --pages-per-part
    #[arg(long, value_enum, default_value = "end")]
    page_mode: PageMode,

    /// Mode for --parts
    #[arg(long, value_enum, default_value = "back")]
    part_mode: PartMode,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Args)]
struct SplitOutput {
    /// Output directory (defaults to <stem>_parts)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Build parts on a single thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PageMode {
    /// The short part comes first
    Begin,
    /// The short part comes last
    End,
}

impl From<PageMode> for PageSplitMode {
    fn from(mode: PageMode) -> Self {
        match mode {
            PageMode::Begin => PageSplitMode::Begin,
            PageMode::End => PageSplitMode::End,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PartMode {
    /// The last parts get the extra pages
    Front,
    /// The first parts get the extra pages
    Back,
}

impl From<PartMode> for PartSplitMode {
    fn from(mode: PartMode) -> Self {
        match mode {
            PartMode::Front => PartSplitMode::Front,
            PartMode::Back => PartSplitMode::Back,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pages { input } => cmd_pages(&input),
        Commands::Plan(args) => cmd_plan(&args),
        Commands::Merge { inputs, output } => cmd_merge(&inputs, &output),
        Commands::SplitPages {
            input,
            pages_per_part,
            mode,
            output,
        } => cmd_split(&input, &output, |doc, options| {
            filekit::split_by_page_with_options(doc, pages_per_part, mode.into(), options)
        }),
        Commands::SplitParts {
            input,
            parts,
            mode,
            output,
        } => cmd_split(&input, &output, |doc, options| {
            filekit::split_by_part_with_options(doc, parts, mode.into(), options)
        }),
        Commands::Drop {
            input,
            pages,
            output,
        } => cmd_drop(&input, &pages, output.as_deref()),
        Commands::Convert {
            input,
            output,
            work_dir,
            soffice,
            launcher_args,
            timeout,
            clean_source,
        } => {
            let mut options = ConvertOptions::new()
                .with_program(soffice)
                .with_timeout(Duration::from_secs(timeout))
                .with_clean_source(clean_source);
            for arg in launcher_args {
                options = options.with_launcher_arg(arg);
            }
            cmd_convert(&input, output.as_deref(), work_dir.as_deref(), &options)
        }
        Commands::Zip {
            input,
            output,
            name,
        } => cmd_zip(&input, output.as_deref(), name.as_deref()),
        Commands::Unzip { input, output } => cmd_unzip(&input, &output),
        Commands::Rm {
            paths,
            protect,
            no_system,
        } => cmd_rm(&paths, &protect, no_system),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn saved(path: &Path) {
    println!("{} {}", "Saved to".green(), path.display());
}

fn cmd_pages(input: &Path) -> CliResult {
    println!("{}", filekit::page_count(input)?);
    Ok(())
}

fn cmd_plan(args: &PlanArgs) -> CliResult {
    let count = match (&args.input, args.count) {
        (_, Some(count)) => count,
        (Some(input), None) => filekit::page_count(input.as_path())?,
        (None, None) => return Err("either FILE or --count is required".into()),
    };

    let plan: PartitionPlan = match (args.pages_per_part, args.parts) {
        (Some(per_part), _) => {
            partition::split_by_page_count(count, per_part, args.page_mode.into())?
        }
        (None, Some(parts)) => partition::split_by_part_count(count, parts, args.part_mode.into())?,
        (None, None) => return Err("either --pages-per-part or --parts is required".into()),
    };

    let json = if args.compact {
        serde_json::to_string(&plan)?
    } else {
        serde_json::to_string_pretty(&plan)?
    };
    println!("{}", json);
    Ok(())
}

fn cmd_merge(inputs: &[PathBuf], output: &Path) -> CliResult {
    let merged = filekit::merge(inputs)?;
    fs::write(output, &merged)?;
    println!(
        "{} {} files ({} pages)",
        "Merged".green().bold(),
        inputs.len(),
        filekit::page_count(&merged)?
    );
    saved(output);
    Ok(())
}

fn cmd_split<F>(input: &Path, output: &SplitOutput, split: F) -> CliResult
where
    F: FnOnce(&Path, &SplitOptions) -> filekit::Result<Vec<Vec<u8>>>,
{
    let output_dir = output
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_parts", file_stem(input))));
    fs::create_dir_all(&output_dir)?;

    let options = SplitOptions::new().with_parallel(!output.sequential);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Splitting PDF...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let parts = split(input, &options)?;
    spinner.finish_and_clear();

    let pb = ProgressBar::new(parts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let stem = file_stem(input);
    log::debug!("writing {} parts to {}", parts.len(), output_dir.display());
    let width = parts.len().to_string().len();
    let mut written = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let name = format!("{}_{:0width$}.pdf", stem, i + 1, width = width);
        pb.set_message(name.clone());
        fs::write(output_dir.join(&name), part)?;
        written.push(name);
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    for (i, name) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), name);
    }
    Ok(())
}

fn cmd_drop(input: &Path, pages: &str, output: Option<&Path>) -> CliResult {
    let ranges = PageRange::parse_list(pages).map_err(|e| format!("Invalid page range: {}", e))?;
    let trimmed = filekit::drop_pages(input, &ranges)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_file_name(format!("{}_trimmed.pdf", file_stem(input))));
    fs::write(&output, &trimmed)?;
    saved(&output);
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    work_dir: Option<&Path>,
    options: &ConvertOptions,
) -> CliResult {
    let work_dir = work_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("pdf"));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Converting {}...", input.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let pdf = convert_to_pdf(input, &work_dir, options);
    spinner.finish_and_clear();
    let pdf = pdf?;

    fs::write(&output, &pdf)?;
    saved(&output);
    Ok(())
}

fn cmd_zip(input: &Path, output: Option<&Path>, name: Option<&str>) -> CliResult {
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let mut archive = input.as_os_str().to_owned();
        archive.push(".zip");
        PathBuf::from(archive)
    });
    let zipped = filekit::zip_one_file(input, name)?;
    fs::write(&output, &zipped)?;
    saved(&output);
    Ok(())
}

fn cmd_unzip(input: &Path, output: &Path) -> CliResult {
    let content = filekit::unzip_one_file(input)?;
    fs::write(output, &content)?;
    saved(output);
    Ok(())
}

fn cmd_rm(paths: &[PathBuf], protect: &[PathBuf], no_system: bool) -> CliResult {
    let mut policy = if no_system {
        DeletePolicy::empty()
    } else {
        DeletePolicy::system()
    };
    for dir in protect {
        policy = policy.protect_tree(dir);
    }

    let report = filekit::remove_paths(paths, &policy);
    for path in &report.removed {
        println!("{} {}", "Deleted".green(), path.display());
    }
    for path in &report.missing {
        println!("{} {}", "Missing".yellow(), path.display());
    }
    for (path, err) in &report.failures {
        eprintln!("{} {}: {}", "Failed".red(), path.display(), err);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} path(s) could not be deleted", report.failures.len()).into())
    }
}

fn cmd_version() {
    println!("{} {}", "filekit".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF splitting, merging and file utilities");
    println!();
    println!("License: MIT");
}
