use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use stripline::{
    EditOutcome, EditSession, EditSettings, Frame, ListRef, RecordingHost, SplitMethod,
    SplitOpts, SplitSide, StripId, Timeline,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stripline", version)]
struct Cli {
    /// Input timeline JSON.
    #[arg(long = "in", global = true)]
    in_path: Option<PathBuf>,

    /// Where to write the edited timeline JSON. Without it the edit is only reported.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Editing settings JSON.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Comma-separated strip names to select before the edit (top-level list).
    #[arg(long, value_delimiter = ',', global = true)]
    select: Vec<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every strip with its channel and display range.
    Inspect,
    /// Split the selected strips at a frame.
    Split(SplitArgs),
    /// Move the content of the selected strips inside their display ranges.
    Slip {
        #[arg(long, allow_hyphen_values = true)]
        offset: Frame,
    },
    /// Close the gap at a frame.
    GapRemove {
        #[arg(long)]
        frame: Frame,
        /// Close every gap after the frame, not just the first.
        #[arg(long)]
        all: bool,
    },
    /// Open a gap at a frame.
    GapInsert {
        #[arg(long)]
        frame: Frame,
        /// Gap length; defaults to the configured `gap_insert_frames`.
        #[arg(long)]
        frames: Option<Frame>,
    },
    /// Move the selected strips so they start at a frame.
    Snap {
        #[arg(long)]
        frame: Frame,
    },
    /// Group the selected strips into a meta strip.
    MetaMake,
    /// Dissolve the active meta strip (the last name given to `--select`).
    MetaSeparate,
    /// Duplicate the selected strips.
    Duplicate,
    /// Delete the selected strips and the effects that use them.
    Delete,
    /// Write all text strips as SubRip subtitles; the last `--select` name must be a text strip.
    ExportSubtitles {
        #[arg(long)]
        srt: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[arg(long)]
    frame: Frame,

    #[arg(long, value_enum, default_value_t = MethodChoice::Soft)]
    method: MethodChoice,

    /// Which pieces stay selected.
    #[arg(long, value_enum, default_value_t = SideChoice::Both)]
    side: SideChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodChoice {
    Soft,
    Hard,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideChoice {
    Left,
    Right,
    Both,
    NoChange,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stripline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let in_path = cli
        .in_path
        .as_deref()
        .context("missing --in <timeline JSON>")?;
    let tl = read_timeline(in_path)?;

    if let Command::Inspect = cli.cmd {
        return cmd_inspect(&tl);
    }

    let settings = match &cli.settings {
        Some(p) => EditSettings::from_path(p)
            .with_context(|| format!("load settings '{}'", p.display()))?,
        None => EditSettings::default(),
    };
    let mut session = EditSession::new(tl, RecordingHost::new()).with_settings(settings)?;

    if !cli.select.is_empty() {
        let ids = resolve_names(session.timeline(), &cli.select)?;
        session.select(&ids, false)?;
    }

    let outcome = run_edit(&mut session, cli.cmd)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(out) = &cli.out {
        write_timeline(session.timeline(), out)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn run_edit(session: &mut EditSession<RecordingHost>, cmd: Command) -> anyhow::Result<EditOutcome> {
    let outcome = match cmd {
        Command::Inspect => EditOutcome::default(),
        Command::Split(args) => {
            let mut opts = SplitOpts::at(args.frame);
            opts.method = match args.method {
                MethodChoice::Soft => SplitMethod::Soft,
                MethodChoice::Hard => SplitMethod::Hard,
            };
            opts.side = match args.side {
                SideChoice::Left => SplitSide::Left,
                SideChoice::Right => SplitSide::Right,
                SideChoice::Both => SplitSide::Both,
                SideChoice::NoChange => SplitSide::NoChange,
            };
            session.split(opts)?
        }
        Command::Slip { offset } => {
            let (applied, outcome) = session.slip(offset)?;
            if applied != offset {
                tracing::info!(requested = offset, applied, "slip offset clamped");
            }
            outcome
        }
        Command::GapRemove { frame, all } => {
            session.set_current_frame(frame);
            session.gap_remove(all)?
        }
        Command::GapInsert { frame, frames } => {
            session.set_current_frame(frame);
            session.gap_insert(frames)?
        }
        Command::Snap { frame } => session.snap(frame)?,
        Command::MetaMake => session.meta_make()?,
        Command::MetaSeparate => session.meta_separate()?,
        Command::Duplicate => session.duplicate()?,
        Command::Delete => session.delete()?,
        Command::ExportSubtitles { srt } => {
            let (path, cues) = session.export_subtitles(&srt)?;
            eprintln!("wrote {cues} cues to {}", path.display());
            EditOutcome::default()
        }
    };
    Ok(outcome)
}

fn cmd_inspect(tl: &Timeline) -> anyhow::Result<()> {
    for id in tl.iter_recursive(ListRef::Root) {
        let s = &tl[id];
        let indent = "  ".repeat(s.depth as usize);
        let mark = if s.flags.selected { "*" } else { " " };
        println!(
            "{mark} {indent}{} [{:?}] ch{} {}..{}",
            s.name, s.kind, s.channel, s.start_disp, s.end_disp
        );
    }
    Ok(())
}

fn resolve_names(tl: &Timeline, names: &[String]) -> anyhow::Result<Vec<StripId>> {
    names
        .iter()
        .map(|name| {
            tl.list(ListRef::Root)
                .iter()
                .copied()
                .find(|&id| tl[id].name == *name)
                .with_context(|| format!("no top-level strip named '{name}'"))
        })
        .collect()
}

fn read_timeline(path: &Path) -> anyhow::Result<Timeline> {
    Timeline::from_path(path).with_context(|| format!("load timeline '{}'", path.display()))
}

fn write_timeline(tl: &Timeline, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = std::fs::File::create(path)
        .with_context(|| format!("create timeline '{}'", path.display()))?;
    tl.to_writer(std::io::BufWriter::new(f))?;
    Ok(())
}
