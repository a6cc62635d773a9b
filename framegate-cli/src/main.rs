use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use framegate::brand::palette::JsonPaletteExtractor;
use framegate::enforce::rules::enforce_learned_rules_with;
use framegate::manifest::poller::run_once;
use framegate::timeline::validate::validate_animation_with;
use framegate::{
    AnimationSpec, DirectoryScanner, GenerationRequest, Generator, Manifest, ManifestWriter,
    PolicyConfig, TemplateCatalog, Workspace, select_templates,
};
use tracing_subscriber::EnvFilter;

/// Manifest file name inside a workspace directory.
const MANIFEST_FILE: &str = "Root.tsx";

#[derive(Parser, Debug)]
#[command(name = "framegate", version)]
struct Cli {
    /// Policy JSON overriding the built-in thresholds.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the frame budget for a scene count.
    Duration(DurationArgs),
    /// Validate a spec's timeline.
    Validate(SpecArgs),
    /// Run the full enforcement gate over a spec.
    Enforce(SpecArgs),
    /// Rank catalog templates against a prompt.
    Templates(TemplatesArgs),
    /// Generate a composition from a request.
    Generate(GenerateArgs),
    /// Drop manifest records whose component file is gone.
    Prune(PruneArgs),
}

#[derive(Parser, Debug)]
struct DurationArgs {
    /// Number of scenes.
    #[arg(long)]
    scenes: u32,

    /// Frames each scene holds (defaults to the policy value).
    #[arg(long)]
    frames_per_scene: Option<u32>,

    /// Frames per transition (defaults to the policy value).
    #[arg(long)]
    transition_frames: Option<u32>,
}

#[derive(Parser, Debug)]
struct SpecArgs {
    /// Input animation spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Include the per-frame report.
    #[arg(long, default_value_t = false)]
    frames: bool,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Free-text request.
    #[arg(long)]
    prompt: String,

    /// How many templates to list.
    #[arg(long, default_value_t = 3)]
    top: usize,

    /// Catalog JSON replacing the built-in templates.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write the emitted component here.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Workspace directory to register the composition in.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Catalog JSON replacing the built-in templates.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PruneArgs {
    /// Workspace directory.
    #[arg(long)]
    manifest: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let policy = match &cli.policy {
        Some(path) => PolicyConfig::from_path(path)
            .with_context(|| format!("load policy '{}'", path.display()))?,
        None => PolicyConfig::default(),
    };
    match cli.cmd {
        Command::Duration(args) => cmd_duration(args, &policy),
        Command::Validate(args) => cmd_validate(args, &policy),
        Command::Enforce(args) => cmd_enforce(args, &policy),
        Command::Templates(args) => cmd_templates(args),
        Command::Generate(args) => cmd_generate(args, policy),
        Command::Prune(args) => cmd_prune(args),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn verdict(valid: bool) -> ExitCode {
    if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn read_spec(path: &Path) -> anyhow::Result<AnimationSpec> {
    let f = std::fs::File::open(path).with_context(|| format!("open spec '{}'", path.display()))?;
    Ok(AnimationSpec::from_reader(std::io::BufReader::new(f))?)
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<TemplateCatalog> {
    match path {
        Some(p) => TemplateCatalog::from_path(p)
            .with_context(|| format!("load catalog '{}'", p.display())),
        None => Ok(TemplateCatalog::builtin()),
    }
}

fn cmd_duration(args: DurationArgs, policy: &PolicyConfig) -> anyhow::Result<ExitCode> {
    let plan = framegate::analysis::duration::synthesize_duration_at(
        args.scenes,
        args.frames_per_scene.unwrap_or(policy.frames_per_scene),
        args.transition_frames.unwrap_or(policy.transition_frames),
        policy.fps,
    )?;
    print_json(&plan)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(args: SpecArgs, policy: &PolicyConfig) -> anyhow::Result<ExitCode> {
    let spec = read_spec(&args.in_path)?;
    let mut res = validate_animation_with(&spec.definitions(), policy);
    if !args.frames {
        res.frame_report.clear();
    }
    print_json(&res)?;
    Ok(verdict(res.valid))
}

fn cmd_enforce(args: SpecArgs, policy: &PolicyConfig) -> anyhow::Result<ExitCode> {
    let spec = read_spec(&args.in_path)?;
    let res = enforce_learned_rules_with(&spec, policy);
    print_json(&res)?;
    Ok(verdict(res.valid))
}

#[derive(serde::Serialize)]
struct RankedTemplate<'a> {
    id: &'a str,
    score: f64,
    reason: &'a str,
    required_fields: Vec<&'static str>,
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<ExitCode> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let ranked = select_templates(&catalog, &args.prompt, args.top);
    let out: Vec<RankedTemplate<'_>> = ranked
        .iter()
        .map(|m| RankedTemplate {
            id: &m.template.id,
            score: m.score,
            reason: &m.reason,
            required_fields: m.template.required_fields.iter().map(|f| f.as_str()).collect(),
        })
        .collect();
    print_json(&out)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_generate(args: GenerateArgs, policy: PolicyConfig) -> anyhow::Result<ExitCode> {
    let f = std::fs::File::open(&args.in_path)
        .with_context(|| format!("open request '{}'", args.in_path.display()))?;
    let mut request = GenerationRequest::from_reader(std::io::BufReader::new(f))?;
    let base = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    if let Some(asset) = request.brand_asset.take() {
        request.brand_asset = Some(if asset.is_relative() {
            base.join(asset)
        } else {
            asset
        });
    }

    let mut generator = Generator::new(policy)?
        .with_catalog(load_catalog(args.catalog.as_deref())?)
        .with_extractor(Arc::new(JsonPaletteExtractor));

    // Keep the writer alive until generation returns so queued writes drain on drop.
    let writer = match &args.manifest {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create workspace '{}'", dir.display()))?;
            let writer = ManifestWriter::spawn(dir.join(MANIFEST_FILE), Manifest::default())?;
            generator = generator.with_workspace(Workspace::new(dir, writer.handle()));
            Some(writer)
        }
        None => None,
    };

    let out = match generator.generate_animation(&request) {
        Ok(out) => out,
        Err(framegate::FramegateError::Enforcement(report)) => {
            print_json(&report)?;
            tracing::error!("{report}");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };
    drop(writer);

    if let Some(path) = &args.out {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, &out.code)
            .with_context(|| format!("write component '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    print_json(&serde_json::json!({
        "compositionId": out.composition_id,
        "metadata": out.metadata,
    }))?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_prune(args: PruneArgs) -> anyhow::Result<ExitCode> {
    let writer = ManifestWriter::spawn(args.manifest.join(MANIFEST_FILE), Manifest::default())?;
    let outcome = run_once(&DirectoryScanner::new(&args.manifest), &writer.handle())?;
    writer.shutdown();
    print_json(&outcome)?;
    Ok(ExitCode::SUCCESS)
}
