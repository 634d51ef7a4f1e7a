use anyhow::Result;
use clap::Parser;
use sksetup::commands::{self, PlanOptions, config::Config};

/// sksetup - Skript server setup resolver
///
/// Finds Skript addons on GitHub, resolves their releases and jars, and
/// resolves Paper server builds.
///
/// Version arguments accept a tag, "latest" (the default) or "-versions" to
/// list what is available.
///
/// Examples:
///   sksetup search skbee
///   sksetup releases SkriptLang/Skript
///   sksetup plan my-server --addon SkBee --addon skript-reflect@2.4#1
#[derive(Parser, Debug)]
#[command(author, version = env!("SKSETUP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(
        long = "github-url",
        env = "SKSETUP_GITHUB_URL",
        value_name = "URL",
        global = true
    )]
    pub github_url: Option<String>,

    /// PaperMC API URL (defaults to https://papermc.io/api/v2)
    #[arg(
        long = "paper-url",
        env = "SKSETUP_PAPER_URL",
        value_name = "URL",
        global = true
    )]
    pub paper_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Search Java projects by name, tolerating small typos
    Search(SearchArgs),

    /// List the releases of a project, oldest first
    Releases(ReleasesArgs),

    /// Show the jars of a release
    Assets(AssetsArgs),

    /// Resolve a Paper server version
    Paper(PaperArgs),

    /// Resolve a full server setup
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Project name, e.g. "skbee"
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ReleasesArgs {
    /// The GitHub repository in the format "owner/name"
    #[arg(value_name = "OWNER/NAME")]
    pub project: String,
}

#[derive(clap::Args, Debug)]
pub struct AssetsArgs {
    /// The GitHub repository in the format "owner/name"
    #[arg(value_name = "OWNER/NAME")]
    pub project: String,

    /// Release tag (defaults to latest)
    #[arg(allow_hyphen_values = true)]
    pub version: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PaperArgs {
    /// Server version (defaults to latest)
    #[arg(allow_hyphen_values = true)]
    pub version: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Name of the server
    pub server_name: String,

    /// Paper version (defaults to latest)
    #[arg(long, value_name = "VERSION")]
    pub server_version: Option<String>,

    /// Skript version (defaults to latest)
    #[arg(long, value_name = "VERSION")]
    pub skript_version: Option<String>,

    /// Which Skript jar to take when the release ships several (1-based)
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub skript_jar: Option<usize>,

    /// Addon to include, as "name" or "owner/name", optionally followed by
    /// "@version". "name:N" picks the N-th search match, a trailing "#N" the
    /// N-th jar of the release.
    #[arg(long = "addon", value_name = "ADDON")]
    pub addons: Vec<String>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config::new(cli.github_url, cli.paper_url, cli.timeout);

    match cli.command {
        Commands::Search(args) => commands::search(config, &args.name).await?,
        Commands::Releases(args) => commands::releases(config, &args.project).await?,
        Commands::Assets(args) => {
            commands::assets(config, &args.project, args.version.as_deref()).await?
        }
        Commands::Paper(args) => commands::paper(config, args.version.as_deref()).await?,
        Commands::Plan(args) => {
            let options = PlanOptions {
                server_name: args.server_name,
                server_version: args.server_version,
                skript_version: args.skript_version,
                skript_jar: args.skript_jar,
                addons: args.addons,
                json: args.json,
            };
            commands::plan(config, options).await?
        }
    }
    Ok(())
}
