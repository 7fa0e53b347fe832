mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{DEFAULT_REGION, DEFAULT_WEEK};
use bluebloom::alerts::{
    find_perfect_weeks, find_perfect_weeks_grid, week_range, AlertUseCase, PerfectWeekGrid, SEASON_WEEKS,
};
use bluebloom::beaches::BeachSafety;
use bluebloom::bulletin::generate_bulletin;
use bluebloom::config::BloomConfig;
use bluebloom::data::Dataset;
use bluebloom::impact::{simulate_impact, DeploymentIntensity, ImpactSimulationInput};
use bluebloom::narrative::{
    build_pilot_opportunity, build_pitch_snippet, format_pilot_as_text, format_pitch_as_markdown,
    format_pitch_as_text,
};
use bluebloom::recommend::recommend_actors;
use bluebloom::scoring::{
    build_clusters_for_situation, build_gap_radar, build_investor_view, compute_problem_fit_score,
};
use bluebloom::{format_score, BloomSummary};

#[derive(Parser)]
#[command(name = "bluebloom", about = "Cyanobacteria bloom situation and blue-economy matchmaking")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List regions with observations
    Regions(OutputArgs),
    /// List observed weeks
    Weeks(WeeksArgs),
    Summary(SituationArgs),
    Bulletin(SituationArgs),
    Recommend(RecommendArgs),
    Fit(ActorArgs),
    Gaps(SituationArgs),
    Clusters(SituationArgs),
    Investor(InvestorArgs),
    PerfectWeeks(PerfectWeeksArgs),
    /// Swimming status of known beaches
    Beaches(BeachesArgs),
    Impact(ImpactArgs),
    Pitch(PitchArgs),
    Pilot(ActorArgs),
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    Serve(ServeArgs),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default config to disk
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct WeeksArgs {
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct SituationArgs {
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
    #[arg(long, default_value_t = DEFAULT_WEEK)]
    week: u32,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct RecommendArgs {
    #[command(flatten)]
    situation: SituationArgs,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args, Debug, Clone)]
struct ActorArgs {
    #[command(flatten)]
    situation: SituationArgs,
    #[arg(long)]
    actor: String,
}

#[derive(Args, Debug, Clone)]
struct InvestorArgs {
    #[command(flatten)]
    situation: SituationArgs,
    #[arg(long)]
    investor: String,
}

#[derive(Args, Debug, Clone)]
struct PerfectWeeksArgs {
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
    #[arg(long)]
    startup: String,
    #[arg(long)]
    from: Option<u32>,
    #[arg(long)]
    to: Option<u32>,
    /// Keep only matches for these use cases (repeatable, default all)
    #[arg(long = "use-case", value_enum)]
    use_cases: Vec<AlertUseCase>,
    /// Scan every region, over weeks 17-30 unless --from/--to are given
    #[arg(long)]
    all_regions: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct BeachesArgs {
    /// Filter by beach name or region
    query: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ImpactArgs {
    #[command(flatten)]
    situation: SituationArgs,
    #[arg(long)]
    actor: String,
    #[arg(long, default_value_t = 4)]
    duration: u32,
    #[arg(long, value_enum, default_value_t = DeploymentIntensity::Medium)]
    intensity: DeploymentIntensity,
}

#[derive(Args, Debug, Clone)]
struct PitchArgs {
    #[command(flatten)]
    actor: ActorArgs,
    #[arg(long)]
    markdown: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, config_path) = BloomConfig::load(cli.config).map_err(|err| err.to_string())?;
    let command = cli.command.unwrap_or(Command::Summary(SituationArgs {
        region: DEFAULT_REGION.to_string(),
        week: DEFAULT_WEEK,
        json: false,
    }));

    if let Command::Config {
        command: ConfigCommand::Init { path, force },
    } = command
    {
        let path = path
            .or(config_path)
            .unwrap_or_else(|| PathBuf::from("config/bluebloom.toml"));
        return run_config_init(&config, &path, force);
    }

    let dataset = Dataset::load(&config).map_err(|err| err.to_string())?;
    match command {
        Command::Regions(args) => run_regions(&dataset, args),
        Command::Weeks(args) => run_weeks(&dataset, args),
        Command::Summary(args) => run_summary(&dataset, args),
        Command::Bulletin(args) => run_bulletin(&dataset, args),
        Command::Recommend(args) => run_recommend(&dataset, args),
        Command::Fit(args) => run_fit(&dataset, args),
        Command::Gaps(args) => run_gaps(&dataset, args),
        Command::Clusters(args) => run_clusters(&dataset, args),
        Command::Investor(args) => run_investor(&dataset, args),
        Command::PerfectWeeks(args) => run_perfect_weeks(&dataset, args),
        Command::Beaches(args) => run_beaches(&dataset, args),
        Command::Impact(args) => run_impact(&dataset, args),
        Command::Pitch(args) => run_pitch(&dataset, args),
        Command::Pilot(args) => run_pilot(&dataset, args),
        Command::Serve(args) => server::serve(args, dataset).await,
        Command::Config { .. } => Ok(()),
    }
}

fn run_config_init(config: &BloomConfig, path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!("config already exists: {} (pass --force to overwrite)", path.display()));
    }
    config.write(path).map_err(|err| err.to_string())?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

fn run_regions(dataset: &Dataset, args: OutputArgs) -> Result<(), String> {
    let regions = dataset.regions();
    if args.json {
        return print_json(&regions);
    }
    for region in regions {
        println!("{}", region);
    }
    Ok(())
}

fn run_weeks(dataset: &Dataset, args: WeeksArgs) -> Result<(), String> {
    let weeks = dataset.weeks(args.region.as_deref());
    if args.json {
        return print_json(&weeks);
    }
    let weeks: Vec<String> = weeks.iter().map(|week| week.to_string()).collect();
    println!("{}", weeks.join(", "));
    Ok(())
}

fn situation(dataset: &Dataset, args: &SituationArgs) -> BloomSummary {
    dataset.summary(&args.region, args.week)
}

fn run_summary(dataset: &Dataset, args: SituationArgs) -> Result<(), String> {
    let summary = situation(dataset, &args);
    if args.json {
        return print_json(&summary);
    }

    println!("{}, week {}", summary.region, summary.week);
    println!("Overall risk: {}", summary.overall_risk_level);
    println!("Observations: {}", summary.total_observations);
    if summary.hotspots.is_empty() {
        println!("Hotspots: none");
    } else {
        println!("Hotspots:");
        for hotspot in &summary.hotspots {
            println!(
                "  {}: {} ({} observations, {})",
                hotspot.area_name, hotspot.severity, hotspot.observation_count, hotspot.trend
            );
        }
    }
    if !summary.safe_areas.is_empty() {
        println!("Safe areas: {}", summary.safe_areas.join(", "));
    }
    if !summary.key_messages.is_empty() {
        println!();
        for message in &summary.key_messages {
            println!("- {}", message);
        }
    }
    Ok(())
}

fn run_bulletin(dataset: &Dataset, args: SituationArgs) -> Result<(), String> {
    let bulletin = generate_bulletin(&situation(dataset, &args));
    if args.json {
        return print_json(&bulletin);
    }
    println!("{}", bulletin.citizen_bulletin);
    println!("\n---\n");
    println!("{}", bulletin.expert_note);
    Ok(())
}

fn run_recommend(dataset: &Dataset, args: RecommendArgs) -> Result<(), String> {
    let summary = situation(dataset, &args.situation);
    let recommendations = recommend_actors(&summary, &dataset.actors, args.seed);
    if args.situation.json {
        return print_json(&recommendations);
    }
    if recommendations.is_empty() {
        println!("No recommendations for the current situation.");
    }
    for recommendation in recommendations {
        println!("{}", recommendation.theme);
        println!("  {}", recommendation.explanation);
        for actor in &recommendation.actors {
            println!("  - {} ({:?}, {})", actor.name, actor.kind, actor.country);
        }
        println!();
    }
    Ok(())
}

fn run_fit(dataset: &Dataset, args: ActorArgs) -> Result<(), String> {
    let actor = dataset.actor(&args.actor).map_err(|err| err.to_string())?;
    let summary = situation(dataset, &args.situation);
    let fit = compute_problem_fit_score(&summary, actor);
    if args.situation.json {
        return print_json(&fit);
    }
    println!("Problem fit for {}: {}", actor.name, format_score(fit.score, fit.label));
    println!("{}", fit.explanation);
    for driver in &fit.drivers {
        println!("- {}", driver);
    }
    Ok(())
}

fn run_gaps(dataset: &Dataset, args: SituationArgs) -> Result<(), String> {
    let summary = situation(dataset, &args);
    let gaps = build_gap_radar(&summary, &dataset.actors, &dataset.config.radar);
    if args.json {
        return print_json(&gaps);
    }
    if gaps.is_empty() {
        println!("No significant solution gaps this week.");
    }
    for gap in gaps {
        println!(
            "{}: gap {} (severity {}, coverage {})",
            gap.theme.title, gap.gap_score, gap.severity_score, gap.coverage_score
        );
        println!("  {}", gap.summary);
        for driver in &gap.drivers {
            println!("  - {}", driver);
        }
    }
    Ok(())
}

fn run_clusters(dataset: &Dataset, args: SituationArgs) -> Result<(), String> {
    let summary = situation(dataset, &args);
    let clusters = build_clusters_for_situation(&summary, &dataset.actors);
    if args.json {
        return print_json(&clusters);
    }
    if clusters.is_empty() {
        println!("No collaboration clusters for the current situation.");
    }
    for cluster in clusters {
        println!("{} [{}]", cluster.theme.title, cluster.member_names().join(", "));
        println!("  {}", cluster.summary);
        for benefit in &cluster.benefits {
            println!("  - {}", benefit);
        }
        println!("  {}", cluster.suitability_note);
    }
    Ok(())
}

fn run_investor(dataset: &Dataset, args: InvestorArgs) -> Result<(), String> {
    let investor = dataset.investor(&args.investor).map_err(|err| err.to_string())?;
    let summary = situation(dataset, &args.situation);
    let view = build_investor_view(&summary, investor, &dataset.actors, &dataset.config.investor);
    if args.situation.json {
        return print_json(&view);
    }

    let relevance = &view.situation_relevance;
    println!(
        "Situation relevance for {}: {}",
        investor.name,
        format_score(relevance.score, relevance.label)
    );
    println!("{}", relevance.explanation);

    println!("\nDeal flow:");
    for item in &view.top_deal_flow {
        println!("  {} {}", item.startup.name, format_score(item.fit_score, item.fit_label));
        for reason in &item.reasons {
            println!("    - {}", reason);
        }
    }
    if !view.portfolio_insights.is_empty() {
        println!("\nPortfolio insights:");
        for insight in &view.portfolio_insights {
            println!("  - {}", insight.text);
        }
    }
    if !view.under_served_themes.is_empty() {
        println!("\nUnder-served themes:");
        for theme in &view.under_served_themes {
            println!("  {}: {}", theme.theme, theme.reason);
        }
    }
    Ok(())
}

fn run_perfect_weeks(dataset: &Dataset, args: PerfectWeeksArgs) -> Result<(), String> {
    dataset.startup(&args.startup).map_err(|err| err.to_string())?;
    let use_cases = if args.use_cases.is_empty() {
        AlertUseCase::ALL.to_vec()
    } else {
        args.use_cases.clone()
    };
    let fallback = if args.all_regions {
        week_range(SEASON_WEEKS.0, SEASON_WEEKS.1).map_err(|err| err.to_string())?
    } else {
        dataset.weeks(Some(args.region.as_str()))
    };
    let weeks = match (args.from, args.to) {
        (Some(from), Some(to)) => week_range(from, to).map_err(|err| err.to_string())?,
        (None, None) => fallback,
        _ => return Err("--from and --to must be given together".to_string()),
    };

    if args.all_regions {
        let grid = find_perfect_weeks_grid(
            dataset,
            dataset.alert_rules(&args.startup),
            &args.startup,
            &dataset.regions(),
            &weeks,
            &use_cases,
        );
        if args.json {
            return print_json(&grid);
        }
        print_grid(&grid);
        return Ok(());
    }

    let mut overview = find_perfect_weeks(
        dataset,
        dataset.alert_rules(&args.startup),
        &args.startup,
        &args.region,
        &weeks,
    );
    overview.retain_use_cases(&use_cases);
    if args.json {
        return print_json(&overview);
    }
    if overview.matches.is_empty() {
        println!("No matching weeks in {}.", overview.region);
    }
    for item in &overview.matches {
        println!("Week {}: {} ({})", item.week, item.rule_name, item.use_case.label());
        println!("  {}", item.reason);
    }
    Ok(())
}

fn print_grid(grid: &PerfectWeekGrid) {
    let first = grid.weeks.first().copied().unwrap_or_default();
    let last = grid.weeks.last().copied().unwrap_or_default();
    println!(
        "Perfect weeks for {} (weeks {}-{}): {} in total",
        grid.startup_id, first, last, grid.total_perfect_weeks
    );
    for row in &grid.regions {
        let weeks: Vec<String> = row.perfect_weeks.iter().map(|week| week.to_string()).collect();
        if weeks.is_empty() {
            println!("  {}: 0", row.region);
        } else {
            println!("  {}: {} (weeks {})", row.region, row.perfect_week_count, weeks.join(", "));
        }
    }
}

fn run_beaches(dataset: &Dataset, args: BeachesArgs) -> Result<(), String> {
    let statuses = dataset.beach_statuses(args.query.as_deref());
    if args.json {
        return print_json(&statuses);
    }
    if statuses.is_empty() {
        println!("No beaches found.");
    }
    for status in &statuses {
        let updated = match (&status.last_updated, &status.description) {
            (Some(date), Some(description)) => format!(" [{}, {}]", date, description),
            _ => String::new(),
        };
        println!(
            "{} ({}): {}{}",
            status.beach.name,
            status.beach.region,
            status.status.message(),
            updated
        );
        if status.status == BeachSafety::Detected {
            println!("  Avoid swimming and keep pets out of the water.");
        }
    }
    Ok(())
}

fn run_impact(dataset: &Dataset, args: ImpactArgs) -> Result<(), String> {
    let actor = dataset.actor(&args.actor).map_err(|err| err.to_string())?;
    let input = ImpactSimulationInput {
        region: args.situation.region.clone(),
        start_week: args.situation.week,
        duration_weeks: args.duration,
        deployment_intensity: args.intensity,
    };
    let summary = situation(dataset, &args.situation);
    let result = simulate_impact(&summary, actor, &input).map_err(|err| err.to_string())?;
    if args.situation.json {
        return print_json(&result);
    }

    println!("{}", result.headline);
    println!("{:>6} {:>9} {:>14}", "week", "baseline", "with solution");
    for point in &result.points {
        println!(
            "{:>6} {:>9} {:>14}",
            result.start_week.saturating_add(point.week_offset),
            point.baseline_risk,
            point.with_solution_risk
        );
    }
    for note in &result.notes {
        println!("- {}", note);
    }
    Ok(())
}

fn run_pitch(dataset: &Dataset, args: PitchArgs) -> Result<(), String> {
    let actor = dataset.actor(&args.actor.actor).map_err(|err| err.to_string())?;
    let pitch = build_pitch_snippet(&situation(dataset, &args.actor.situation), actor);
    if args.actor.situation.json {
        return print_json(&pitch);
    }
    if args.markdown {
        print!("{}", format_pitch_as_markdown(&pitch));
    } else {
        print!("{}", format_pitch_as_text(&pitch));
    }
    Ok(())
}

fn run_pilot(dataset: &Dataset, args: ActorArgs) -> Result<(), String> {
    let actor = dataset.actor(&args.actor).map_err(|err| err.to_string())?;
    let summary = situation(dataset, &args.situation);
    let pilot = build_pilot_opportunity(&summary, actor);
    if args.situation.json {
        return print_json(&pilot);
    }
    println!("{}", format_pilot_as_text(&pilot, &summary.region, summary.week, &actor.name));
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload =
        serde_json::to_string_pretty(value).map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bluebloom=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
