use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use remote_tasks_core::study::{StudyGroupDraft, StudyHive};
use remote_tasks_core::tutorial::{sample_tutorials, tutorial_search};
use remote_tasks_core::vault::{CreateVaultForm, TimeVault};
use remote_tasks_core::video::{sample_videos, StarRating, Video, VideoLibrary};
use remote_tasks_core::weather::{
    favorite_locations, location_search, sample_locations, ForecastMode, Location, WeatherHome,
};
use remote_tasks_core::{FavoriteSet, FieldSelector, Payload, PreloadedPicker};
use remote_tasks_store_sqlite::SqliteStore;
use serde_json::Value;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "rt")]
#[command(about = "Remote Tasks CLI")]
struct Cli {
    #[arg(long, env = "REMOTE_TASKS_DB", default_value = "./remote_tasks.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Db {
        #[command(subcommand)]
        command: Box<DbCommand>,
    },
    Videos {
        #[command(subcommand)]
        command: Box<VideosCommand>,
    },
    Tutorials {
        #[command(subcommand)]
        command: Box<TutorialsCommand>,
    },
    Groups {
        #[command(subcommand)]
        command: Box<GroupsCommand>,
    },
    Chat {
        #[command(subcommand)]
        command: Box<ChatCommand>,
    },
    Vault {
        #[command(subcommand)]
        command: Box<VaultCommand>,
    },
    Weather {
        #[command(subcommand)]
        command: Box<WeatherCommand>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    SchemaVersion,
    Migrate(DbMigrateArgs),
    Backup(DbBackupArgs),
    IntegrityCheck,
}

#[derive(Debug, Args)]
struct DbMigrateArgs {
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct DbBackupArgs {
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Subcommand)]
enum VideosCommand {
    List(VideosListArgs),
    Play(VideosPlayArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VideoFieldArg {
    Title,
    Description,
}

#[derive(Debug, Args)]
struct VideosListArgs {
    #[arg(long, default_value = "")]
    query: String,
    #[arg(long, value_enum, default_value_t = VideoFieldArg::Title)]
    field: VideoFieldArg,
}

#[derive(Debug, Args)]
struct VideosPlayArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    tap: Option<u8>,
}

#[derive(Debug, Subcommand)]
enum TutorialsCommand {
    List(QueryArgs),
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[arg(long, default_value = "")]
    query: String,
}

#[derive(Debug, Subcommand)]
enum GroupsCommand {
    List,
    Create(GroupsCreateArgs),
    Upload(GroupsUploadArgs),
}

#[derive(Debug, Args)]
struct GroupsCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
}

#[derive(Debug, Args)]
struct GroupsUploadArgs {
    #[arg(long)]
    group: String,
    #[arg(long)]
    file: PathBuf,
}

#[derive(Debug, Subcommand)]
enum ChatCommand {
    Send(ChatSendArgs),
}

#[derive(Debug, Args)]
struct ChatSendArgs {
    #[arg(long)]
    group: String,
    #[arg(long)]
    text: String,
}

#[derive(Debug, Subcommand)]
enum VaultCommand {
    Create(VaultCreateArgs),
}

#[derive(Debug, Args)]
struct VaultCreateArgs {
    #[arg(long)]
    comment: String,
    /// Calendar date in `YYYY-MM-DD` form.
    #[arg(long)]
    open_date: Option<String>,
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum WeatherCommand {
    Search(WeatherSearchArgs),
    Show(WeatherShowArgs),
    Favorite(WeatherNameArgs),
    Favorites,
}

#[derive(Debug, Args)]
struct WeatherSearchArgs {
    #[arg(long)]
    query: String,
}

#[derive(Debug, Args)]
struct WeatherShowArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value_t = false)]
    daily: bool,
}

#[derive(Debug, Args)]
struct WeatherNameArgs {
    #[arg(long)]
    name: String,
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    tracing::debug!(db = %cli.db.display(), "parsed command line");
    match cli.command {
        Command::Db { command } => {
            let mut store = SqliteStore::open(&cli.db)?;
            run_db(*command, &mut store)
        }
        Command::Videos { command } => run_videos(*command),
        Command::Tutorials { command } => run_tutorials(*command),
        Command::Groups { command } => run_groups(*command),
        Command::Chat { command } => run_chat(*command),
        Command::Vault { command } => run_vault(*command),
        Command::Weather { command } => {
            let mut store = SqliteStore::open(&cli.db)?;
            run_weather(*command, &mut store)
        }
    }
}

fn run_db(command: DbCommand, store: &mut SqliteStore) -> Result<()> {
    match command {
        DbCommand::SchemaVersion => run_db_schema_version(store),
        DbCommand::Migrate(args) => run_db_migrate(&args, store),
        DbCommand::Backup(args) => run_db_backup(&args, store),
        DbCommand::IntegrityCheck => run_db_integrity_check(store),
    }
}

fn run_db_schema_version(store: &SqliteStore) -> Result<()> {
    let status = store.schema_status()?;
    emit_json(serde_json::json!({
        "current_version": status.current_version,
        "target_version": status.target_version,
        "pending_versions": status.pending_versions,
        "up_to_date": status.pending_versions.is_empty()
    }))
}

fn run_db_migrate(args: &DbMigrateArgs, store: &mut SqliteStore) -> Result<()> {
    let before = store.schema_status()?;
    if args.dry_run {
        emit_json(serde_json::json!({
            "dry_run": true,
            "current_version": before.current_version,
            "target_version": before.target_version,
            "would_apply_versions": before.pending_versions
        }))?;
        return Ok(());
    }

    store.migrate()?;
    let after = store.schema_status()?;
    emit_json(serde_json::json!({
        "dry_run": false,
        "before_version": before.current_version,
        "applied_versions": before.pending_versions,
        "after_version": after.current_version,
        "target_version": after.target_version,
        "up_to_date": after.pending_versions.is_empty()
    }))
}

fn run_db_backup(args: &DbBackupArgs, store: &mut SqliteStore) -> Result<()> {
    store.migrate()?;
    store.backup_database(&args.out)?;
    emit_json(serde_json::json!({
        "backup_path": args.out,
        "status": "ok"
    }))
}

fn run_db_integrity_check(store: &SqliteStore) -> Result<()> {
    let report = store.integrity_check()?;
    emit_json(serde_json::to_value(&report).context("failed to serialize integrity report")?)
}

fn run_videos(command: VideosCommand) -> Result<()> {
    let mut library = VideoLibrary::new(sample_videos());
    match command {
        VideosCommand::List(args) => {
            let field = args.field.into_selector();
            library.search_mut().set_field(field);
            library.search_mut().set_query(args.query.as_str());
            let videos = library.results().collect::<Vec<_>>();
            emit_json(serde_json::json!({
                "field": field.name(),
                "query": args.query,
                "count": videos.len(),
                "videos": videos
            }))
        }
        VideosCommand::Play(args) => {
            let id = library
                .search()
                .store()
                .records()
                .iter()
                .find(|video| video.title == args.title)
                .map(|video| video.id)
                .ok_or_else(|| anyhow!("unknown video title: {}", args.title))?;
            library.play(id);

            let tap_accepted = args.tap.map(|star| library.tap_star(star));
            let video = library.now_playing().context("player did not open the video")?;
            let rating = library.rating().context("player opened without a rating widget")?;
            emit_json(serde_json::json!({
                "video": video,
                "tap_accepted": tap_accepted,
                "rating": rating_json(rating)
            }))
        }
    }
}

fn rating_json(rating: &StarRating) -> Value {
    serde_json::json!({
        "catalogue_rating": rating.catalogue_rating(),
        "user_rating": rating.user_rating(),
        "filled_stars": rating.filled_stars(),
        "stars": rating.stars()
    })
}

fn run_tutorials(command: TutorialsCommand) -> Result<()> {
    match command {
        TutorialsCommand::List(args) => {
            let mut search = tutorial_search(sample_tutorials());
            search.set_query(args.query.as_str());
            let cards = search.results().collect::<Vec<_>>();
            emit_json(serde_json::json!({
                "query": args.query,
                "count": cards.len(),
                "tutorials": cards
            }))
        }
    }
}

fn run_groups(command: GroupsCommand) -> Result<()> {
    let mut hive = StudyHive::default();
    match command {
        GroupsCommand::List => emit_json(serde_json::json!({ "groups": hive.groups() })),
        GroupsCommand::Create(args) => {
            let draft = StudyGroupDraft { name: args.name, description: args.description };
            let group = hive.create_group(draft)?.clone();
            emit_json(serde_json::json!({
                "group": group,
                "groups": hive.groups()
            }))
        }
        GroupsCommand::Upload(args) => {
            let id = hive
                .find_by_name(&args.group)
                .map(|group| group.id)
                .ok_or_else(|| anyhow!("unknown study group: {}", args.group))?;
            hive.open_group(id);

            let mut picker = PreloadedPicker::new(read_payload(&args.file)?);
            let file = hive
                .upload_file(&mut picker)?
                .context("upload did not produce a shared file")?
                .clone();
            emit_json(serde_json::json!({
                "group": args.group,
                "file": {
                    "id": file.id,
                    "file_name": file.file_name,
                    "size_bytes": file.bytes.len(),
                    "uploaded_at": rfc3339(file.uploaded_at)?
                },
                "shared_files": hive.shared_files(id).len()
            }))
        }
    }
}

fn run_chat(command: ChatCommand) -> Result<()> {
    let mut hive = StudyHive::default();
    match command {
        ChatCommand::Send(args) => {
            let id = hive
                .find_by_name(&args.group)
                .map(|group| group.id)
                .ok_or_else(|| anyhow!("unknown study group: {}", args.group))?;
            hive.open_group(id);

            let mut session = hive.join_session().context("no study group is open")?;
            session.set_composer(args.text);
            let message = session.send()?.clone();
            emit_json(serde_json::json!({
                "session": session.title(),
                "message": message,
                "messages": session.messages()
            }))
        }
    }
}

fn run_vault(command: VaultCommand) -> Result<()> {
    let mut vault = TimeVault::new();
    match command {
        VaultCommand::Create(args) => {
            let mut form = CreateVaultForm::new();
            for path in &args.photos {
                let mut picker = PreloadedPicker::new(read_payload(path)?);
                form.add_photo(&mut picker);
            }
            // The date header becomes the first line; the comment follows it.
            if let Some(raw) = args.open_date.as_deref() {
                form.choose_open_date(parse_open_date(raw)?);
            }
            let comment = format!("{}{}", form.comment(), args.comment);
            form.set_comment(comment);

            let now = OffsetDateTime::now_utc();
            let entry = vault.create_at(form, now)?.clone();
            emit_json(serde_json::json!({
                "entry": {
                    "id": entry.id,
                    "title": entry.title(),
                    "comment": entry.comment,
                    "photos": entry.photos.len(),
                    "open_date": rfc3339(entry.open_date)?,
                    "created_at": rfc3339(entry.created_at)?,
                    "locked": entry.is_locked(now)
                },
                "entries": vault.entries().len()
            }))
        }
    }
}

fn run_weather(command: WeatherCommand, store: &mut SqliteStore) -> Result<()> {
    store.migrate()?;
    match command {
        WeatherCommand::Search(args) => {
            let mut search = location_search(sample_locations());
            search.set_query(args.query.as_str());
            let locations = search.results().collect::<Vec<_>>();
            emit_json(serde_json::json!({
                "query": args.query,
                "count": locations.len(),
                "locations": locations
            }))
        }
        WeatherCommand::Show(args) => {
            let mut home = WeatherHome::new(FavoriteSet::locations(store));
            home.select_location(find_location(&args.name)?)?;
            if args.daily {
                home.set_mode(ForecastMode::Daily);
            }
            let location = home.selected().context("no location is selected")?;
            emit_json(serde_json::json!({
                "title": home.title(),
                "location": location,
                "summary": location.summary(),
                "range": location.range(),
                "is_favorite": home.is_favorite(),
                "forecast": home.forecast(OffsetDateTime::now_utc())
            }))
        }
        WeatherCommand::Favorite(args) => {
            let mut home = WeatherHome::new(FavoriteSet::locations(store));
            home.select_location(find_location(&args.name)?)?;
            let is_favorite =
                home.toggle_favorite()?.context("favorite toggle had no selected location")?;
            emit_json(serde_json::json!({
                "name": args.name,
                "is_favorite": is_favorite
            }))
        }
        WeatherCommand::Favorites => {
            let favorites = FavoriteSet::locations(store);
            let names = favorites.ordered()?;
            let locations = favorite_locations(&favorites, &sample_locations())?;
            emit_json(serde_json::json!({
                "names": names,
                "locations": locations
            }))
        }
    }
}

fn find_location(name: &str) -> Result<Location> {
    sample_locations()
        .records()
        .iter()
        .find(|location| location.name == name)
        .cloned()
        .ok_or_else(|| anyhow!("unknown location: {name}"))
}

fn read_payload(path: &Path) -> Result<Payload> {
    let bytes = fs::read(path).with_context(|| format!("failed to read file {}", path.display()))?;
    let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned());
    Ok(Payload::new(file_name, bytes))
}

fn parse_open_date(value: &str) -> Result<OffsetDateTime> {
    let date = Date::parse(value, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid open date (expected YYYY-MM-DD): {value}"))?;
    Ok(date.midnight().assume_utc())
}

fn rfc3339(value: OffsetDateTime) -> Result<String> {
    value
        .format(&time::format_description::well_known::Rfc3339)
        .context("failed to format RFC3339 timestamp")
}

impl VideoFieldArg {
    fn into_selector(self) -> FieldSelector<Video> {
        match self {
            Self::Title => Video::TITLE,
            Self::Description => Video::DESCRIPTION,
        }
    }
}
