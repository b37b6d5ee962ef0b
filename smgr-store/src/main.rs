//! smgr - Scene metadata command-line host
//!
//! Drives the metadata store of one project: type registry maintenance,
//! record inspection and editing, scene creation/deletion, orphan cleanup
//! and a watch mode that follows scene moves as they happen.
//!
//! Command output goes to stdout; logs go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use smgr_common::config::{self, ProjectConfig, PROJECT_CONFIG_FILE};
use smgr_common::SceneEvent;
use smgr_store::{
    EditSession, FileSceneFactory, Grouping, MetadataStore, NewScene, SceneWatcher,
};
use tokio::sync::broadcast::Receiver;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for smgr
#[derive(Parser, Debug)]
#[command(name = "smgr")]
#[command(about = "Scene metadata manager")]
#[command(version)]
struct Args {
    /// Project root directory
    #[arg(short, long, env = config::PROJECT_ROOT_ENV)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default smgr.toml (if missing), create missing records and
    /// remove orphaned ones
    Init,

    /// Manage the scene type registry
    #[command(subcommand)]
    Types(TypesCommand),

    /// List scenes grouped by type (or folder)
    List {
        #[arg(long)]
        by_folder: bool,
    },

    /// Print a scene's record, creating it if missing
    Show { scene: PathBuf },

    /// Change a scene's type
    SetType { scene: PathBuf, scene_type: String },

    /// Create a scene with its record
    Create {
        name: String,
        /// Target directory, project-relative
        #[arg(long)]
        dir: PathBuf,
        /// Scene type (defaults to the first registered type)
        #[arg(long = "type")]
        scene_type: Option<String>,
        /// Scene file to copy as the initial content
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Delete a scene with its record and side-car files
    Delete { scene: PathBuf },

    /// Remove records whose scene no longer exists
    Clean,

    /// Move a record after its scene was moved/renamed outside smgr
    Moved { from: PathBuf, to: PathBuf },

    /// Watch the assets directory and keep records in sync
    Watch,
}

#[derive(Subcommand, Debug)]
enum TypesCommand {
    List,
    Add { scene_type: String },
    Remove { scene_type: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let root = config::resolve_project_root(args.project.as_deref())?;
    let project_config = ProjectConfig::load(&root)
        .with_context(|| format!("Failed to load config for {}", root.display()))?;

    // Initialize tracing (stderr, so stdout stays machine-readable)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&project_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("smgr v{} - project {}", env!("CARGO_PKG_VERSION"), root.display());

    let mut store = MetadataStore::open(&root, project_config.clone())
        .with_context(|| format!("Failed to open project {}", root.display()))?;

    match args.command {
        Command::Init => init(&store, &project_config),
        Command::Types(cmd) => types(&mut store, cmd),
        Command::List { by_folder } => list(&store, by_folder),
        Command::Show { scene } => {
            let record = store.read(&scene)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Command::SetType { scene, scene_type } => set_type(&mut store, scene, &scene_type),
        Command::Create {
            name,
            dir,
            scene_type,
            template,
        } => {
            let scene_type =
                scene_type.unwrap_or_else(|| store.registry().default_type().to_string());
            let request = NewScene {
                name,
                directory: dir,
                scene_type,
                template,
            };
            let record = store.create_scene(&request, &FileSceneFactory)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Command::Delete { scene } => {
            store.delete_scene(&scene)?;
            println!("Deleted {}", scene.display());
            Ok(())
        }
        Command::Clean => {
            let report = store.reconcile_orphans()?;
            for record in &report.removed {
                println!("Removed {}", record.display());
            }
            println!(
                "{} records scanned, {} removed",
                report.scanned,
                report.removed.len()
            );
            Ok(())
        }
        Command::Moved { from, to } => {
            let outcome = store.on_asset_moved(&from, &to)?;
            println!("{:?}", outcome);
            Ok(())
        }
        Command::Watch => watch(&store),
    }
}

fn init(store: &MetadataStore, project_config: &ProjectConfig) -> Result<()> {
    let config_file = store.root().join(PROJECT_CONFIG_FILE);
    if config_file.exists() {
        info!("Config already present: {}", config_file.display());
    } else {
        config::write_project_config(project_config, &config_file)?;
        println!("Wrote {}", config_file.display());
    }

    let mut created = 0;
    for scene in store.list_scenes()? {
        match store.ensure_record(&scene, None) {
            Ok(status) if status.was_written() => created += 1,
            Ok(_) => {}
            Err(e) => warn!("Could not ensure record for {}: {}", scene.display(), e),
        }
    }
    let report = store.reconcile_orphans()?;

    println!(
        "{} records written, {} orphaned records removed",
        created,
        report.removed.len()
    );
    Ok(())
}

fn types(store: &mut MetadataStore, cmd: TypesCommand) -> Result<()> {
    let registry = store.registry_mut();
    match cmd {
        TypesCommand::List => {}
        TypesCommand::Add { scene_type } => {
            if !registry.add(&scene_type)? {
                println!("'{}' is already registered", scene_type);
            }
        }
        TypesCommand::Remove { scene_type } => {
            if !registry.remove(&scene_type)? {
                println!("'{}' is not registered", scene_type);
            }
        }
    }

    for (index, scene_type) in registry.types().iter().enumerate() {
        println!("{:>3}  {}", index, scene_type);
    }
    Ok(())
}

fn list(store: &MetadataStore, by_folder: bool) -> Result<()> {
    let grouping = if by_folder {
        Grouping::ByFolder
    } else {
        Grouping::ByType
    };
    let catalog = store.catalog(grouping)?;

    for (group, entries) in &catalog.groups {
        println!("{}", group);
        for entry in entries {
            println!("    {}  ({})", entry.record.name, entry.scene.display());
        }
    }
    Ok(())
}

fn set_type(store: &mut MetadataStore, scene: PathBuf, scene_type: &str) -> Result<()> {
    let mut session = EditSession::open(store, &scene)?;
    session.begin_edit(store)?;
    if !store.registry().contains(scene_type) {
        bail!(
            "unknown scene type '{}' (registered: {})",
            scene_type,
            store.registry().types().join(", ")
        );
    }
    session.set_type(scene_type)?;
    let record = session.save(store)?;
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

fn watch(store: &MetadataStore) -> Result<()> {
    let mut rx = store.events().subscribe();
    let watcher = SceneWatcher::start(&store.assets_root(), &store.config().scene_extension)?;

    // Catch up with anything that changed while nobody was watching
    store.reconcile_orphans()?;
    print_events(&mut rx);
    info!("Watching {} (Ctrl-C to stop)", store.assets_root().display());

    loop {
        if let Some(event) = watcher.recv_timeout(Duration::from_millis(500))? {
            if let Err(e) = store.handle(&event) {
                error!("Failed to handle {:?}: {}", event, e);
            }
        }
        print_events(&mut rx);
    }
}

fn print_events(rx: &mut Receiver<SceneEvent>) {
    while let Ok(event) = rx.try_recv() {
        match serde_json::to_string(&event) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to serialize {} event: {}", event.kind(), e),
        }
    }
}
