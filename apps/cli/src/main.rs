mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use plugdesk_project::tree::visible_rows;
use plugdesk_project::{
    archive, build_artifact, project_context, CreateOptions, JavaVersion, PersistenceGateway,
    ProjectId, ProjectKind, TreeRowKind, Workbench,
};
use plugdesk_settings::PreferencesStore;
use plugdesk_storage::FileStore;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "plugdesk",
    about = "Manage PlugDesk plugin projects from the command line",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建立、列出與管理專案。 / Create, list and manage projects.
    #[command(subcommand)]
    Project(ProjectCommand),
    /// 讀寫專案內的檔案。 / Read and write files inside a project.
    #[command(subcommand)]
    File(FileCommand),
    /// 匯出專案文件。 / Export a project document.
    Export(ExportArgs),
    /// 由專案文件匯入新專案。 / Import a project document as a new project.
    Import(ImportArgs),
    /// 產生建置輸出檔。 / Produce the build artifact for a project.
    Build(BuildArgs),
    /// 連結或解除帳號。 / Link or unlink the account mirror.
    #[command(subcommand)]
    Account(AccountCommand),
    /// 檢視與修改偏好設定。 / Show or change preferences.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// 建立新專案。 / Create a new project.
    New(NewProjectArgs),
    /// 列出所有專案。 / List every project.
    List,
    /// 刪除專案。 / Delete a project.
    Delete { id: String },
    /// 重新命名專案。 / Rename a project.
    Rename { id: String, name: String },
    /// 顯示專案檔案樹。 / Print the project file tree.
    Tree(TreeArgs),
    /// 輸出聊天用的專案摘要。 / Print the project summary used by chat.
    Context {
        id: String,
        /// 目前選取的檔案。 / File to report as currently selected.
        #[arg(long, value_name = "PATH")]
        file: Option<String>,
    },
}

#[derive(Args)]
struct NewProjectArgs {
    /// 專案名稱。 / Project name.
    name: String,

    /// 專案類型；預設為 plugin。 / Project kind; defaults to `plugin`.
    #[arg(long, default_value = "plugin")]
    kind: String,

    /// Java 版本；預設沿用偏好設定。 / Java version; defaults to the preferences value.
    #[arg(long, value_name = "8|11|17|21")]
    java: Option<JavaVersion>,
}

#[derive(Args)]
struct TreeArgs {
    id: String,

    /// 額外展開的資料夾。 / Additional folders to expand.
    #[arg(long = "expand", value_name = "FOLDER")]
    expand: Vec<String>,

    /// 展開所有資料夾。 / Expand every folder.
    #[arg(long, conflicts_with = "expand")]
    expand_all: bool,
}

#[derive(Subcommand)]
enum FileCommand {
    /// 建立或覆寫檔案。 / Create or overwrite a file.
    Write(FileWriteArgs),
    /// 輸出檔案內容。 / Print a file's content.
    Cat { id: String, path: String },
    /// 刪除檔案。 / Delete a file.
    Rm { id: String, path: String },
}

#[derive(Args)]
struct FileWriteArgs {
    id: String,
    path: String,

    /// 檔案內容。 / File content.
    #[arg(long, conflicts_with = "from", required_unless_present = "from")]
    content: Option<String>,

    /// 由本機檔案讀取內容。 / Read the content from a local file.
    #[arg(long, value_name = "FILE")]
    from: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    id: String,

    /// 輸出路徑；預設為 `<name>-export.zip`。 / Output path; defaults to `<name>-export.zip`.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ImportArgs {
    /// 要匯入的專案文件。 / Project document to import.
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

#[derive(Args)]
struct BuildArgs {
    id: String,

    /// 輸出路徑；預設為 `<name>-1.0.0.jar`。 / Output path; defaults to `<name>-1.0.0.jar`.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum AccountCommand {
    /// 連結帳號並開始鏡像專案。 / Link the account and start mirroring projects.
    Link,
    /// 解除帳號連結。 / Unlink the account.
    Unlink,
    /// 顯示連結狀態。 / Show link status.
    Status,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// 設定新專案的預設 Java 版本。 / Set the default Java version for new projects.
    SetJava {
        #[arg(value_name = "8|11|17|21")]
        version: JavaVersion,
    },
    /// 設定聊天後端網址。 / Set the chat backend URL.
    SetBackend { url: String },
    /// 儲存 API 金鑰。 / Store the API key.
    SetApiKey { key: String },
    /// 顯示目前設定。 / Show current settings.
    Show,
    /// 匯出偏好設定。 / Export preferences to a file.
    Export {
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },
    /// 匯入偏好設定。 / Import preferences from a file.
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    let workspace_root = resolve_workspace(workspace)?;
    debug!(workspace = %workspace_root.display(), "resolved workspace");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(execute(command, &workspace_root))
}

async fn execute(command: Commands, workspace_root: &Path) -> Result<()> {
    match command {
        Commands::Project(subcommand) => execute_project_command(subcommand, workspace_root).await,
        Commands::File(subcommand) => execute_file_command(subcommand, workspace_root).await,
        Commands::Export(args) => export_project(args, workspace_root).await,
        Commands::Import(args) => import_project(args, workspace_root).await,
        Commands::Build(args) => build_project(args, workspace_root).await,
        Commands::Account(subcommand) => execute_account_command(subcommand, workspace_root).await,
        Commands::Settings(subcommand) => {
            execute_settings_command(subcommand, workspace_root).await
        }
    }
}

async fn execute_project_command(command: ProjectCommand, workspace_root: &Path) -> Result<()> {
    let mut bench = open_workbench(workspace_root).await?;
    match command {
        ProjectCommand::New(args) => {
            let java_version = match args.java {
                Some(version) => version,
                None => load_preferences(workspace_root)?
                    .preferences()
                    .projects
                    .java_version,
            };
            let id = bench
                .create_project(
                    &args.name,
                    ProjectKind::from(args.kind),
                    CreateOptions { java_version },
                )
                .await?;
            println!("{id}");
        }
        ProjectCommand::List => {
            for project in bench.registry().projects() {
                println!(
                    "{}\t{}\t{}\tJava {}\t{} files",
                    project.id,
                    project.name,
                    project.kind,
                    project.java_version,
                    project.files.len()
                );
            }
        }
        ProjectCommand::Delete { id } => {
            if bench.delete_project(&ProjectId::from_string(&id)).await? {
                println!("Deleted project {id}");
            } else {
                println!("No project with id {id}");
            }
        }
        ProjectCommand::Rename { id, name } => {
            bench
                .rename_project(&ProjectId::from_string(id), &name)
                .await?;
            println!("Renamed project to {}", name.trim());
        }
        ProjectCommand::Tree(args) => {
            bench.open_project(&ProjectId::from_string(args.id))?;
            let Some(tree) = bench.tree() else {
                bail!("no project is open");
            };
            let expansion = bench.expansion_mut();
            if args.expand_all {
                expansion.expand_all(&tree);
            }
            for folder in args.expand {
                expansion.expand(folder.trim_matches('/').to_string());
            }
            for row in visible_rows(&tree, bench.expansion()) {
                let indent = "  ".repeat(row.depth);
                match row.kind {
                    TreeRowKind::Folder { expanded: true } => println!("{indent}v {}/", row.name),
                    TreeRowKind::Folder { expanded: false } => println!("{indent}> {}/", row.name),
                    TreeRowKind::File => println!("{indent}  {}", row.name),
                }
            }
        }
        ProjectCommand::Context { id, file } => {
            let project = bench.open_project(&ProjectId::from_string(id))?.clone();
            if let Some(path) = &file {
                bench.select_file(path)?;
            }
            println!("{}", project_context(&project, bench.selected_file()));
        }
    }
    Ok(())
}

async fn execute_file_command(command: FileCommand, workspace_root: &Path) -> Result<()> {
    let mut bench = open_workbench(workspace_root).await?;
    match command {
        FileCommand::Write(args) => {
            let content = match (args.content, args.from) {
                (Some(content), _) => content,
                (None, Some(source)) => {
                    let source = resolve_input_path(&source)?;
                    fs::read_to_string(&source)
                        .with_context(|| format!("failed to read {}", source.display()))?
                }
                (None, None) => bail!("either --content or --from is required"),
            };
            bench.open_project(&ProjectId::from_string(args.id))?;
            bench.update_file(&args.path, &content).await?;
            println!("Wrote {}", args.path);
        }
        FileCommand::Cat { id, path } => {
            bench.open_project(&ProjectId::from_string(id))?;
            bench.select_file(&path)?;
            if let Some(content) = bench
                .active_project()
                .and_then(|project| project.files.get(&path))
            {
                print!("{content}");
            }
        }
        FileCommand::Rm { id, path } => {
            bench.open_project(&ProjectId::from_string(id))?;
            if bench.delete_file(&path).await? {
                println!("Removed {path}");
            } else {
                println!("No file at {path}");
            }
        }
    }
    Ok(())
}

async fn export_project(args: ExportArgs, workspace_root: &Path) -> Result<()> {
    let mut bench = open_workbench(workspace_root).await?;
    let project = bench.open_project(&ProjectId::from_string(args.id))?;
    let json = archive::to_json(&archive::export(project))?;
    let output = match args.output {
        Some(path) => resolve_input_path(&path)?,
        None => workspace_root.join(archive::export_file_name(project)),
    };
    write_output(&output, &json)?;
    println!("Exported project to {}", output.display());
    Ok(())
}

async fn import_project(args: ImportArgs, workspace_root: &Path) -> Result<()> {
    let input = resolve_input_path(&args.input)?;
    if !input.exists() {
        bail!("project file '{}' does not exist", input.display());
    }
    let contents = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let fallback_name = input
        .file_name()
        .map(|name| archive::name_from_file(&name.to_string_lossy()))
        .unwrap_or_default();

    let document = archive::parse(&contents)
        .map_err(|err| anyhow!("failed to import {}: {err}", input.display()))?;
    let mut bench = open_workbench(workspace_root).await?;
    let id = bench.import_project(document, &fallback_name).await?;
    println!("{id}");
    Ok(())
}

async fn build_project(args: BuildArgs, workspace_root: &Path) -> Result<()> {
    let mut bench = open_workbench(workspace_root).await?;
    let project = bench.open_project(&ProjectId::from_string(args.id))?;
    let artifact = build_artifact(project).context("failed to serialize project files")?;
    let output = match args.output {
        Some(path) => resolve_input_path(&path)?,
        None => workspace_root.join(&artifact.file_name),
    };
    write_output(&output, &artifact.contents)?;
    println!("Built {}", output.display());
    Ok(())
}

async fn execute_account_command(command: AccountCommand, workspace_root: &Path) -> Result<()> {
    let mut bench = open_workbench(workspace_root).await?;
    match command {
        AccountCommand::Link => {
            let account = bench.link_account().await?;
            println!("Linked account {}", account.email);
        }
        AccountCommand::Unlink => {
            bench.unlink_account().await?;
            println!("Account unlinked");
        }
        AccountCommand::Status => match bench.account() {
            Some(account) => println!(
                "Linked as {} <{}> since {}",
                account.name,
                account.email,
                account.linked_at.to_rfc3339()
            ),
            None => println!("Not linked"),
        },
    }
    Ok(())
}

async fn execute_settings_command(command: SettingsCommand, workspace_root: &Path) -> Result<()> {
    let mut store = load_preferences(workspace_root)?;
    match command {
        SettingsCommand::SetJava { version } => {
            store
                .update(|prefs| prefs.projects.java_version = version)
                .context("failed to save preferences")?;
            println!("Default Java version set to {version}");
        }
        SettingsCommand::SetBackend { url } => {
            store
                .update(|prefs| prefs.chat.backend_url = Some(url.clone()))
                .context("failed to save preferences")?;
            match &store.preferences().chat.backend_url {
                Some(url) => println!("Chat backend set to {url}"),
                None => println!("Chat backend cleared"),
            }
        }
        SettingsCommand::SetApiKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                bail!("API key must not be empty");
            }
            let gateway = PersistenceGateway::new(Arc::new(project_store(workspace_root)));
            gateway.save_api_key(key).await?;
            println!("API key saved");
        }
        SettingsCommand::Show => {
            let gateway = PersistenceGateway::new(Arc::new(project_store(workspace_root)));
            let has_api_key = gateway.load_api_key().await?.is_some();
            let prefs = store.preferences();
            println!("java_version: {}", prefs.projects.java_version);
            println!(
                "backend_url: {}",
                prefs.chat.backend_url.as_deref().unwrap_or("(not set)")
            );
            if let Some(endpoint) = prefs.chat.chat_endpoint() {
                println!("chat_endpoint: {endpoint}");
            }
            println!("model: {}", prefs.chat.model);
            println!("api_key: {}", if has_api_key { "set" } else { "not set" });
        }
        SettingsCommand::Export { output } => {
            let output = resolve_input_path(&output)?;
            store
                .export_to(&output)
                .with_context(|| format!("failed to export preferences to {}", output.display()))?;
            println!("Exported preferences to {}", output.display());
        }
        SettingsCommand::Import { input } => {
            let input = resolve_input_path(&input)?;
            if !input.exists() {
                bail!("preferences file '{}' does not exist", input.display());
            }
            store
                .import_from(&input)
                .with_context(|| format!("failed to import preferences from {}", input.display()))?;
            println!("Imported preferences from {}", input.display());
        }
    }
    Ok(())
}

async fn open_workbench(workspace_root: &Path) -> Result<Workbench> {
    let store = project_store(workspace_root);
    let root = store.root().display().to_string();
    let gateway = PersistenceGateway::new(Arc::new(store));
    Workbench::open(gateway)
        .await
        .with_context(|| format!("failed to load projects from {root}"))
}

fn load_preferences(workspace_root: &Path) -> Result<PreferencesStore> {
    let prefs_path = preferences_path(workspace_root);
    PreferencesStore::load(&prefs_path)
        .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn state_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".plugdesk")
}

fn project_store(workspace_root: &Path) -> FileStore {
    FileStore::new(state_dir(workspace_root).join("store"))
}

fn preferences_path(workspace_root: &Path) -> PathBuf {
    state_dir(workspace_root).join("preferences.json")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
