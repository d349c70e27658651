use std::path::PathBuf;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotlist::{
    cli,
    config::{self, Config},
    error, failure,
    types::{InsertMode, PlaylistDescriptor},
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Paste the redirect URL instead of running a local callback server
    #[clap(long, global = true)]
    manual: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive menu (default)
    Menu(MenuOptions),

    /// Authorize with Spotify API and show the user id
    Login,

    /// Create an empty playlist
    Create(PlaylistArgs),

    #[clap(about = "Create a playlist from the Name column of a CSV file")]
    Import(ImportArgs),

    /// List your playlists
    Playlists,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone, Default)]
pub struct MenuOptions {
    /// Insert every batch at the top of the playlist (reverses batch order)
    #[clap(long)]
    head_insert: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlaylistArgs {
    /// Playlist name
    #[clap(long)]
    name: String,

    /// Playlist description
    #[clap(long, default_value = "")]
    description: String,

    /// Create the playlist as private
    #[clap(long)]
    private: bool,
}

impl PlaylistArgs {
    fn descriptor(&self) -> PlaylistDescriptor {
        PlaylistDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            public: !self.private,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// CSV file with a Name column
    csv: PathBuf,

    #[clap(flatten)]
    playlist: PlaylistArgs,

    /// Reuse the resolved tracks of an earlier run instead of searching again
    #[clap(long)]
    reuse: bool,

    /// Add to an existing playlist with this name instead of creating one
    #[clap(long)]
    existing: bool,

    /// Insert every batch at the top of the playlist (reverses batch order)
    #[clap(long)]
    head_insert: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn insert_mode(head_insert: bool) -> InsertMode {
    if head_insert {
        InsertMode::Head
    } else {
        InsertMode::Append
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Command::Completions(opt)) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let session = match cli::login(&config, cli.manual).await {
        Ok(session) => session,
        Err(e) => error!("Authorization failed: {}", e),
    };

    let command = cli
        .command
        .unwrap_or_else(|| Command::Menu(MenuOptions::default()));

    let result = match command {
        Command::Menu(opt) => {
            cli::menu(&session, &config, insert_mode(opt.head_insert)).await;
            Ok(())
        }
        Command::Login => Ok(()),
        Command::Create(opt) => cli::create(&session, &opt.descriptor()).await.map(|_| ()),
        Command::Import(opt) => {
            let options = cli::ImportOptions {
                reuse: opt.reuse,
                existing: opt.existing,
                mode: insert_mode(opt.head_insert),
            };
            cli::import(
                &session,
                &config,
                &opt.csv,
                &opt.playlist.descriptor(),
                options,
            )
            .await
            .map(|_| ())
        }
        Command::Playlists => cli::list_playlists(&session).await,
        Command::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        failure!("{}", e);
        std::process::exit(1);
    }
}
