use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabshell::config::{self, Config};
use tabshell::host::{Host, TerminalPrompt};
use tabshell::ipc::{self, IpcClient, SocketBridge};
use tabshell::persist::PersistedState;
use tabshell::shell::{Flow, Shell};
use tabshell::state::EditorState;

#[derive(Parser)]
#[command(name = "tabshell")]
#[command(about = "Editor tabs with save and open dialogs served by a host process")]
struct Cli {
    /// Path to init.lua (defaults to the project root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the host that answers file and dialog requests
    Host {
        /// Path to IPC socket (defaults to $TABSHELL_SOCKET, then config)
        #[arg(short, long, env = "TABSHELL_SOCKET")]
        socket: Option<PathBuf>,
    },
    /// Ping a running host
    Ping {
        /// Path to IPC socket (defaults to $TABSHELL_SOCKET, then config)
        #[arg(short, long, env = "TABSHELL_SOCKET")]
        socket: Option<PathBuf>,
    },
    /// Edit files interactively against a running host
    Shell {
        /// Path to IPC socket (defaults to $TABSHELL_SOCKET, then config)
        #[arg(short, long, env = "TABSHELL_SOCKET")]
        socket: Option<PathBuf>,
        /// Session file to restore open files from and save them to on quit
        #[arg(long)]
        session: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Host { socket } => socket_path(socket, &config).and_then(run_host),
        Commands::Ping { socket } => socket_path(socket, &config).and_then(|socket| {
            let mut client = IpcClient::connect(&socket).map_err(|e| e.to_string())?;
            client.ping().map_err(|e| format!("Ping failed: {}", e))?;
            println!("Pong!");
            Ok(())
        }),
        Commands::Shell { socket, session } => socket_path(socket, &config).and_then(|socket| {
            let session = session.or_else(|| config.session_path.clone());
            run_shell(&socket, session.as_deref(), &config)
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn socket_path(arg: Option<PathBuf>, config: &Config) -> Result<PathBuf, String> {
    arg.or_else(|| config.socket_path.clone())
        .ok_or_else(|| "No socket given: pass --socket, set TABSHELL_SOCKET or config.socket_path".into())
}

fn run_host(socket: PathBuf) -> Result<(), String> {
    let handle = ipc::start_ipc_server(&socket).map_err(|e| e.to_string())?;
    let mut host = Host::new(TerminalPrompt::stdio());
    host.serve(&handle);
    Ok(())
}

fn run_shell(socket: &Path, session: Option<&Path>, config: &Config) -> Result<(), String> {
    let bridge = SocketBridge::connect(socket).map_err(|e| e.to_string())?;

    let state = match session.filter(|p| p.exists()) {
        Some(path) => match PersistedState::load(path) {
            Ok(persisted) => EditorState::from_persisted(persisted),
            Err(e) => {
                log::error!("Failed to restore session from {}: {}", path.display(), e);
                EditorState::new()
            }
        },
        None => EditorState::new(),
    };

    let mut shell = Shell::new(bridge, state, config.working_directory.clone());
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ").map_err(|e| e.to_string())?;
        stdout.flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).map_err(|e| e.to_string())? == 0 {
            break;
        }
        if shell.execute(&line, &mut stdout).map_err(|e| e.to_string())? == Flow::Quit {
            break;
        }
    }

    if let Some(path) = session {
        shell
            .state()
            .to_persisted()
            .save(path)
            .map_err(|e| format!("Failed to save session to {}: {}", path.display(), e))?;
        log::info!("Saved session to {}", path.display());
    }
    Ok(())
}
