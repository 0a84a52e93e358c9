//! serialterm - interactive serial-port terminal
//!
//! Opens the device, starts the background reader and runs the prompt-less
//! command loop over stdin until `/exit`, Ctrl-C, end of input or a device
//! fault.

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use serialterm::config::{default_session_dir, DEFAULT_CONFIG_FILE, DEFAULT_META_PREFIX, DEFAULT_PORT};
use serialterm::serial::{
    spawn_reader, ReaderHandle, SerialDevice, SerialPortDevice, SerialSettings,
};
use serialterm::{
    Dispatcher, Flow, HistoryManager, Session, SessionOptions, TracingSink, NAME,
    VERSION,
};

/// How long shutdown waits for the reader thread
const READER_GRACE: Duration = Duration::from_secs(2);

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "serialterm", version, about = "An interactive serial-port terminal")]
struct Args {
    /// Serial port to use [default: config file port, else /dev/ttyUSB0]
    #[arg(short, long)]
    port: Option<String>,

    /// Session directory holding config, history and logs [default: ~/.serialterm]
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Config file name inside the session directory
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,
}

impl Args {
    fn into_options(self) -> SessionOptions {
        SessionOptions {
            port: self.port,
            session_dir: self.directory.unwrap_or_else(default_session_dir),
            config_file: self.config,
            meta_prefix: DEFAULT_META_PREFIX,
        }
    }
}

/// Why the interactive loop ended
#[derive(Debug)]
enum Shutdown {
    /// `/exit`, Ctrl-C or end of input
    Requested,
    /// The device failed underneath us
    Fault(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(Shutdown::Requested) => ExitCode::SUCCESS,
        Ok(Shutdown::Fault(reason)) => {
            error!("Session ended by device fault: {}", reason);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}: {:#}", NAME, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<Shutdown> {
    let options = args.into_options();
    options.ensure_session_dir()?;

    let log_path = serialterm::logging::init(&options.session_dir, chrono::Local::now())
        .context("setting up session log")?;
    info!("Starting {} v{}", NAME, VERSION);

    let config = options.load_config()?;

    let port = options.resolve_port(&config);
    if options.port.is_none() && config.general.port.is_none() {
        warn!("No port specified, using default ({})", DEFAULT_PORT);
    }
    let device = SerialPortDevice::open(&port, &SerialSettings::default())
        .with_context(|| format!("opening serial device {}", port))?;

    let history = HistoryManager::with_path(options.history_path()).unwrap_or_else(|e| {
        warn!("Failed to load history: {}", e);
        HistoryManager::empty(options.history_path())
    });

    let session = Session::new(options, config, port, device, history).with_log_path(log_path);
    let reader_source = session.device().try_clone_reader()?;
    let mut reader = spawn_reader(reader_source, session.shared(), Arc::new(TracingSink))?;
    let mut dispatcher = Dispatcher::new(session);

    println!("Welcome to {}!", NAME);
    println!("Type '{}exit' to exit.", DEFAULT_META_PREFIX);

    let mut input = spawn_stdin_reader()?;
    let outcome = drive(&mut dispatcher, &mut input, &mut reader, tokio::signal::ctrl_c()).await;

    dispatcher.session().persist_history();

    match reader.shutdown(READER_GRACE).await {
        Some(exit) if exit.is_fault() => warn!("Serial reader stopped: {}", exit),
        Some(exit) => debug!("Serial reader stopped: {}", exit),
        None => {}
    }

    Ok(outcome)
}

/// Run the command loop until exit, interrupt, end of input or a device fault.
///
/// `interrupt` lives across iterations, so a signal that arrives while a line
/// is being handled ends the loop on the next turn.
async fn drive<D, W, I>(
    dispatcher: &mut Dispatcher<D, W>,
    input: &mut mpsc::UnboundedReceiver<std::io::Result<String>>,
    reader: &mut ReaderHandle,
    interrupt: I,
) -> Shutdown
where
    D: SerialDevice,
    W: Write,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            line = input.recv() => match line {
                Some(Ok(line)) => match dispatcher.handle_line(&line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => return Shutdown::Requested,
                    Err(e) if e.is_fatal() => return Shutdown::Fault(e.to_string()),
                    Err(e) => eprintln!("{}", e),
                },
                Some(Err(e)) => {
                    warn!("Failed to read input: {}", e);
                    return Shutdown::Requested;
                }
                None => {
                    debug!("End of input");
                    return Shutdown::Requested;
                }
            },
            _ = &mut interrupt => {
                debug!("Interrupted");
                return Shutdown::Requested;
            }
            exit = reader.finished() => {
                return Shutdown::Fault(exit.to_string());
            }
        }
    }
}

/// Forward stdin lines from a dedicated thread.
///
/// Stdin reads cannot be interrupted, so they stay off the runtime's blocking
/// pool where they would hold up shutdown.
fn spawn_stdin_reader() -> std::io::Result<mpsc::UnboundedReceiver<std::io::Result<String>>> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;

    Ok(rx)
}
