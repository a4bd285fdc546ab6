//! linuxkbd - inspect and drive Linux keyboards from the command line
//!
//! # Architecture
//!
//! ```text
//! /dev/input/eventN ──read──► codec ──► decoder ──► snooper channel ──► stdout
//!                                          ▲
//!                                 modifier state
//!
//! text ──► composer ──► codec ──write──► /dev/input/eventN
//! ```

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

use linuxkbd::config::Config;
use linuxkbd::{device, KeyRef, KeyboardEvent, LinuxKeyboard};

/// How long the snoop loop waits on the channel before checking signals
const SIGNAL_CHECK_INTERVAL: Duration = Duration::from_millis(200);

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Check if shutdown was requested (SIGTERM, SIGINT, or SIGHUP)
fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::Relaxed)
}

/// Set up signal handlers for graceful shutdown
///
/// Handles SIGTERM, SIGINT (Ctrl+C) and SIGHUP (terminal hangup).
fn setup_signal_handlers() {
    unsafe {
        libc::signal(
            libc::SIGTERM,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGINT,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGHUP,
            shutdown_signal_handler as *const () as libc::sighandler_t,
        );
    }
}

extern "C" fn shutdown_signal_handler(_signo: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

fn print_help() {
    println!(
        r#"linuxkbd {} - read, decode and synthesize Linux keyboard events

USAGE:
    linuxkbd [OPTIONS] <COMMAND> [ARGS]

COMMANDS:
    list                    List keyboard event devices
    snoop                   Print decoded key events until Ctrl+C
    type <TEXT>             Type TEXT on the keyboard
    erase <N>               Send N backspaces
    key <NAME|CODE>         Press and release one key (e.g. ENTER, 28)

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    -d, --device <PATH>     Use this event device instead of discovery
    --init-config           Write the default config file
    -f, --force             Overwrite config file without confirmation

EXAMPLES:
    linuxkbd list
    sudo linuxkbd snoop
    sudo linuxkbd type "Hello There!"
    sudo linuxkbd --device /dev/input/event3 erase 6

CONFIG FILE:
    ~/.config/linuxkbd/config.toml (override with LINUXKBD_CONFIG)
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Parsed command line
struct Args {
    device: Option<PathBuf>,
    command: Option<String>,
    operands: Vec<String>,
}

impl Args {
    fn parse(raw: &[String]) -> Result<Self> {
        let mut device = None;
        let mut command = None;
        let mut operands = Vec::new();

        let mut iter = raw.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-d" | "--device" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| anyhow!("{} requires a path", arg))?;
                    device = Some(PathBuf::from(path));
                }
                s if s.starts_with("--device=") => {
                    device = Some(PathBuf::from(&s["--device=".len()..]));
                }
                "-f" | "--force" | "--init-config" => {}
                _ if command.is_none() => command = Some(arg.clone()),
                _ => operands.push(arg.clone()),
            }
        }

        Ok(Self {
            device,
            command,
            operands,
        })
    }
}

fn main() -> Result<()> {
    // Config is read before the logger exists so it can pick the log level;
    // the outcome is reported once logging is up.
    let loaded = Config::config_path().map(|path| (Config::load_from_file(&path), path));
    let config = match &loaded {
        Some((Ok(config), _)) => config.clone(),
        _ => Config::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    match &loaded {
        Some((Ok(_), path)) => info!("Loaded config: {}", path.display()),
        Some((Err(e), path)) => warn!("Failed to load config {}: {:#}", path.display(), e),
        None => debug!("Using built-in default config"),
    }

    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if raw_args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if raw_args.iter().any(|a| a == "--version" || a == "-V") {
        println!("linuxkbd {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Config file generation mode
    if raw_args.iter().any(|a| a == "--init-config") {
        let force = raw_args.iter().any(|a| a == "--force" || a == "-f");
        let path = Config::write_default_config(force)?;
        println!("Config file written: {}", path.display());
        return Ok(());
    }

    let args = Args::parse(&raw_args)?;
    let mut config = config;
    if let Some(path) = &args.device {
        config.device.path = path.to_string_lossy().into_owned();
    }

    match args.command.as_deref() {
        Some("list") => cmd_list(&config),
        Some("snoop") => cmd_snoop(&config),
        Some("type") => {
            if args.operands.is_empty() {
                bail!("type: missing TEXT");
            }
            cmd_type(&config, &args.operands.join(" "))
        }
        Some("erase") => {
            let count = match args.operands.first() {
                Some(n) => n
                    .parse::<usize>()
                    .with_context(|| format!("erase: invalid count {:?}", n))?,
                None => 1,
            };
            cmd_erase(&config, count)
        }
        Some("key") => {
            let key = args
                .operands
                .first()
                .ok_or_else(|| anyhow!("key: missing NAME or CODE"))?;
            cmd_key(&config, KeyRef::parse(key))
        }
        Some(other) => {
            print_help();
            bail!("unknown command: {}", other)
        }
        None => {
            print_help();
            Ok(())
        }
    }
}

fn cmd_list(config: &Config) -> Result<()> {
    let keyboards = device::find_keyboards(&config.device)?;
    if keyboards.is_empty() {
        warn!("No keyboards found in {}", config.device.search_dir);
    }
    for path in keyboards {
        println!("{}", path.display());
    }
    Ok(())
}

/// Format one event the way `snoop` prints it
fn describe(event: &KeyboardEvent) -> String {
    let m = event.modifiers;
    format!(
        "type={} code={} value={} name={:?} rune={:?} [caps={} shift={} ctrl={} alt={} meta={}]",
        event.raw.event_type,
        event.raw.code,
        event.raw.value,
        event.name,
        event.rune,
        m.caps_lock() as u8,
        m.shift() as u8,
        m.ctrl() as u8,
        m.alt() as u8,
        m.meta() as u8,
    )
}

fn cmd_snoop(config: &Config) -> Result<()> {
    let path = device::resolve(&config.device)?;
    let kbd = LinuxKeyboard::open(&path)?;
    let snooper = kbd
        .start_snooping(&config.snoop)
        .context("Failed to start snooping session")?;

    setup_signal_handlers();
    info!("Snooping on {} (Ctrl+C to stop)", path.display());

    loop {
        if shutdown_requested() {
            info!("Shutdown requested, stopping session");
            snooper.cancel();
        }

        let item = if snooper.is_cancelled() {
            // Drain what was queued before cancellation
            match snooper.try_recv() {
                Ok(item) => item,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match snooper.recv_timeout(SIGNAL_CHECK_INTERVAL) {
                Ok(item) => item,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Snooping session closed");
                    break;
                }
            }
        };

        match item {
            Ok(event) => {
                if config.snoop.show_releases || event.raw.is_press() {
                    println!("{}", describe(&event));
                }
            }
            Err(e) => {
                warn!("Session ended: {}", e);
                break;
            }
        }
    }

    snooper.join();
    Ok(())
}

/// Open the configured keyboard and give the desktop time to notice it
fn open_for_typing(config: &Config) -> Result<LinuxKeyboard<std::fs::File>> {
    let path = device::resolve(&config.device)?;
    let kbd = LinuxKeyboard::open(&path)?;
    if config.typing.start_delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(config.typing.start_delay_ms));
    }
    Ok(kbd)
}

fn cmd_type(config: &Config, text: &str) -> Result<()> {
    let mut kbd = open_for_typing(config)?;

    if config.typing.key_delay_ms == 0 {
        kbd.type_string(text)?;
        return Ok(());
    }

    let delay = Duration::from_millis(config.typing.key_delay_ms);
    for c in text.chars() {
        debug!("Typing {:?}", c);
        if c == ' ' {
            kbd.type_space()?;
        } else {
            kbd.type_key(c)?;
        }
        std::thread::sleep(delay);
    }
    Ok(())
}

fn cmd_erase(config: &Config, count: usize) -> Result<()> {
    let mut kbd = open_for_typing(config)?;
    info!("Erasing {} characters", count);
    for _ in 0..count {
        kbd.type_backspace()?;
        if config.typing.key_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(config.typing.key_delay_ms));
        }
    }
    Ok(())
}

fn cmd_key(config: &Config, key: KeyRef) -> Result<()> {
    if key.code() == 0 {
        bail!("unknown key: {}", key);
    }
    let mut kbd = open_for_typing(config)?;
    kbd.tap(key)?;
    Ok(())
}
