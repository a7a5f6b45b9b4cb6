//! Server implementation

#![warn(missing_docs)]

mod http;
mod settings;

use std::path::PathBuf;
use std::thread;

use eyre::{eyre, Result, WrapErr};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use train_booking_core::{Config, RequestHandler, StorageConfig};

use settings::Settings;

/// Name of the database file inside the data directory
const DATABASE_FILE: &str = "booking.redb";

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the booking system
    config: Config,

    /// Port for the HTTP server to listen on
    port: u16,
    /// Host for the HTTP server to listen on
    host: String,
    /// Number of HTTP worker threads
    workers: u32,
}

impl Opts {
    fn new(settings: &Settings) -> Self {
        Opts {
            port: settings.port.unwrap_or(8585),
            host: settings
                .host
                .clone()
                .unwrap_or_else(|| String::from("127.0.0.1")),
            config: Config {
                storage: storage_config(settings.data_dir.clone()),
            },
            workers: settings.workers.unwrap_or(8),
        }
    }

    fn from_args(settings: &Settings) -> Result<Self> {
        Self::parse(settings, std::env::args().skip(1))
    }

    fn parse(settings: &Settings, args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut opts = Opts::new(settings);

        let mut option: Option<String> = None;
        for arg in args {
            if let Some(opt) = option {
                match opt.as_str() {
                    "-port" => {
                        opts.port = arg.parse().wrap_err("-port takes a decimal u16")?;
                    }
                    "-host" => opts.host = arg,
                    "-workers" => {
                        opts.workers = arg.parse().wrap_err("-workers takes a decimal u32")?;
                    }
                    "-data-dir" => opts.config.storage = storage_config(Some(arg.into())),
                    _ => return Err(eyre!("unknown option {opt}")),
                }
                option = None;
            } else {
                match arg.as_str() {
                    "-memory" => opts.config.storage = StorageConfig::Memory,
                    _ => option = Some(arg),
                }
            }
        }
        if let Some(opt) = option {
            return Err(eyre!("leftover option {opt}"));
        }
        if opts.workers == 0 {
            return Err(eyre!("-workers must be at least 1"));
        }

        Ok(opts)
    }
}

fn storage_config(data_dir: Option<PathBuf>) -> StorageConfig {
    match data_dir {
        Some(dir) => StorageConfig::Redb {
            path: dir.join(DATABASE_FILE),
        },
        None => StorageConfig::Memory,
    }
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H) {
    loop {
        let rq = match server.recv() {
            Ok(rq) => rq,
            Err(e) => {
                error!(error = %e, "HTTP receive failed");
                return;
            }
        };
        if let Some(rq) = http::parse(rq) {
            handler.handle(rq);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "train_booking_engine=info,train_booking_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    let opts = Opts::from_args(&settings)?;
    info!(
        host = %opts.host,
        port = opts.port,
        workers = opts.workers,
        settings = ?settings.settings_file,
        "configuration loaded"
    );

    let server = tiny_http::Server::http((opts.host.as_str(), opts.port))
        .map_err(|e| eyre!("cannot listen on {}:{}: {e}", opts.host, opts.port))?;
    let booking = train_booking_engine::launch(&opts.config)?;

    thread::scope(|s| -> Result<()> {
        for i in 0..opts.workers {
            thread::Builder::new()
                .name(format!("worker_{i}"))
                .spawn_scoped(s, || http_loop(&server, &booking))?;
        }
        Ok(())
    })?;

    booking.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_use_memory_storage() {
        let opts = Opts::parse(&Settings::default(), args(&[])).unwrap();
        assert_eq!(opts.port, 8585);
        assert_eq!(opts.host, "127.0.0.1");
        assert_eq!(opts.workers, 8);
        assert_eq!(opts.config.storage, StorageConfig::Memory);
    }

    #[test]
    fn arguments_override_settings() {
        let settings = Settings {
            port: Some(9000),
            data_dir: Some("/var/lib/booking".into()),
            ..Default::default()
        };
        let opts = Opts::parse(&settings, args(&["-port", "9100", "-workers", "2"])).unwrap();
        assert_eq!(opts.port, 9100);
        assert_eq!(opts.workers, 2);
        assert_eq!(
            opts.config.storage,
            StorageConfig::Redb {
                path: PathBuf::from("/var/lib/booking/booking.redb")
            }
        );

        let opts = Opts::parse(&settings, args(&["-memory"])).unwrap();
        assert_eq!(opts.config.storage, StorageConfig::Memory);
    }

    #[test]
    fn rejects_bad_arguments() {
        let settings = Settings::default();
        assert!(Opts::parse(&settings, args(&["-port", "http"])).is_err());
        assert!(Opts::parse(&settings, args(&["-tickets", "10"])).is_err());
        assert!(Opts::parse(&settings, args(&["-host"])).is_err());
        assert!(Opts::parse(&settings, args(&["-workers", "0"])).is_err());
    }
}
