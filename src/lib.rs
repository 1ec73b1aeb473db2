pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod table;

use env_logger::Env;

/// Initializes logging at `info` unless `RUST_LOG` says otherwise.
pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use error::{ExtractError, ExtractResult};
pub use export::OutputFormat;
pub use pipeline::{run, ExportSummary};
