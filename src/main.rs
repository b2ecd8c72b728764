use anyhow::Result;
use clap::Parser as ClapParser;

use cli::command::{Cli, Commands, LogFormat};
use cli::info::cmd_info;

mod cli;
mod input;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_level = cli.loglevel.to_level_filter();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(base_level);
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                writeln!(
                    buf,
                    "{{\"ts\":\"{}\",\"lvl\":\"{}\",\"target\":\"{}\",\"msg\":{:?}}}",
                    buf.timestamp(),
                    record.level(),
                    record.target(),
                    record.args().to_string()
                )
            });
        }
    }
    env_builder.try_init()?;

    log::debug!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown revision")
    );

    match cli.command {
        Commands::Info(ref args) => cmd_info(args, &cli)?,
    }

    Ok(())
}
