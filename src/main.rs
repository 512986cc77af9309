use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat, usage_exit_code};
use cli::generate::cmd_generate;
use cli::info::cmd_info;
use cli::transform::{cmd_channel, cmd_rate, cmd_volume};

mod cli;
mod input;
mod output;
pub(crate) mod timestamp;

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            std::process::exit(usage_exit_code(&e));
        }
    };

    let base_level = cli.loglevel.to_level_filter();

    let multi = MultiProgress::new();

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

    let pb = if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    match cli.command {
        Commands::Info(ref args) => cmd_info(args, &cli, pb)?,
        Commands::Rate(ref args) => cmd_rate(args, &cli, pb)?,
        Commands::Channel(ref args) => cmd_channel(args, &cli, pb)?,
        Commands::Volume(ref args) => cmd_volume(args, &cli, pb)?,
        Commands::Generate(ref args) => cmd_generate(args)?,
    }

    Ok(())
}
