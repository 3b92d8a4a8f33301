//! Administrative revocation tool.
//!
//! Revokes certificates on behalf of a named operator and responds to private key compromise by
//! blocking and/or revoking everything issued for the key.

use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

use clap::{ArgAction, Parser, Subcommand};
use eyre::{eyre, WrapErr as _};
use revoker::{
    load_private_key, Config, HttpClient, KeyActionOutcome, RevocationReason, Revoker,
};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "admin-revoker", version, about, long_about = None)]
struct Args {
    /// File path to the JSON configuration file (required by every command but list-reasons)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Operator recorded with every action, unless the configuration names one
    #[arg(long, env = "USER", global = true, default_value = "unknown")]
    operator: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all revocation reason codes
    ListReasons,

    /// Revoke a single certificate by the hex serial number
    SerialRevoke {
        serial: String,
        #[arg(value_parser = parse_reason)]
        reason_code: RevocationReason,
    },

    /// Revoke all certificates contained in a file of hex serial numbers, one per line
    BatchedSerialRevoke {
        serial_file_path: PathBuf,
        #[arg(value_parser = parse_reason)]
        reason_code: RevocationReason,
        #[arg(value_parser = parse_parallelism, allow_negative_numbers = true)]
        parallelism: NonZeroUsize,
    },

    /// Revoke all certificates associated with a registration ID
    RegRevoke {
        registration_id: i64,
        #[arg(value_parser = parse_reason)]
        reason_code: RevocationReason,
    },

    /// Revoke a certificate whose stored bytes cannot be parsed, by hex serial number
    MalformedRevoke {
        serial: String,
        #[arg(value_parser = parse_reason)]
        reason_code: RevocationReason,
    },

    /// Add the SPKI hash of the provided private key to the blocked keys table
    PrivateKeyBlock(KeyArgs),

    /// Revoke all certificates matching the SPKI hash of the provided private key, then add the
    /// hash to the blocked keys table
    PrivateKeyRevoke(KeyArgs),
}

#[derive(clap::Args, Debug)]
struct KeyArgs {
    /// true: only query for affected certificates. false: perform the requested action
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    dry_run: bool,

    /// Path to a PEM formatted file containing an RSA or ECDSA private key
    priv_key_path: PathBuf,
}

fn parse_reason(arg: &str) -> Result<RevocationReason, String> {
    arg.parse().map_err(|err: eyre::Report| err.to_string())
}

fn parse_parallelism(arg: &str) -> Result<NonZeroUsize, String> {
    let parallelism = arg
        .parse::<i64>()
        .map_err(|_| "parallelism argument must be an integer".to_owned())?;

    usize::try_from(parallelism)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| "parallelism argument must be >= 1".to_owned())
}

fn list_reasons() {
    println!("Revocation reason codes\n-----------------------\n");
    for reason in RevocationReason::ALL {
        println!("{}: {}", reason.code(), reason.label());
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Command::ListReasons = args.command {
        list_reasons();
        return Ok(());
    }

    let config_path = args
        .config
        .ok_or_else(|| eyre!("--config <path> is required for this command"))?;
    let config = Config::load(&config_path).await?;

    let operator = config.operator_or(&args.operator);
    log::debug!("acting as operator {operator:?}");

    let client = Arc::new(HttpClient::new(&config.revoker)?);
    let revoker = Revoker::new(client.clone(), client, operator);

    match args.command {
        Command::ListReasons => unreachable!("list-reasons does not need a configuration"),

        Command::SerialRevoke {
            serial,
            reason_code,
        } => revoker
            .revoke_by_serial(&serial, reason_code, false)
            .await
            .wrap_err("couldn't revoke certificate by serial")?,

        Command::BatchedSerialRevoke {
            serial_file_path,
            reason_code,
            parallelism,
        } => {
            let report = revoker
                .revoke_by_serial_batch(&serial_file_path, reason_code, parallelism)
                .await
                .wrap_err("batch revocation failed")?;

            if report.failed > 0 {
                log::warn!("{} serials could not be revoked, see errors above", report.failed);
            }
        }

        Command::RegRevoke {
            registration_id,
            reason_code,
        } => revoker
            .revoke_by_registration(registration_id, reason_code)
            .await
            .wrap_err("couldn't revoke certificates by registration")?,

        Command::MalformedRevoke {
            serial,
            reason_code,
        } => revoker
            .revoke_malformed_by_serial(&serial, reason_code)
            .await
            .wrap_err("couldn't revoke certificate by serial")?,

        Command::PrivateKeyBlock(key_args) => {
            let outcome = key_command(&revoker, &key_args, true).await?;
            log::info!("private-key-block finished: {outcome:?}");
        }

        Command::PrivateKeyRevoke(key_args) => {
            let outcome = key_command(&revoker, &key_args, false).await?;
            log::info!("private-key-revoke finished: {outcome:?}");
        }
    }

    Ok(())
}

async fn key_command(
    revoker: &Revoker,
    key_args: &KeyArgs,
    block_only: bool,
) -> eyre::Result<KeyActionOutcome> {
    let path = &key_args.priv_key_path;

    let key_pem = Zeroizing::new(
        tokio::fs::read(path)
            .await
            .wrap_err_with(|| format!("cannot load the provided key {}", path.display()))?,
    );

    let private_key = load_private_key(&key_pem)
        .wrap_err_with(|| format!("cannot parse the provided key {}", path.display()))?;

    let report = revoker.inspect_private_key(&private_key).await?;

    if block_only {
        revoker
            .private_key_block(
                key_args.dry_run,
                report.matching_certs,
                &report.spki_hash,
                &private_key,
            )
            .await
    } else {
        revoker
            .private_key_revoke(key_args.dry_run, report.matching_certs, &private_key)
            .await
    }
}
