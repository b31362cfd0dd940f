//! Operator CLI for the voucher store.
//!
//! # Responsibility
//! - Import flat customer/voucher files into a SQLite database.
//! - Print customers and expired vouchers as flat lines.
//!
//! # Invariants
//! - Every command opens the database through `open_db`, so migrations run
//!   before any repository call.
//! - Failures print one line to stderr and exit non-zero.

use clap::{Parser, Subcommand};
use log::error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use voucher_core::codec::{encode_customer_line, encode_voucher_line};
use voucher_core::db::open_db;
use voucher_core::{
    core_version, default_log_level, import_customers, import_vouchers, init_logging,
    CustomerService, SqliteCustomerRepository, SqliteVoucherRepository, VoucherService,
};

#[derive(Debug, Parser)]
#[command(
    name = "voucher",
    about = "Voucher store operator CLI",
    after_help = "Examples:\n  voucher import-customers store.db customers.csv\n  voucher list-expired store.db"
)]
struct Cli {
    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Insert every customer line of FILE into DB")]
    ImportCustomers { db: PathBuf, file: PathBuf },
    #[command(about = "Insert every voucher line of FILE into DB")]
    ImportVouchers { db: PathBuf, file: PathBuf },
    #[command(about = "Print all customers as flat lines")]
    ListCustomers {
        db: PathBuf,
        #[arg(long, help = "Only list blocked customers")]
        blocked: bool,
    },
    #[command(about = "Print vouchers whose expiry is already past")]
    ListExpired { db: PathBuf },
    #[command(about = "Print the core crate version")]
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = setup_logging(cli.log_dir.as_deref(), cli.log_level.as_deref()) {
        eprintln!("voucher: {message}");
        return ExitCode::from(2);
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("voucher: {message}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(log_dir: Option<&str>, level: Option<&str>) -> Result<(), String> {
    let Some(log_dir) = log_dir else {
        return Ok(());
    };
    init_logging(level.unwrap_or(default_log_level().as_str()), log_dir)
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::ImportCustomers { db, file } => {
            let conn = open_db(&db).map_err(|err| err.to_string())?;
            let repo = SqliteCustomerRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let reader = open_input(&file)?;
            let imported = import_customers(reader, &repo).map_err(|err| err.to_string())?;
            println!("imported {imported} customers");
        }
        Command::ImportVouchers { db, file } => {
            let conn = open_db(&db).map_err(|err| err.to_string())?;
            let repo = SqliteVoucherRepository::try_new(&conn).map_err(|err| err.to_string())?;
            let reader = open_input(&file)?;
            let imported = import_vouchers(reader, &repo).map_err(|err| err.to_string())?;
            println!("imported {imported} vouchers");
        }
        Command::ListCustomers { db, blocked } => {
            let conn = open_db(&db).map_err(|err| err.to_string())?;
            let service = CustomerService::new(
                SqliteCustomerRepository::try_new(&conn).map_err(|err| err.to_string())?,
            );
            let customers = if blocked {
                service.get_all_black_customers()
            } else {
                service.get_all_customers()
            }
            .map_err(|err| err.to_string())?;
            for customer in &customers {
                println!("{}", encode_customer_line(customer));
            }
        }
        Command::ListExpired { db } => {
            let conn = open_db(&db).map_err(|err| err.to_string())?;
            let service = VoucherService::new(
                SqliteVoucherRepository::try_new(&conn).map_err(|err| err.to_string())?,
            );
            let expired = service
                .get_expired_vouchers()
                .map_err(|err| err.to_string())?;
            for voucher in &expired {
                println!("{}", encode_voucher_line(voucher));
            }
        }
        Command::Version => println!("voucher_core version={}", core_version()),
    }
    Ok(())
}

fn open_input(path: &Path) -> Result<BufReader<File>, String> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| format!("cannot open {}: {err}", path.display()))
}
