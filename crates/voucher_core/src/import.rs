//! Bulk import of flat customer/voucher lines.
//!
//! # Invariants
//! - Blank lines are skipped; every other line must decode.
//! - Import stops at the first failing line; earlier inserts are kept.
//! - Reported line numbers are 1-based.

use crate::codec::{decode_customer_line, decode_voucher_line, CodecError};
use crate::repo::customer_repo::CustomerRepository;
use crate::repo::voucher_repo::VoucherRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Decode { line: usize, source: CodecError },
    Repo { line: usize, source: RepoError },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read import input: {err}"),
            Self::Decode { line, source } => write!(f, "line {line}: {source}"),
            Self::Repo { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::Repo { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Imports customer lines and returns how many were inserted.
pub fn import_customers<B: BufRead, R: CustomerRepository + ?Sized>(
    reader: B,
    repo: &R,
) -> Result<usize, ImportError> {
    import_lines(reader, "customers", |line| {
        let customer = decode_customer_line(line).map_err(ImportFailure::Decode)?;
        repo.insert(&customer).map_err(ImportFailure::Repo)?;
        Ok(())
    })
}

/// Imports voucher lines and returns how many were inserted.
pub fn import_vouchers<B: BufRead, R: VoucherRepository + ?Sized>(
    reader: B,
    repo: &R,
) -> Result<usize, ImportError> {
    import_lines(reader, "vouchers", |line| {
        let voucher = decode_voucher_line(line).map_err(ImportFailure::Decode)?;
        repo.insert(&voucher).map_err(ImportFailure::Repo)?;
        Ok(())
    })
}

enum ImportFailure {
    Decode(CodecError),
    Repo(RepoError),
}

fn import_lines<B: BufRead>(
    reader: B,
    target: &'static str,
    mut insert_line: impl FnMut(&str) -> Result<(), ImportFailure>,
) -> Result<usize, ImportError> {
    let mut imported = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let line_number = index + 1;
        if let Err(failure) = insert_line(&line) {
            warn!(
                "event=import module=import status=error target={target} line={line_number} imported={imported}"
            );
            return Err(match failure {
                ImportFailure::Decode(source) => ImportError::Decode {
                    line: line_number,
                    source,
                },
                ImportFailure::Repo(source) => ImportError::Repo {
                    line: line_number,
                    source,
                },
            });
        }
        imported += 1;
    }

    info!("event=import module=import status=ok target={target} imported={imported}");
    Ok(imported)
}
