//! Simple command that prints one or '-n count' identifiers minted from an in-process authority
//!
//! Set `RUST_LOG=dayseq=debug` to watch segment renewals.

use std::sync::atomic::{AtomicI64, Ordering};
use std::{env, io, io::Write, process::ExitCode};

use dayseq::{AuthorityError, RenewalRequest, RenewalResponse, SegmentCache, SegmentConfig};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let count = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(opt) => opt.unwrap_or(1),
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} [-n count]",
                    program.as_deref().unwrap_or("dayseq")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let next = AtomicI64::new(1);
    let authority = move |req: &RenewalRequest| {
        let step = i64::from(req.step);
        let start = next.fetch_add(step, Ordering::Relaxed);
        Ok::<_, AuthorityError>(RenewalResponse {
            range_start: start,
            range_end: start + step - 1,
        })
    };
    let cache = match SegmentCache::with_config(authority, SegmentConfig::compact()) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("Error: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..count {
        match cache.generate_id("demo", "order", "ORD") {
            Ok(id) => writeln!(buf, "{}", id)?,
            Err(err) => {
                eprintln!("Error: {}", err);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<usize>, String> {
    let mut count = None;
    while let Some(arg) = args.next() {
        if arg != "-n" {
            return Err(format!("unrecognized argument '{}'", arg));
        }
        if count.is_some() {
            return Err("option 'n' given more than once".to_owned());
        }
        let Some(n_arg) = args.next() else {
            return Err("argument to option 'n' missing".to_owned());
        };
        let Ok(c) = n_arg.parse() else {
            return Err(format!("invalid argument to option 'n': '{}'", n_arg));
        };
        count.replace(c);
    }
    Ok(count)
}
