//! jobsh entry point.
//!
//! Launch the interactive shell:
//! ```bash
//! cargo run -p jobsh-repl
//! ```

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never mix with job output (RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let status = jobsh_repl::run()?;
    std::process::exit(status)
}
