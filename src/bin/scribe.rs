use std::io::{BufRead, Write, stdin, stdout};

use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scribe_db::{Catalog, QueryResponse, StoreConfig};

fn main() -> Result<()> {
    init_logging();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let config = StoreConfig::from_env();
    info!(data_directory = %config.data_directory.display(), "opening tables");
    let mut catalog = Catalog::with_default_tables(&config)?;

    println!("Tables: {:?}", catalog.table_names().collect::<Vec<_>>());

    let mut buf = String::new();

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    loop {
        stdout.write_all(b"DB: ").into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        buf.clear();
        if stdin.read_line(&mut buf).into_diagnostic()? == 0 {
            break;
        }

        let input = buf.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        match catalog.execute_command(input) {
            Ok(response) => print_response(&mut stdout, &response)?,
            Err(err) => println!("{:?}", err.with_source_code(input.to_string())),
        }
    }

    println!("Exiting Scribe");

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scribe_db=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_response(out: &mut impl Write, response: &QueryResponse) -> Result<()> {
    write!(out, "{: <8}", "Results").into_diagnostic()?;
    for column in &response.columns {
        write!(out, " | {: <8}", column).into_diagnostic()?;
    }
    writeln!(out).into_diagnostic()?;

    for (idx, row) in response.rows.iter().enumerate() {
        write!(out, "{: <8}", idx).into_diagnostic()?;
        for value in row {
            write!(out, " | {: <8}", value).into_diagnostic()?;
        }
        writeln!(out).into_diagnostic()?;
    }

    out.flush().into_diagnostic()
}
