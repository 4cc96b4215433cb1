//! Line-oriented commands for the interactive shell.
//!
//! ```text
//! insert <table> <value> <value> ...
//! select <table> <low> <high>        range select
//! select <table> <value>             exact-match select
//! join <table> <table> <left>=<right> [<table> <left>=<right> ...]
//! aggregate <table> <min|max|count|avg> <field>
//! tables
//! ```

use miette::{Result, miette};

use crate::Selection;

pub(crate) use keyword::Keyword;

pub(crate) mod keyword;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Insert {
        table: String,
        /// Everything after the table name, passed on untouched.
        values: String,
    },
    Select {
        table: String,
        selection: Selection,
    },
    Join {
        tables: Vec<String>,
        on: Vec<(String, String)>,
    },
    Aggregate {
        table: String,
        operation: String,
        field: String,
    },
    Tables,
}

/// Splits off the first whitespace-delimited word.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn expect_table(rest: &str) -> Result<(&str, &str)> {
    let (table, rest) = next_word(rest);
    if table.is_empty() {
        return Err(miette!("Expected a table name"));
    }
    Ok((table, rest))
}

pub(crate) fn parse_command(input: &str) -> Result<Command> {
    let (word, rest) = next_word(input);
    if word.is_empty() {
        return Err(miette!("Empty command"));
    }

    let keyword: Keyword = word
        .parse()
        .map_err(|_| miette!("Unknown command: {word}"))?;

    match keyword {
        Keyword::Insert => {
            let (table, values) = expect_table(rest)?;
            Ok(Command::Insert {
                table: table.to_string(),
                values: values.trim_end().to_string(),
            })
        }
        Keyword::Select => {
            let (table, rest) = expect_table(rest)?;
            let args: Vec<&str> = rest.split_whitespace().collect();
            Ok(Command::Select {
                table: table.to_string(),
                selection: parse_selection(&args)?,
            })
        }
        Keyword::Join => parse_join(rest),
        Keyword::Aggregate => {
            let (table, rest) = expect_table(rest)?;
            let args: Vec<&str> = rest.split_whitespace().collect();
            let [operation, field] = args.as_slice() else {
                return Err(miette!(
                    "Expected: aggregate <table> <operation> <field>, got {} argument(s)",
                    args.len()
                ));
            };
            Ok(Command::Aggregate {
                table: table.to_string(),
                operation: operation.to_string(),
                field: field.to_string(),
            })
        }
        Keyword::Tables => {
            if !rest.trim().is_empty() {
                return Err(miette!("tables takes no arguments"));
            }
            Ok(Command::Tables)
        }
    }
}

fn parse_selection(args: &[&str]) -> Result<Selection> {
    match args {
        [value] => Ok(Selection::equals(*value)),
        [low, high] => {
            let parse = |raw: &str| {
                raw.parse::<f64>()
                    .map_err(|_| miette!("Range bound '{raw}' is not a number"))
            };
            Ok(Selection::range(parse(*low)?, parse(*high)?))
        }
        _ => Err(miette!(
            "Expected one value or two range bounds, got {} argument(s)",
            args.len()
        )),
    }
}

fn parse_join(rest: &str) -> Result<Command> {
    let args: Vec<&str> = rest.split_whitespace().collect();
    let Some((first, pairs)) = args.split_first() else {
        return Err(miette!("JOIN requires at least two tables"));
    };
    if pairs.is_empty() || pairs.len() % 2 != 0 {
        return Err(miette!(
            "Expected: join <table> <table> <left>=<right> [<table> <left>=<right> ...]"
        ));
    }

    let mut tables = vec![first.to_string()];
    let mut on = Vec::new();
    for chunk in pairs.chunks(2) {
        let (table, condition) = (chunk[0], chunk[1]);
        let Some((left, right)) = condition.split_once('=') else {
            return Err(miette!("Expected <left>=<right>, found '{condition}'"));
        };
        if left.is_empty() || right.is_empty() {
            return Err(miette!("Join condition '{condition}' is missing a field"));
        }

        tables.push(table.to_string());
        on.push((left.to_string(), right.to_string()));
    }

    Ok(Command::Join { tables, on })
}
