use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

/// Strip whitespace and a leading "@" from a handle as typed by a person.
pub fn normalize_handle(input: &str) -> Result<String> {
    let handle = input.trim();
    let handle = handle.strip_prefix('@').unwrap_or(handle).trim();
    if handle.is_empty() {
        bail!("Username must not be empty");
    }
    Ok(handle.to_string())
}

pub fn parse_count(input: &str) -> Result<usize> {
    let input = input.trim();
    input
        .parse()
        .with_context(|| format!("'{}' is not a number of tweets", input))
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("No input given");
    }
    Ok(line)
}

pub fn ask_handle<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    let line = ask(
        input,
        output,
        "Which user's tweets do you want to retrieve? ex. @nikkei -> nikkei: ",
    )?;
    normalize_handle(&line)
}

pub fn ask_count<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<usize> {
    let line = ask(
        input,
        output,
        "How many tweets do you want to retrieve? (min=5): ",
    )?;
    parse_count(&line)
}
