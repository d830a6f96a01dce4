//! Example: Compare two XML documents
//!
//! This example compares an expected document with an actual one and prints
//! every difference, optionally pairing elements by a key expression.
//!
//! Usage: cargo run --example compare <expected.xml> <actual.xml> [element=key ...]

use std::env;

use xmlcmp::xml::parse_file;
use xmlcmp::{XmlComparator, XmlComparisonSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <expected.xml> <actual.xml> [element=key ...]", args[0]);
        std::process::exit(1);
    }

    let mut settings = XmlComparisonSettings::default();
    for key in &args[3..] {
        let (element, expression) = key
            .split_once('=')
            .ok_or_else(|| format!("key must look like element=expression: {}", key))?;
        settings.add_key_expression(element, expression)?;
    }

    eprintln!("Parsing expected: {}", args[1]);
    let expected = parse_file(&args[1])?;

    eprintln!("Parsing actual: {}", args[2]);
    let actual = parse_file(&args[2])?;

    let comparator = XmlComparator::new(settings);
    let diff = comparator.compare(&expected, &actual);
    println!("{}", comparator.report(&diff));

    if !diff.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
