use clap::{Arg, Command};
use std::path::PathBuf;
use std::process;

use geoprocess::{convert, write_geojson_pretty};

fn main() {
    let matches = Command::new("geoprocess")
        .version("0.1")
        .about("Converts geometry files (KML, GeoJSON) to GeoJSON")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .num_args(1)
                .required(true)
                .help("Input geometry file (KML or GeoJSON)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .num_args(1)
                .required(true)
                .help("Output GeoJSON file"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .num_args(0..=1)
                .default_missing_value("2")
                .help("Pretty-print the output with the given indent width"),
        )
        .get_matches();

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output = PathBuf::from(matches.get_one::<String>("output").unwrap());

    if !input.exists() {
        eprintln!("Error: File not found: {}", input.display());
        process::exit(1);
    }

    let collection = match convert(&input, &output) {
        Ok(collection) => collection,
        Err(e) => {
            eprintln!("Error processing file: {e}");
            process::exit(1);
        }
    };

    // Rewrite the file pretty-printed, reusing the collection convert returned
    if let Some(indent) = matches.get_one::<String>("pretty") {
        let indent = match indent.parse::<usize>() {
            Ok(width) => width,
            Err(_) => {
                eprintln!("Error: Invalid indent width: {indent}");
                process::exit(1);
            }
        };
        if let Err(e) = write_geojson_pretty(&collection, &output, Some(indent)) {
            eprintln!("Error writing pretty output: {e}");
            process::exit(1);
        }
    }

    println!("Processing completed successfully");
}
