// Data Sweeper - Main executable
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::{Arg, ArgMatches, Command};
use log::info;

use data_sweeper::{
    api::{Server, ServerConfig},
    data::{ingest, CsvSink, DataSet, DataSink, ExportFormat},
    processing::{describe, CleaningOptions},
    storage::{FileInfo, IngestCache, SessionStore, Upload},
    utils::{init_logging, Config},
};

fn cli() -> Command<'static> {
    Command::new("Data Sweeper")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Upload, clean, visualize and export tabular datasets")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .subcommand(
            Command::new("server")
                .about("Run the API server")
                .arg(
                    Arg::new("host")
                        .short('H')
                        .long("host")
                        .value_name("HOST")
                        .help("Sets the server host")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Sets the server port")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show file details, a preview and statistics")
                .arg(Arg::new("file").required(true).value_name("FILE")),
        )
        .subcommand(
            Command::new("clean")
                .about("Clean a file and write cleaned_data.csv and cleaned_data.xlsx")
                .arg(Arg::new("file").required(true).value_name("FILE"))
                .arg(
                    Arg::new("rename")
                        .long("rename")
                        .value_name("OLD=NEW")
                        .help("Renames a column")
                        .takes_value(true)
                        .multiple_occurrences(true),
                )
                .arg(
                    Arg::new("drop-missing")
                        .long("drop-missing")
                        .help("Drops rows with any missing value"),
                )
                .arg(
                    Arg::new("drop-duplicates")
                        .long("drop-duplicates")
                        .help("Drops repeated rows"),
                )
                .arg(
                    Arg::new("columns")
                        .long("columns")
                        .value_name("A,B,...")
                        .help("Keeps only these columns, in this order")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("lowercase")
                        .long("lowercase")
                        .value_name("COLUMN")
                        .help("Lowercases a text column")
                        .takes_value(true)
                        .multiple_occurrences(true),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Directory for the cleaned files")
                        .takes_value(true),
                ),
        )
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    // Load configuration
    let config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Error loading config file '{}'", path))?,
        None => Config::default(),
    };

    // Initialize logging
    if let Err(err) = init_logging(config.log_level_filter()) {
        eprintln!("Error initializing logger: {}", err);
    }

    match matches.subcommand() {
        Some(("server", matches)) => run_server(&config, matches).await,
        Some(("inspect", matches)) => inspect(&config, matches),
        Some(("clean", matches)) => clean(matches),
        _ => {
            println!("No subcommand specified. Use --help for usage information.");
            Ok(())
        }
    }
}

async fn run_server(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    // Override config with command line arguments
    let host = matches.value_of("host").unwrap_or(&config.server.host);
    let port = match matches.value_of("port") {
        Some(port) => port
            .parse::<u16>()
            .with_context(|| format!("Invalid port '{}'", port))?,
        None => config.server.port,
    };

    let server_config = ServerConfig {
        host: host.to_string(),
        port,
        workers: config.server.workers.unwrap_or_else(num_cpus::get),
        enable_cors: config.server.enable_cors,
        max_upload_bytes: config.server.max_upload_bytes,
        preview_rows: config.preview.rows,
    };

    let mut cache = IngestCache::new(config.cache.capacity);
    if let Some(ttl) = config.cache.ttl_secs {
        cache = cache.with_ttl(Duration::from_secs(ttl));
    }

    let mut sessions = SessionStore::new(cache).with_capacity(config.sessions.capacity);
    if let Some(ttl) = config.sessions.idle_ttl_secs {
        sessions = sessions.with_idle_ttl(Duration::from_secs(ttl));
    }

    let server = Server::new(Arc::new(sessions), server_config);
    server.run().await?;
    Ok(())
}

/// Read and parse a file from disk
fn load(path: &Path) -> anyhow::Result<(FileInfo, DataSet)> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("'{}' is not a file", path.display()))?;

    let dataset = match ingest(&bytes, &file_name)? {
        Some(dataset) => dataset,
        None => bail!("Unsupported file format!"),
    };

    let info = FileInfo::new(&Upload::new(&file_name, &bytes), &dataset);
    Ok((info, dataset))
}

fn as_csv(dataset: &DataSet) -> anyhow::Result<String> {
    let bytes = CsvSink::default().write(dataset)?;
    Ok(String::from_utf8(bytes)?)
}

fn inspect(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let path = PathBuf::from(matches.value_of("file").unwrap_or_default());
    let (info, dataset) = load(&path)?;

    println!("File Name: {}", info.name);
    println!("File Type: {}", info.mime_type);
    println!("File Size: {} KB", info.size_kb());
    println!("Rows: {}  Columns: {}", info.rows, info.columns);
    println!();

    println!("Columns:");
    for field in &dataset.schema.fields {
        println!("  {} ({})", field.name, field.data_type.as_str());
    }
    println!();

    println!("Preview:");
    print!("{}", as_csv(&dataset.head(config.preview.rows))?);
    println!();

    let summary = describe(&dataset);
    if !summary.is_empty() {
        println!("Statistics:");
        print!("{}", as_csv(&summary.to_dataset())?);
    }

    Ok(())
}

fn cleaning_options(matches: &ArgMatches) -> anyhow::Result<CleaningOptions> {
    let mut options = CleaningOptions::default();

    if let Some(renames) = matches.values_of("rename") {
        for rename in renames {
            let (old, new) = rename
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid rename '{}', expected OLD=NEW", rename))?;
            options.renames.insert(old.to_string(), new.to_string());
        }
    }

    options.drop_missing = matches.is_present("drop-missing");
    options.drop_duplicates = matches.is_present("drop-duplicates");
    options.columns = matches.value_of("columns").map(|columns| {
        columns
            .split(',')
            .map(str::trim)
            .filter(|column| !column.is_empty())
            .map(str::to_string)
            .collect()
    });
    options.lowercase = matches
        .values_of("lowercase")
        .map(|columns| columns.map(str::to_string).collect())
        .unwrap_or_default();

    Ok(options)
}

fn clean(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = PathBuf::from(matches.value_of("file").unwrap_or_default());
    let output_dir = PathBuf::from(matches.value_of("output-dir").unwrap_or("."));
    let options = cleaning_options(matches)?;

    let (info, dataset) = load(&path)?;
    let cleaned = options.apply(&dataset)?;
    info!(
        "cleaned '{}': {} rows -> {} rows, {} columns",
        info.name,
        dataset.len(),
        cleaned.len(),
        cleaned.column_count()
    );

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Cannot create '{}'", output_dir.display()))?;

    for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
        let artifact = format.render(&cleaned)?;
        let target = output_dir.join(artifact.file_name);
        fs::write(&target, &artifact.bytes)
            .with_context(|| format!("Cannot write '{}'", target.display()))?;
        println!("Wrote {}", target.display());
    }

    Ok(())
}
