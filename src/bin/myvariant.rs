// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! myvariant CLI
//!
//! Command-line client for the MyVariant.info annotation service.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::util::SubscriberInitExt;

use ferro_myvariant::batch::QueryInput;
use ferro_myvariant::cli::{
    output_error, read_terms, write_json, write_outcome, write_results, OutputFormat, TableMode,
};
use ferro_myvariant::client::{HttpTransport, MyVariantClient, QueryOptions};
use ferro_myvariant::hgvs::format_hgvs;
use ferro_myvariant::scroll::ScrollEvent;
use ferro_myvariant::vcf::hgvs_from_vcf;
use ferro_myvariant::{FerroError, SessionConfig};

#[derive(Parser)]
#[command(name = "myvariant")]
#[command(author, version, about = "Batch client for the MyVariant.info annotation service")]
#[command(
    long_about = "Query MyVariant.info by HGVS id or search term, in batches.

Examples:
  myvariant hgvs 1 35366 C T
  myvariant hgvs --vcf calls.vcf.gz
  myvariant get 'chr9:g.107620835G>A' --fields cadd.phred
  myvariant getmany --vcf calls.vcf.gz --format tsv
  myvariant querymany rs58991260 rs2500 --scopes dbsnp.rsid --return-all
  myvariant query 'chr1:69500-70000' --all --format jsonl"
)]
struct Cli {
    /// Session configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL (overrides the configuration file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Log filter, e.g. "info" or "ferro_myvariant=debug"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output format: json, jsonl, or tsv
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,

    /// Table layout for tsv output: normal or by-source
    #[arg(long, global = true, default_value = "normal")]
    table_mode: TableMode,

    /// Do not move the query column to the front of tsv output
    #[arg(long, global = true)]
    no_index: bool,

    /// Cache responses for the duration of the run
    #[arg(long, global = true)]
    cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert VCF-style variants to genomic HGVS ids
    Hgvs {
        /// Chromosome, position, reference and alternate allele
        #[arg(num_args = 4, value_names = ["CHROM", "POS", "REF", "ALT"])]
        variant: Vec<String>,

        /// Convert every alternate allele in a VCF file instead
        #[arg(long, conflicts_with = "variant")]
        vcf: Option<PathBuf>,
    },

    /// Look up a single variant by HGVS id
    Get {
        id: String,

        /// Fields to return (comma-separated)
        #[arg(long)]
        fields: Option<String>,
    },

    /// Look up many variants by HGVS id
    Getmany {
        /// Ids; read from --input or --vcf when omitted
        ids: Vec<String>,

        /// File with one id per line (use - for stdin)
        #[arg(short, long, conflicts_with = "vcf")]
        input: Option<PathBuf>,

        /// Look up every alternate allele of a VCF file
        #[arg(long)]
        vcf: Option<PathBuf>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Run a search query
    Query {
        q: String,

        /// Fields to return (comma-separated)
        #[arg(long)]
        fields: Option<String>,

        /// Maximum number of hits
        #[arg(long)]
        size: Option<u32>,

        /// Number of hits to skip
        #[arg(long)]
        skip: Option<u32>,

        /// Sort order, e.g. "-cadd.phred"
        #[arg(long)]
        sort: Option<String>,

        /// Stream every hit by following the scroll cursor
        #[arg(long)]
        all: bool,
    },

    /// Search for many terms
    Querymany {
        /// Terms; read from --input when omitted
        terms: Vec<String>,

        /// File with one term per line (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Fields to match the terms against (comma-separated)
        #[arg(long)]
        scopes: Option<String>,

        /// Report duplicate and missing terms with the results
        #[arg(long)]
        return_all: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Show service metadata
    Metadata,

    /// List available annotation fields
    Fields {
        /// Only fields matching this term
        search: Option<String>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Output path
        #[arg(default_value = "myvariant.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Fields to return (comma-separated)
    #[arg(long)]
    fields: Option<String>,

    /// Terms per request (at most the session step)
    #[arg(long)]
    step: Option<usize>,

    /// Print raw response bodies
    #[arg(long)]
    raw: bool,

    /// Suppress batch progress logging
    #[arg(short, long)]
    quiet: bool,
}

impl BatchArgs {
    fn options(&self, cli: &Cli) -> QueryOptions {
        let mut opts = output_options(cli).verbose(!self.quiet).raw(self.raw);
        if let Some(fields) = &self.fields {
            opts = opts.fields(fields.as_str());
        }
        if let Some(step) = self.step {
            opts = opts.step(step);
        }
        opts
    }
}

/// Options carrying the table layout chosen on the command line
fn output_options(cli: &Cli) -> QueryOptions {
    let opts = QueryOptions::new().index_by_query(!cli.no_index);
    if cli.format == OutputFormat::Tsv {
        opts.table(cli.table_mode)
    } else {
        opts
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &cli.command {
        Commands::Hgvs { variant, vcf } => run_hgvs(&mut out, variant, vcf.as_deref())?,
        Commands::InitConfig { output, force } => init_config(output, *force)?,
        command => {
            let client = build_client(&cli)?;
            run_service_command(&cli, command, &client, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SessionConfig, FerroError> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            SessionConfig::from_file(path)?
        }
        None => SessionConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if cli.cache {
        config.cache.enabled = true;
    }
    config.validate()?;
    Ok(config)
}

fn build_client(cli: &Cli) -> Result<MyVariantClient<HttpTransport>, FerroError> {
    MyVariantClient::with_config(load_config(cli)?)
}

fn init_config(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            output.display()
        )
        .into());
    }
    SessionConfig::default().to_file(output)?;
    eprintln!("Wrote default configuration to {}", output.display());
    Ok(())
}

fn run_hgvs<W: Write>(
    out: &mut W,
    variant: &[String],
    vcf: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = vcf {
        let mut failed = 0usize;
        for id in hgvs_from_vcf(path)? {
            match id {
                Ok(id) => writeln!(out, "{}", id)?,
                Err(e) => {
                    failed += 1;
                    output_error(&mut io::stderr(), &path.display().to_string(), &e)?;
                }
            }
        }
        if failed > 0 {
            warn!("{} records could not be converted", failed);
        }
        return Ok(());
    }

    let [chrom, pos, reference, alternate] = variant else {
        return Err("expected CHROM POS REF ALT or --vcf".into());
    };
    let pos: u64 = pos
        .parse()
        .map_err(|_| FerroError::malformed(format!("invalid position '{}'", pos)))?;
    writeln!(out, "{}", format_hgvs(chrom, pos, reference, alternate)?)?;
    Ok(())
}

fn run_service_command<W: Write>(
    cli: &Cli,
    command: &Commands,
    client: &MyVariantClient<HttpTransport>,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Get { id, fields } => {
            let mut opts = output_options(cli);
            if let Some(fields) = fields {
                opts = opts.fields(fields.as_str());
            }
            let hit = client
                .getvariant(id, &opts)?
                .ok_or_else(|| FerroError::NotFound { id: id.clone() })?;
            write_results(out, &[hit], cli.format, &opts)?;
        }
        Commands::Getmany {
            ids,
            input,
            vcf,
            batch,
        } => {
            let source = match vcf {
                Some(path) => QueryInput::fallible(hgvs_from_vcf(path)?),
                None => term_input(ids, input.as_deref())?,
            };
            let opts = batch.options(cli);
            let outcome = client.getvariants(source, &opts)?;
            write_outcome(out, cli.format, &opts, &outcome)?;
        }
        Commands::Query {
            q,
            fields,
            size,
            skip,
            sort,
            all,
        } => {
            let mut opts = output_options(cli);
            if let Some(fields) = fields {
                opts = opts.fields(fields.as_str());
            }
            if let Some(size) = size {
                opts = opts.size(*size);
            }
            if let Some(skip) = skip {
                opts = opts.skip(*skip);
            }
            if let Some(sort) = sort {
                opts = opts.sort(sort.as_str());
            }

            if *all {
                let mut stream = client.query_all(q, &opts).with_events(|event| {
                    if let ScrollEvent::Page { number, hits, total } = event {
                        info!("page {}: {} hits of {}", number, hits, total);
                    }
                });
                let hits: Vec<_> = stream.by_ref().collect();
                if let Some(err) = stream.error() {
                    warn!("results are incomplete: {}", err);
                }
                write_results(out, &hits, cli.format, &opts)?;
            } else {
                let response = client.query(q, &opts)?;
                match cli.format {
                    OutputFormat::Json => write_json(out, &response)?,
                    _ => write_results(out, &response.hits, cli.format, &opts)?,
                }
            }
        }
        Commands::Querymany {
            terms,
            input,
            scopes,
            return_all,
            batch,
        } => {
            let mut opts = batch.options(cli).return_all(*return_all);
            if let Some(scopes) = scopes {
                opts = opts.scopes(scopes.as_str());
            }
            let outcome = client.querymany(term_input(terms, input.as_deref())?, &opts)?;
            write_outcome(out, cli.format, &opts, &outcome)?;
        }
        Commands::Metadata => write_json(out, &client.metadata()?)?,
        Commands::Fields { search } => write_json(out, &client.get_fields(search.as_deref())?)?,
        Commands::Hgvs { .. } | Commands::InitConfig { .. } => {}
    }
    Ok(())
}

fn term_input(terms: &[String], input: Option<&Path>) -> Result<QueryInput<'static>, FerroError> {
    match input {
        Some(path) if path == Path::new("-") => {
            Ok(QueryInput::fallible(read_terms(BufReader::new(io::stdin()))))
        }
        Some(path) => {
            let file = File::open(path).map_err(|e| FerroError::Io {
                msg: format!("Failed to open '{}': {}", path.display(), e),
            })?;
            Ok(QueryInput::fallible(read_terms(BufReader::new(file))))
        }
        None => Ok(QueryInput::List(terms.to_vec())),
    }
}
