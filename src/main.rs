use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use lucene_filter::{introspect, Config, FieldInfo, InMemoryCatalog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Time allowed for reading a catalog snapshot
const CATALOG_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    /// PostgreSQL fragment with $n placeholders
    Sql,
    /// PartiQL fragment with ? placeholders
    Partiql,
    /// Nested JSON map of the parsed query
    Map,
}

#[derive(Parser, Debug)]
#[command(name = "lucene-filter")]
#[command(about = "Translate a Lucene query into a parameterized filter", long_about = None)]
struct Args {
    /// Lucene query string
    query: String,

    /// Directory containing lucene-filter.toml and .env
    #[arg(long, default_value = ".")]
    config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Target::Sql)]
    target: Target,

    /// Extra field: name[:json][:default|:nodefault] (repeatable)
    #[arg(long = "field")]
    fields: Vec<FieldInfo>,

    /// JSON column catalog snapshot to derive fields from
    #[arg(long, requires = "table")]
    catalog: Option<PathBuf>,

    /// Table to look up in the catalog snapshot
    #[arg(long, requires = "catalog")]
    table: Option<String>,

    /// Override the maximum query length in bytes
    #[arg(long)]
    max_query_length: Option<usize>,

    /// Override the maximum nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Override the maximum number of terms
    #[arg(long)]
    max_terms: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lucene_filter=info,lucene_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(&args.config)?;
    if let Some(max) = args.max_query_length {
        config.limits.max_query_length = max;
    }
    if let Some(max) = args.max_depth {
        config.limits.max_depth = max;
    }
    if let Some(max) = args.max_terms {
        config.limits.max_terms = max;
    }
    config.fields.extend(args.fields);

    let parser = match (&args.catalog, &args.table) {
        (Some(path), Some(table)) => {
            let catalog = InMemoryCatalog::from_json(&std::fs::read_to_string(path)?)?;
            let introspected = introspect(&catalog, table, CATALOG_TIMEOUT).await?;
            // Configured fields refine the introspected ones
            let mut fields: Vec<FieldInfo> = introspected.iter().cloned().collect();
            fields.extend(config.fields.iter().cloned());
            config.query_parser_for(fields.into())
        }
        _ => config.query_parser(),
    };
    tracing::debug!("Translating with {} known fields", parser.registry().len());

    let output = match args.target {
        Target::Sql => serde_json::to_value(parser.parse_to_sql(&args.query)?)?,
        Target::Partiql => serde_json::to_value(parser.parse_to_partiql(&args.query)?)?,
        Target::Map => parser.parse_to_map(&args.query)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
