//! Reflect Schema CLI
//!
//! Command-line interface for generating JSON Schemas from type catalogs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use reflect_schema::{
    load_catalog, load_overrides, reflect, ReflectOptions, Shape, TypeExpr, TypeId, DRAFT_04,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reflect-schema")]
#[command(about = "Generate JSON Schemas from type catalogs")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reflect a type from a catalog into a schema
    Reflect {
        /// Catalog file (JSON)
        catalog: PathBuf,

        /// Root type, `Name` or `namespace.Name`
        #[arg(long)]
        root: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Emit additionalProperties: true on record objects
        #[arg(long)]
        allow_additional_properties: bool,

        /// Take requiredness from the `required` annotation keyword
        #[arg(long)]
        required_from_annotations: bool,

        /// Inline the root type instead of referencing it
        #[arg(long)]
        expand_top_level: bool,

        /// Inline every record; emit no definitions
        #[arg(long)]
        do_not_reference: bool,

        /// Qualify definition names with the type namespace
        #[arg(long)]
        fully_qualify_names: bool,

        /// Type to leave out of the schema (repeatable)
        #[arg(long = "ignore", value_name = "TYPE")]
        ignored: Vec<String>,

        /// Annotation override file (JSON)
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// `$schema` URI for the root document
        #[arg(long, default_value = DRAFT_04)]
        schema_version: String,
    },

    /// List the types declared in a catalog
    Types {
        /// Catalog file (JSON)
        catalog: PathBuf,
    },
}

struct ReflectArgs {
    catalog: PathBuf,
    root: String,
    output: Option<PathBuf>,
    pretty: bool,
    options: ReflectOptions,
    ignored: Vec<String>,
    overrides: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so schema output on stdout stays clean.
    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,reflect_schema={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Reflect {
            catalog,
            root,
            output,
            pretty,
            allow_additional_properties,
            required_from_annotations,
            expand_top_level,
            do_not_reference,
            fully_qualify_names,
            ignored,
            overrides,
            schema_version,
        } => run_reflect(ReflectArgs {
            catalog,
            root,
            output,
            pretty,
            options: ReflectOptions::new()
                .version(schema_version)
                .allow_additional_properties(allow_additional_properties)
                .required_from_annotations(required_from_annotations)
                .expand_top_level(expand_top_level)
                .do_not_reference(do_not_reference)
                .fully_qualify_names(fully_qualify_names),
            ignored,
            overrides,
        }),

        Commands::Types { catalog } => run_types(&catalog),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_reflect(args: ReflectArgs) -> Result<(), u8> {
    let ReflectArgs {
        catalog: catalog_path,
        root,
        output,
        pretty,
        mut options,
        ignored,
        overrides,
    } = args;

    let catalog = load_catalog(&catalog_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    for name in &ignored {
        options = options.ignore_type(TypeId::parse(name));
    }
    if let Some(path) = overrides {
        let table = load_overrides(&path, &catalog).map_err(|e| {
            eprintln!("Error loading overrides: {}", e);
            e.exit_code() as u8
        })?;
        options = options.overrides(table);
    }

    let root = TypeExpr::Named(TypeId::parse(&root));
    let schema = reflect(&catalog, &root, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&schema)
    } else {
        serde_json::to_string(&schema)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    write_output(output.as_deref(), &json_output)
}

fn run_types(catalog_path: &Path) -> Result<(), u8> {
    let catalog = load_catalog(catalog_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    for def in catalog.iter() {
        let shape = match &def.shape {
            Shape::Struct(fields) => format!("struct ({} fields)", fields.len()),
            Shape::Alias(target) => format!("alias of {}", target),
        };
        let capabilities = def.capabilities.names();
        if capabilities.is_empty() {
            println!("{}: {}", def.id, shape);
        } else {
            println!("{}: {} [{}]", def.id, shape, capabilities.join(", "));
        }
    }
    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), u8> {
    match path {
        Some(path) => std::fs::write(path, content).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        }),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
