//! Inspect the encodings of an AnnData container and read selected slots
//!
//! ```text
//! cargo run --example inspect_slots -- pbmc3k.zarr --slot X=layers/counts --backed
//! RUST_LOG=annread=debug cargo run --example inspect_slots -- pbmc3k.zarr
//! ```

use std::error::Error;
use std::path::PathBuf;

use annread::{encoding_of, open_container, read, ReadOptions, Value};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "Partial reads of .h5ad and .zarr containers")]
struct Args {
    /// Container to read
    path: PathBuf,

    /// Keep sparse matrices on disk and read rows on demand
    #[arg(long)]
    backed: bool,

    /// Encoding tags to convert to CSR, comma separated
    #[arg(long, default_value = "")]
    force_sparse: String,

    /// Slot to read as NAME=PATH, repeatable
    #[arg(long = "slot", value_name = "NAME=PATH")]
    slots: Vec<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("annread=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn describe(value: &Value) -> String {
    match value.shape() {
        Some((rows, cols)) => format!("{} {rows}x{cols}", value.kind_name()),
        None => value.kind_name().to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    let opened = open_container(&args.path)?;
    println!("{} ({})", args.path.display(), opened.format);
    for child in opened.container.children("")? {
        let encoding = encoding_of(opened.container.as_ref(), &child)?;
        let version = encoding.version.as_deref().unwrap_or("-");
        println!("  {child:<12} {:<18} {version}", encoding.kind);
    }
    opened.container.close()?;

    let mut options = ReadOptions::new()
        .with_backed(args.backed)
        .with_force_sparse_tags(&args.force_sparse);
    for slot in &args.slots {
        let (name, path) = slot
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH, got {slot:?}"))?;
        options = options.with_slot(name, path)?;
    }

    let mut record = read(&args.path, &options)?;
    println!("read {} slot(s)", record.len());
    for name in record.names() {
        match record.get(name) {
            Some(value) => println!("  {name:<12} {}", describe(value)),
            None => println!("  {name:<12} null"),
        }
    }
    for diagnostic in record.diagnostics().iter() {
        println!("  warning: {diagnostic}");
    }
    record.close()?;
    Ok(())
}
