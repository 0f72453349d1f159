//! Stream row blocks out of a backed sparse matrix
//!
//! ```text
//! cargo run --example backed_rows -- pbmc3k.zarr X 0:100 100:200
//! ```

use std::error::Error;

use annread::{parse_range, read, ReadOptions, Value};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: backed_rows <store> <element> [range...]")?;
    let element = args.next().unwrap_or_else(|| "X".to_string());
    let ranges: Vec<String> = args.collect();

    let options = ReadOptions::new()
        .with_backed(true)
        .with_slot("matrix", &element)?;
    let mut record = read(&path, &options)?;

    let handle = match record.get("matrix") {
        Some(Value::Handle(handle)) => handle,
        Some(other) => return Err(format!("{element} is {}, not sparse", other.kind_name()).into()),
        None => return Err(format!("{element} not found in {path}").into()),
    };
    let (rows, cols) = handle.shape();
    println!(
        "{element}: {rows}x{cols} {} {} nnz={}",
        handle.format(),
        handle.dtype(),
        handle.nnz()
    );

    let ranges = if ranges.is_empty() {
        vec![format!("0:{}", rows.min(10))]
    } else {
        ranges
    };
    for text in &ranges {
        let range = parse_range(text, rows)?;
        let block = handle.read_rows(range.clone())?;
        let touched = handle.as_backed().map_or(0, |b| b.elements_read());
        println!(
            "rows {:>6}..{:<6} nnz={:<8} elements read so far={touched}",
            range.start,
            range.end,
            block.nnz()
        );
    }

    record.close()?;
    Ok(())
}
