mod args;

use std::fs;

use anyhow::Result;
use thermal_site::build_site;

use crate::args::Args;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;

    // The output tree is rebuilt from scratch on every run.
    if args.out_dir.exists() {
        fs::remove_dir_all(&args.out_dir)?;
    }

    let stats = build_site(&args.input_root, &args.out_dir)?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    eprintln!("Done. Open {}", args.out_dir.join("index.html").display());
    Ok(())
}
