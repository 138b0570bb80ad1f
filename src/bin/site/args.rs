use anyhow::{ensure, Result};
use clap::value_t_or_exit;
use std::path::PathBuf;
use thermal_site::{arg, args_parser};

pub struct Args {
    pub input_root: PathBuf,
    pub out_dir: PathBuf,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("thermal-site")
            .about("Build a static thermal map site from a capture directory.")
            .arg(
                arg!("input root")
                    .required(true)
                    .help("Folder with visible + radiometric captures"),
            )
            .arg(
                arg!("out dir")
                    .required(true)
                    .help("Output folder for the static site"),
            )
            .get_matches();

        let input_root = value_t_or_exit!(matches, "input root", PathBuf);
        let out_dir = value_t_or_exit!(matches, "out dir", PathBuf);

        ensure!(
            input_root.exists(),
            "input not found: {}",
            input_root.display()
        );

        Ok(Args {
            input_root,
            out_dir,
        })
    }
}
