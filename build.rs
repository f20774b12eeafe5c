//! Build script rendering manual pages for `qrtransit` and its subcommands.

use std::{fs, path::Path};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[allow(dead_code, reason = "only the command definition is needed here")]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn render(cmd: clap::Command, page_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = Vec::new();
    Man::new(cmd).render(&mut page)?;
    fs::write(page_path, page)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = Path::new(MAN_DIR);
    fs::create_dir_all(out_dir)?;

    // `qrtransit-encode.1` and siblings, then `qrtransit.1`.
    let cmd = cli::Cli::command();
    let bin = cmd.get_name().to_owned();
    for sub in cmd.get_subcommands() {
        let page_path = out_dir.join(format!("{bin}-{}.1", sub.get_name()));
        render(sub.clone(), &page_path)?;
    }
    render(cmd, &out_dir.join(format!("{bin}.1")))
}
