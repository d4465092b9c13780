use clap::Subcommand;
use duct::cmd;

#[derive(Subcommand)]
pub enum Fuzz {
    /// Run BLS type #1 parser
    Bls,

    /// Run GRUB environment block parser
    Grubenv,
}

pub fn fuzz_parsers(command: Fuzz) -> anyhow::Result<()> {
    let mut args = vec!["fuzz", "run"];
    match command {
        Fuzz::Bls => args.push("bls"),
        Fuzz::Grubenv => args.push("grubenv"),
    }

    cmd!("cargo", "install", "cargo-fuzz").run()?; // will not install if its already installed
    cmd("cargo", args).run()?;
    Ok(())
}
