use duct::cmd;

pub fn test_on_host(no_clippy: bool) -> anyhow::Result<()> {
    if !no_clippy {
        cmd!("cargo", "clippy", "--workspace", "--all-targets").run()?;
    }
    cmd!("cargo", "test", "--package", "blscan-core", "--package", "blscan-cli").run()?;
    Ok(())
}
