use duct::cmd;

pub fn run_cli(root: &str, json: bool) -> anyhow::Result<()> {
    let mut run_args = vec!["run", "--bin", "blscan", "--", "--verbose"];

    if json {
        run_args.push("--json");
    }
    run_args.push(root);

    cmd("cargo", run_args).run()?;
    Ok(())
}
