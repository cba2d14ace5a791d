use crate::{BuildArgs, build::Builder, config::SiteConfig};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config = SiteConfig::load_from_arg(args.config_file.as_deref())?;
    let base_path = std::env::current_dir()?;

    println!("Building site...");
    println!();

    let builder = Builder::new(config, base_path);
    let report = builder.build()?;

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }

    println!();
    if !report.succeeded() {
        anyhow::bail!("build completed with {} error(s)", report.errors.len());
    }

    println!(
        "Done! Built {} post(s) and {} page(s) across {} language(s).",
        report.posts, report.pages, report.languages
    );

    Ok(())
}
