use crate::{CleanArgs, config::SiteConfig};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config = SiteConfig::load_from_arg(args.config_file.as_deref())?;
    let base_path = std::env::current_dir()?;

    let output_dir = if config.paths.output.is_relative() {
        base_path.join(&config.paths.output)
    } else {
        config.paths.output.clone()
    };

    if output_dir.exists() {
        if args.dry_run {
            println!("Would delete {}", output_dir.display());
        } else {
            tokio::fs::remove_dir_all(&output_dir).await?;
            println!("Deleted {}", output_dir.display());
        }
    } else {
        println!("Nothing to clean.");
    }

    Ok(())
}
