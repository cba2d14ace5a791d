use std::net::SocketAddr;

use axum::Router;
use tower_http::services::ServeDir;

use crate::{ServeArgs, build::Builder, config::SiteConfig};

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let config = SiteConfig::load_from_arg(args.config_file.as_deref())?;
    let base_path = std::env::current_dir()?;

    println!("Building site...");
    println!();

    let builder = Builder::new(config.clone(), base_path.clone());
    let report = builder.build()?;

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }

    if !report.succeeded() {
        anyhow::bail!(
            "server not started: build completed with {} error(s)",
            report.errors.len()
        );
    }

    let output_dir = if config.paths.output.is_relative() {
        base_path.join(&config.paths.output)
    } else {
        config.paths.output.clone()
    };

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    println!();
    println!("Starting server at http://localhost:{}", args.port);
    println!("Press Ctrl+C to stop.");

    if args.open {
        let _ = open::that(format!("http://localhost:{}", args.port));
    }

    let app = Router::new().fallback_service(ServeDir::new(&output_dir));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
