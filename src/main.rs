//! db-xl-dump - export database tables, views and queries to XLSX.

use db_xl_dump::cli::{prompt_password, Cli};
use db_xl_dump::config::Settings;
use db_xl_dump::db::DriverConnector;
use db_xl_dump::error::Result;
use db_xl_dump::export::Exporter;
use db_xl_dump::logging::init_logging;
use tracing::{debug, error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();

    let mut settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(cli.debug);
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    };
    init_logging(settings.debug);
    if let Some(path) = &settings.config_file {
        debug!("Loaded config from {}", path.display());
    }

    if let Err(e) = run(&mut settings).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(settings: &mut Settings) -> Result<()> {
    debug!("Settings: {:?}", settings);
    settings.validate()?;

    if settings.descriptor.needs_password() {
        settings.descriptor.password = prompt_password()?;
    }

    debug!("Export targets: {}", settings.targets.len());
    for (i, target) in settings.targets.iter().enumerate() {
        debug!("[{}]: {}", i, target);
    }

    let connector = DriverConnector;
    let report = Exporter::new(&connector, &settings.descriptor)
        .with_headers(settings.headers)
        .run(&settings.targets, &settings.output)
        .await?;

    println!("Created file: {}", report.output.display());

    let summary = format!("{}/{} targets exported", report.sheets.len(), report.total());
    if report.is_complete() {
        info!("{}", summary);
    } else {
        warn!("{}", summary);
    }

    Ok(())
}
