mod bootstrap;

use activity_core::settings::Settings;
use activity_data::analysis::run_analysis;
use anyhow::Result;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("gh-activity v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Source: dir={:?}, file={:?}, top={}",
        settings.dir,
        settings.file,
        settings.top
    );

    let report = run_analysis(&settings)?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
