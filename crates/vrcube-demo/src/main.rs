mod cli;

use anyhow::Result;
use clap::Parser;

use vrcube_app::CubeApp;
use vrcube_engine::device::GpuInit;
use vrcube_engine::logging::init_logging;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logging_config());

    let config = cli.app_config();
    log::info!(
        "starting {} window(s), {:?} colors, {:?}",
        cli.windows,
        config.scene.color_scheme,
        config.scene.render_mode
    );

    CubeApp::new(config).run(cli.runtime_config(), GpuInit::default())
}
