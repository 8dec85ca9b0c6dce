use std::process::ExitCode;

use penumbra::{cli, render::Renderer, scenes};

fn main() -> ExitCode {
    // Parsing cli args
    let cli_args = cli::parse_args();

    env_logger::Builder::new()
        .filter_level(cli_args.verbosity.log_level_filter())
        .init();

    // Get scene
    let (scene, mut camera) = scenes::get_scene(cli_args.scene);
    let scene = scene
        .with_max_depth(cli_args.max_depth)
        .with_russian_roulette(cli_args.russian_roulette);
    if let Some(fov) = cli_args.fov {
        camera.fov = fov;
    }

    let mut renderer = Renderer::new(
        cli_args.image_width,
        cli_args.image_height,
        cli_args.samples_per_pixel,
    );
    if let Some(threads) = cli_args.threads {
        renderer = renderer.with_threads(threads);
    }
    if let Some(seed) = cli_args.seed {
        renderer = renderer.with_seed(seed);
    }

    let framebuffer = renderer.render(&scene, &camera);

    // write image to file
    match framebuffer.save(&cli_args.output) {
        Ok(()) => {
            println!("Image written to {:?}", &cli_args.output);
            ExitCode::SUCCESS
        }
        Err(why) => {
            log::error!("Failed to write {:?}: {}", &cli_args.output, why);
            ExitCode::FAILURE
        }
    }
}
