/// Affine3D Renderer - static views of transformed cubes
///
/// Usage: affine3d-render [scaling|rotation|boxes|camera] [--output PATH] [--no-image] [--size WxH] [--no-terminal]
///
/// The matrices of each scene are logged at `info`; set `RUST_LOG` to change that.
use std::process::ExitCode;

use affine3d_render::{RenderOptions, USAGE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let options = match RenderOptions::from_args(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match affine3d_render::run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
