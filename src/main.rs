use std::error::Error;
use std::path::PathBuf;

use argh::FromArgs;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use mazeray::prelude::*;

/// First-person maze explorer. Click the window to capture the mouse,
/// move with WASD or the arrow keys, press Escape to quit.
#[derive(FromArgs)]
struct Options {
    /// window width in pixels (default 1280)
    #[argh(option, default = "1280")]
    width: u32,

    /// window height in pixels (default 720)
    #[argh(option, default = "720")]
    height: u32,

    /// maze size in cells, must be odd (default 21)
    #[argh(option, default = "21")]
    map_size: usize,

    /// directory with wall/floor/ceiling/door and sprite*.png textures;
    /// built-in procedural textures are used when omitted
    #[argh(option)]
    assets: Option<PathBuf>,

    /// disable distance fog
    #[argh(switch)]
    no_fog: bool,

    /// disable the minimap overlay
    #[argh(switch)]
    no_minimap: bool,

    /// draw flat colors instead of textures
    #[argh(switch)]
    no_textures: bool,

    /// verbose logging
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let options: Options = argh::from_env();

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let textures = match &options.assets {
        Some(dir) => {
            info!("loading textures from {}", dir.display());
            TextureSet::load_dir(dir)?
        }
        None => {
            info!("using built-in textures");
            TextureSet::builtin()
        }
    };

    let render_options = RenderOptions {
        textures: !options.no_textures,
        fog: !options.no_fog,
        minimap: !options.no_minimap,
    };

    let mut window = Window::new("mazeray", options.width, options.height)?;
    let mut engine = Engine::new(
        options.width,
        options.height,
        options.map_size,
        textures,
        render_options,
    )?;

    let mut input = InputState::default();
    let mut limiter = FrameLimiter::new(&window);

    loop {
        if window.poll_events(&mut input) == WindowEvent::Quit {
            break;
        }

        let delta_time = limiter.wait_and_get_delta(&window);
        engine.update(&mut input, delta_time);
        engine.render(delta_time);
        window.present(engine.frame_buffer().as_bytes())?;
    }

    info!("shutting down");
    Ok(())
}
