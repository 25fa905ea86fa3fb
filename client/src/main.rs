use clap::Parser;
use client::game::ClientPredictor;
use client::input::{InputSource, KeyBindings, KeyboardInput};
use client::network;
use client::rendering::Renderer;
use env_logger::Env;
use log::{error, info, warn};
use macroquad::prelude::*;
use shared::{Side, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Player to control: 1 plays the left paddle with W/S, anything else the
    /// right paddle with the arrow keys
    #[arg(default_value_t = 1)]
    player_id: u32,

    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Netcode Pong".to_owned(),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if Side::from_player_id(args.player_id).is_none() {
        warn!(
            "Player id {} owns no paddle on the server; inputs will be ignored",
            args.player_id
        );
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start network runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut predictor = ClientPredictor::new(args.player_id);

    let session = match runtime.block_on(network::connect(&args.server, predictor.mirror())) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let bindings = KeyBindings::for_player(args.player_id);
    info!(
        "Player {}: {:?} up, {:?} down",
        args.player_id, bindings.up, bindings.down
    );

    let mut input = KeyboardInput::new(bindings);
    let renderer = Renderer::new(predictor.side());

    loop {
        let frame_dt = get_frame_time();

        if let Some(delta) = predictor.update(input.axis(), frame_dt) {
            session.send_input(delta);
        }

        renderer.render(&predictor.render_state());

        next_frame().await;
    }
}
