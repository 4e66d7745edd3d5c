//! Headless bot for poking a running server: connects, picks a class, then
//! wanders and swings at whatever is in front of it.

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use rand::Rng;
use shared::{Command, EntityId, InputState, PlayerClass, ServerMessage};
use std::time::Duration;
use tokio::time::{interval, sleep_until, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless arena bot")]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:8081")]
    url: String,
    /// Display name to join with
    #[arg(short, long, default_value = "bot")]
    name: String,
    /// Class key: beetle, ant or mantis
    #[arg(short, long, default_value = "ant")]
    class: String,
    /// How long to play before disconnecting
    #[arg(short, long, default_value_t = 10)]
    seconds: u64,
}

fn random_input<R: Rng>(rng: &mut R) -> InputState {
    InputState {
        up: rng.gen_bool(0.3),
        down: rng.gen_bool(0.3),
        left: rng.gen_bool(0.3),
        right: rng.gen_bool(0.3),
        facing: Some(rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    let (mut write, mut read) = ws_stream.split();
    info!("Connected to {}", args.url);

    let id: EntityId = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text)? {
                ServerMessage::Welcome { id, world } => {
                    info!("Welcome as {} in a {}x{} world", id, world.w, world.h);
                    break id;
                }
                ServerMessage::Snapshot(_) => continue,
            },
            Some(Ok(Message::Close(_))) | None => {
                warn!("Server closed the connection before welcoming us");
                return Ok(());
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    };

    let class = PlayerClass::from_key(&args.class);
    if class.is_none() {
        warn!("Unknown class {:?}, keeping default stats", args.class);
    }
    let join = Command::Join {
        id,
        name: Some(args.name.clone()),
        class,
    };
    write.send(Message::Text(join.encode())).await?;

    let mut rng = rand::thread_rng();
    let mut actions = interval(Duration::from_millis(250));
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut snapshots = 0u64;

    loop {
        tokio::select! {
            _ = sleep_until(deadline) => break,

            _ = actions.tick() => {
                let input = Command::Input { id, input: random_input(&mut rng) };
                write.send(Message::Text(input.encode())).await?;
                write.send(Message::Text(Command::Attack { id }.encode())).await?;
            },

            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let ServerMessage::Snapshot(snapshot) = ServerMessage::decode(&text)? {
                        snapshots += 1;
                        if snapshots % 15 == 0 {
                            if let Some(me) = snapshot.players.iter().find(|p| p.id == id) {
                                info!(
                                    "tick {}: at ({:.0}, {:.0}) hp {}/{} xp {} level {} alive {}",
                                    snapshot.tick, me.x, me.y, me.hp, me.max_hp, me.xp, me.level, me.alive
                                );
                            }
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    warn!("Server closed the connection");
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
        }
    }

    info!("Received {} snapshots, disconnecting", snapshots);
    write.send(Message::Close(None)).await?;
    Ok(())
}
