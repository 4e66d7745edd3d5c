//! Performance benchmarks for the simulation and the wire format

use server::config::SimConfig;
use server::game::GameState;
use shared::{level_for_xp, Command, EntityId, InputState, ServerMessage};
use std::time::Instant;

fn busy_game(players: usize) -> (GameState, Vec<EntityId>) {
    let mut game = GameState::new(SimConfig {
        seed: Some(99),
        ..SimConfig::default()
    });
    let ids = (0..players).map(|_| game.add_player()).collect();
    (game, ids)
}

/// Benchmarks one full tick with a crowded arena
#[test]
fn benchmark_tick_with_fifty_players() {
    let (mut game, ids) = busy_game(50);

    let iterations = 300u64;
    let start = Instant::now();

    for tick in 0..iterations {
        for (i, id) in ids.iter().enumerate() {
            let phase = (tick / 15 + i as u64) % 4;
            game.queue_command(Command::Input {
                id: *id,
                input: InputState {
                    up: phase == 0,
                    right: phase == 1,
                    down: phase == 2,
                    left: phase == 3,
                    facing: None,
                },
            });
            if tick % 10 == 0 {
                game.queue_command(Command::Attack { id: *id });
            }
        }
        game.step();
    }

    let duration = start.elapsed();
    println!(
        "Simulation: {} players x {} ticks in {:?} ({:.2} μs/tick)",
        ids.len(),
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(game.tick, iterations);
    assert_eq!(game.leaf_count(), shared::LEAF_COUNT);
    // A 30 Hz budget is 33ms per tick; stay far below it even unoptimised.
    assert!(duration.as_millis() < 3000);
}

/// Benchmarks building and encoding the broadcast snapshot
#[test]
fn benchmark_snapshot_encoding() {
    let (mut game, _ids) = busy_game(50);
    game.step();

    let iterations = 200;
    let start = Instant::now();
    let mut bytes = 0;

    for i in 0..iterations {
        let text = ServerMessage::Snapshot(game.snapshot(i)).encode().unwrap();
        bytes = text.len();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encoding: {} iterations in {:?} ({:.2} μs/iter, {} bytes)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64,
        bytes
    );

    assert!(bytes > 0);
    assert!(duration.as_millis() < 3000);
}

/// Benchmarks decoding client commands at the transport boundary
#[test]
fn benchmark_command_decoding() {
    let frames = [
        r#"{"type":"input","id":"7","input":{"up":true,"left":true},"facing":1.5}"#,
        r#"{"type":"join","id":"7","username":"someone","cls":"mantis"}"#,
        r#"{"type":"attack","id":"7"}"#,
        "not json at all",
    ];

    let iterations = 20_000;
    let start = Instant::now();
    let mut accepted = 0;

    for i in 0..iterations {
        if Command::decode(frames[i % frames.len()]).is_ok() {
            accepted += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Command decoding: {} frames in {:?} ({:.2} μs/frame)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(accepted, iterations / 4 * 3);
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks the level curve
#[test]
fn benchmark_level_curve() {
    let iterations = 200_000u32;
    let start = Instant::now();

    let mut last = 1;
    for xp in 0..iterations {
        let level = level_for_xp(xp);
        assert!(level >= last);
        last = level;
    }

    let duration = start.elapsed();
    println!(
        "Level curve: {} lookups in {:?} ({:.2} ns/lookup)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 1000);
}
