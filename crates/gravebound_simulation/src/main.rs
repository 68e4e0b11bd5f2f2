//! Headless симуляция GRAVEBOUND
//!
//! Арена: пол, игрок против grunt / archer / charger.
//! Игрок стоит в блоке и периодически атакует (scripted input).

use bevy::prelude::*;
use gravebound_simulation::{
    create_headless_app, log_info, spawn_archetype, world_snapshot, Archetype, ColliderWorld, GameNotification,
    LayerMask, PlayerInput,
};

fn main() {
    let seed = 42;
    log_info(&format!("Starting GRAVEBOUND headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    app.world_mut()
        .resource_mut::<ColliderWorld>()
        .add_static(Vec2::new(0.0, -1.0), Vec2::new(60.0, 1.0), LayerMask::GROUND);

    let player = {
        let mut commands = app.world_mut().commands();
        let player = spawn_archetype(&mut commands, Archetype::Player, Vec2::new(0.0, 0.0));
        spawn_archetype(&mut commands, Archetype::Grunt, Vec2::new(-6.0, 0.0));
        spawn_archetype(&mut commands, Archetype::Archer, Vec2::new(-12.0, 0.0));
        spawn_archetype(&mut commands, Archetype::Charger, Vec2::new(-18.0, 0.0));
        player
    };
    app.world_mut().flush();

    let mut notifications = app
        .world_mut()
        .resource_mut::<Events<GameNotification>>()
        .get_cursor();

    // Запускаем 1200 тиков симуляции (20 сек)
    for tick in 0..1200 {
        let input = match tick % 120 {
            0..=59 => PlayerInput::moving(-1),
            60..=89 => PlayerInput::blocking(),
            _ => PlayerInput::attacking(),
        };
        if let Some(mut current) = app.world_mut().get_mut::<PlayerInput>(player) {
            *current = input;
        }

        app.update();

        let events = app.world().resource::<Events<GameNotification>>();
        for notification in notifications.read(events) {
            log_info(&format!("📣 tick {}: {:?}", tick, notification));
        }

        if tick % 200 == 0 {
            for line in world_snapshot(app.world_mut()) {
                log_info(&format!("Tick {}: {}", tick, line));
            }
        }
    }

    log_info("Simulation complete!");
}
