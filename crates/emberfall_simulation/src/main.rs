//! Headless симуляция EMBERFALL
//!
//! Прогоняет персонажа по скриптованному input'у на плоском мире:
//! разбег → спринт → прыжок → приземление. Без рендера.

use bevy::prelude::*;
use emberfall_simulation::{
    create_headless_app, spawn_character, AnimationStateMachine, ClipLibrary, FlatWorld,
    MovementInput, MovementState, RaycastSource,
};

fn main() {
    println!("Starting EMBERFALL headless simulation");

    let mut app = create_headless_app();
    app.insert_resource(RaycastSource::new(FlatWorld { height: 0.0 }))
        .insert_resource(ClipLibrary::with_default_durations());

    let character = spawn_character(&mut app.world_mut().commands(), Vec3::new(0.0, 0.5, 0.0));
    app.world_mut().flush();

    // Скрипт: 1s idle → 2s бег вперёд → 2s спринт с прыжком → 1s стоим
    for tick in 0..360_u32 {
        {
            let mut input = app
                .world_mut()
                .get_mut::<MovementInput>(character)
                .expect("персонаж без input компонента");
            input.axis = if (60..300).contains(&tick) {
                Vec2::new(0.0, 1.0)
            } else {
                Vec2::ZERO
            };
            input.sprint = (180..300).contains(&tick);
            input.jump = (240..250).contains(&tick);
        }

        app.update();

        if tick % 60 == 0 {
            let state = app.world().get::<MovementState>(character).unwrap();
            let machine = app.world().get::<AnimationStateMachine>(character).unwrap();
            println!(
                "tick {tick}: speed={:.2} grounded={} anim={:?}",
                state.current_speed,
                state.is_grounded,
                machine.current()
            );
        }
    }

    println!("Simulation complete!");
}
