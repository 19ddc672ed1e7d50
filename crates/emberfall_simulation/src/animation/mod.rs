//! Animation domain — state machine персонажа.
//!
//! ECS ответственность:
//! - выбор состояния (приоритеты, lock window, очередь)
//! - тайминги клипов (lock/завершение по ClipLibrary)
//! - события `AnimationCommand` для внешнего проигрывателя
//!
//! Проигрыватель (рендер слой) ответственность:
//! - clip actions, cross-fade весов, скиннинг

use bevy::prelude::*;

pub mod machine;
pub mod state;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod machine_tests;

pub use machine::{
    AnimationCommand, AnimationStateMachine, PlayAnimation, PlayOptions, Transition,
};
pub use state::{AnimationState, ClipConfig, ClipLibrary};

use crate::SimulationSet;

/// Animation Plugin.
///
/// Порядок систем фиксирован: приземления → attack input → внешние
/// запросы → locomotion вывод. Всё в одном тике после движения.
pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClipLibrary>()
            .add_event::<AnimationCommand>()
            .add_event::<PlayAnimation>()
            .add_systems(
                FixedUpdate,
                (
                    systems::handle_landed,
                    systems::handle_attack_input,
                    systems::handle_play_requests,
                    systems::drive_from_movement,
                )
                    .chain()
                    .in_set(SimulationSet::Animation),
            );
    }
}
