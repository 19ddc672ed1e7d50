//! EMBERFALL Simulation Core
//!
//! ECS-симуляция локомоции и анимации персонажа на Bevy 0.16.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = simulation layer (движение, прыжки, animation state machine)
//! - Рендер/ассеты/физический solver = внешние слои; граница — события
//!   (`AnimationCommand`) и trait'ы (`RaycastWorld`)
//!
//! Один simulation tick на кадр, все системы в FixedUpdate (60Hz),
//! порядок внутри тика жёсткий: ground check → движение → прыжок →
//! анимация. Никаких блокировок и фоновых потоков.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

// Публичные модули
pub mod animation;
pub mod logger;
pub mod movement;
pub mod physics;
pub mod spring;

// Re-export базовых типов для удобства
pub use animation::{
    AnimationCommand, AnimationPlugin, AnimationState, AnimationStateMachine, ClipLibrary,
    PlayAnimation, PlayOptions,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use movement::{
    spawn_character, CameraRig, CharacterSprings, GroundProbeConfig, JumpConfig, JumpIntent,
    Landed, LocomotionPlugin, MovementConfig, MovementInput, MovementState, TeleportIntent,
};
pub use physics::{FlatWorld, Gravity, PhysicsBody, RayHit, RaycastSource, RaycastWorld};
pub use spring::{RelativeSpringSimulator, SpringConfig, SpringSimulator};

/// Фазы simulation тика.
///
/// Locomotion пишет скорость тела ДО Animation: state machine никогда
/// не видит stale velocity.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Locomotion,
    Animation,
}

/// Главный plugin симуляции (объединяет все подсистемы).
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .configure_sets(
                FixedUpdate,
                (SimulationSet::Locomotion, SimulationSet::Animation).chain(),
            )
            .add_plugins((LocomotionPlugin, AnimationPlugin));
    }
}

/// Создаёт minimal Bevy App для headless симуляции.
///
/// Время шагается вручную ровно по 1/60s на `app.update()` — один вызов,
/// один FixedUpdate tick, независимо от wall clock (детерминизм тестов).
///
/// Самый первый update Bevy тратит на инициализацию часов (zero delta,
/// FixedUpdate не срабатывает) — прогреваем его здесь, чтобы контракт
/// "один update = один tick" держался с первого вызова у клиента.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .add_plugins(SimulationPlugin);

    // Zero-delta кадр инициализации часов
    app.update();

    app
}

/// Снимок всех компонентов типа `T` в детерминированном порядке (для
/// тестов детерминизма: два прогона с одним seed → идентичные байты).
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
