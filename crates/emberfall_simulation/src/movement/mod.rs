//! Movement domain — локомоция персонажа.
//!
//! Содержит:
//! - компоненты (input, конфиги, MovementState, пружины)
//! - ground probe (нисходящий луч + landing edge)
//! - jump gating (coyote time, double jump, cooldown)
//! - per-tick системы (направление, applyMovement, телепорт)

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod ground;
pub mod jump;
pub mod systems;

pub use components::*;
pub use events::*;
pub use jump::try_jump;

use crate::animation::AnimationStateMachine;
use crate::physics::{
    apply_gravity, integrate_velocity_to_transform, resolve_ground_contact, Gravity, PhysicsBody,
    RaycastSource,
};
use crate::SimulationSet;

/// Locomotion Plugin.
///
/// Регистрирует движение в FixedUpdate строго по цепочке:
/// 1. handle_teleport_intents
/// 2. ground_probe (generic backend; Rapier backend подменяет)
/// 3. resolve_ground_contact (headless контакт)
/// 4. apply_gravity
/// 5. calculate_move_direction
/// 6. emit_jump_intents
/// 7. apply_movement (пружины + arcade blend + запись тела)
/// 8. handle_jump_intents
/// 9. integrate_velocity_to_transform (headless интеграция)
///
/// Grounding разрешается до бленда скоростей, запись скорости — до
/// animation слоя (см. `SimulationSet`).
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Gravity>()
            .add_event::<JumpIntent>()
            .add_event::<TeleportIntent>()
            .add_event::<Landed>()
            .add_systems(
                FixedUpdate,
                (
                    systems::handle_teleport_intents,
                    ground::ground_probe.run_if(resource_exists::<RaycastSource>),
                    resolve_ground_contact.run_if(resource_exists::<RaycastSource>),
                    apply_gravity,
                    systems::calculate_move_direction,
                    systems::emit_jump_intents,
                    systems::apply_movement,
                    jump::handle_jump_intents,
                    integrate_velocity_to_transform.run_if(resource_exists::<RaycastSource>),
                )
                    .chain()
                    .in_set(SimulationSet::Locomotion),
            );
    }
}

/// Spawn helper: персонаж с полным набором компонентов контроллера.
///
/// Transform + тело + конфиги + состояние + пружины + state machine.
/// Физическое тело присутствует с самого начала; хосты с async загрузкой
/// вставляют `PhysicsBody` позже — до этого все системы молча пропускают
/// entity (запросы матчатся только при наличии тела).
pub fn spawn_character(commands: &mut Commands, position: Vec3) -> Entity {
    let movement_config = MovementConfig::default();
    let springs = CharacterSprings::from_config(&movement_config);

    commands
        .spawn((
            Transform::from_translation(position),
            PhysicsBody::default(),
            movement_config,
            GroundProbeConfig::default(),
            JumpConfig::default(),
            MovementState::default(),
            springs,
            MovementInput::default(),
            CameraRig::default(),
            AnimationStateMachine::default(),
        ))
        .id()
}
