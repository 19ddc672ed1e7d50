//! Rapier backend для ground probe.
//!
//! Подменяет generic `ground_probe`, когда физический мир живёт в Rapier:
//! тот же нисходящий луч, но через `RapierContext` с нормалью поверхности
//! из настоящей геометрии, плюс синхронизация velocity в Rapier тело.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::movement::ground::apply_probe_hit;
use crate::movement::{GroundProbeConfig, Landed, MovementState};
use crate::physics::{PhysicsBody, RayHit};
use crate::SimulationSet;

/// Plugin: Rapier-вариант ground probe + velocity sync.
///
/// Вставляется вместо `RaycastSource`; generic probe и headless
/// интеграция при этом не активируются (их run_if не срабатывает).
pub struct RapierGroundProbePlugin;

impl Plugin for RapierGroundProbePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                rapier_ground_probe
                    .after(crate::movement::systems::handle_teleport_intents)
                    .before(crate::physics::apply_gravity),
                sync_velocity_to_rapier
                    .after(crate::movement::jump::handle_jump_intents)
                    .before(PhysicsSet::SyncBackend),
            )
                .in_set(SimulationSet::Locomotion),
        );
    }
}

/// Система: ground probe через RapierContext.
pub fn rapier_ground_probe(
    rapier_context: ReadRapierContext,
    time: Res<Time<Fixed>>,
    mut query: Query<(
        Entity,
        &GlobalTransform,
        &GroundProbeConfig,
        &PhysicsBody,
        &mut MovementState,
    )>,
    mut landed: EventWriter<Landed>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };
    let dt = time.delta_secs();

    for (entity, transform, config, body, mut state) in query.iter_mut() {
        let origin = transform.translation() - Vec3::Y * config.ray_offset;
        // Собственный коллайдер и сенсоры лучу не мешают
        let filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors();

        let hit = context
            .cast_ray_and_get_normal(origin, Vec3::NEG_Y, config.ray_length, true, filter)
            .map(|(_, intersection)| RayHit {
                time_of_impact: intersection.time_of_impact,
                point: intersection.point,
                normal: Some(intersection.normal),
            });

        if let Some(impact_speed) = apply_probe_hit(&mut state, body.velocity.y, config, hit, dt) {
            landed.write(Landed {
                entity,
                impact_speed,
            });
        }
    }
}

/// Система: PhysicsBody.velocity → Rapier Velocity.
///
/// Rapier применяет velocity к телу на своём шаге; мы только отдаём
/// итог arcade бленда этого тика.
pub fn sync_velocity_to_rapier(
    mut query: Query<(&PhysicsBody, &mut Velocity), With<MovementState>>,
) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}
