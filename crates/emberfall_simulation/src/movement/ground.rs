//! Ground probe: нисходящий луч + landing edge bookkeeping.
//!
//! Луч длины `ray_length` уходит вертикально вниз из точки
//! `позиция тела - (0, ray_offset, 0)`. Попадание ⇒ grounded, нормаль из
//! hit'а (+Y если backend её не дал); промах ⇒ airborne, нормаль прежняя.
//!
//! Edge falling→grounded (не level!) сбрасывает jump_count и шлёт `Landed`.

use bevy::prelude::*;

use crate::movement::{GroundProbeConfig, Landed, MovementState};
use crate::physics::{PhysicsBody, RayHit, RaycastSource};

/// Применяет результат луча к состоянию контроллера.
///
/// Возвращает скорость удара о землю на landing edge (None если edge нет).
/// Общий код для generic- и Rapier-backend'ов: тайминги, jump filter,
/// нормаль, сброс jump_count.
pub(crate) fn apply_probe_hit(
    state: &mut MovementState,
    body_velocity_y: f32,
    config: &GroundProbeConfig,
    hit: Option<RayHit>,
    dt: f32,
) -> Option<f32> {
    state.time_since_jump += dt;

    // Сразу после прыжка тело ещё в пределах луча — такой hit игнорируем,
    // иначе landing edge вернёт прыжки пока персонаж только взлетает
    let hit = if state.time_since_jump < config.jump_filter {
        None
    } else {
        hit
    };

    let was_grounded = state.is_grounded;

    match hit {
        Some(hit) => {
            state.is_grounded = true;
            state.ground_normal = hit.normal.unwrap_or(Vec3::Y);
            state.time_since_grounded = 0.0;
            if !was_grounded {
                state.jump_count = 0;
                return Some((-body_velocity_y).max(0.0));
            }
        }
        None => {
            state.is_grounded = false;
            state.time_since_grounded += dt;
        }
    }

    None
}

/// Система: ground probe через `RaycastSource` (headless backend).
///
/// Rapier вариант — `physics::rapier::rapier_ground_probe`, он подменяет
/// эту систему когда RaycastSource не вставлен.
pub fn ground_probe(
    source: Res<RaycastSource>,
    time: Res<Time<Fixed>>,
    mut query: Query<(
        Entity,
        &Transform,
        &GroundProbeConfig,
        &PhysicsBody,
        &mut MovementState,
    )>,
    mut landed: EventWriter<Landed>,
) {
    let dt = time.delta_secs();

    for (entity, transform, config, body, mut state) in query.iter_mut() {
        let origin = transform.translation - Vec3::Y * config.ray_offset;
        let hit = source
            .0
            .cast_ray(origin, Vec3::NEG_Y, config.ray_length, true);

        if let Some(impact_speed) = apply_probe_hit(&mut state, body.velocity.y, config, hit, dt) {
            landed.write(Landed {
                entity,
                impact_speed,
            });
        }
    }
}
