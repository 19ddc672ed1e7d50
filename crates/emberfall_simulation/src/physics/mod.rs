//! Physics boundary: состояние тела + raycast абстракция.
//!
//! Архитектура:
//! - `PhysicsBody` — custom velocity, интегрируем сами (kinematic)
//! - Collision/broad-phase — внешний движок (Rapier backend в `rapier`)
//! - Raycast уходит через trait `RaycastWorld`, чтобы ground probe
//!   работал и headless (аналитический `FlatWorld`), и поверх Rapier
//!
//! Детерминизм: fixed timestep (60Hz), все системы в FixedUpdate.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::movement::MovementState;

pub mod rapier;

/// Гравитация мира (m/s², отрицательная = вниз)
#[derive(Resource, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
pub struct Gravity(pub f32);

impl Default for Gravity {
    fn default() -> Self {
        Self(-9.81)
    }
}

/// Динамическое тело персонажа: velocity интегрируем сами.
///
/// Позиция живёт в `Transform`. Контроллер движения одалживает тело
/// на свой tick slice и пишет velocity одним вызовом; больше никто
/// его в этом тике не мутирует.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    /// Линейная скорость (m/s)
    pub velocity: Vec3,
    /// Масса (kg), для импульсов
    pub mass: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 70.0,
        }
    }
}

impl PhysicsBody {
    /// Импульс как мгновенная дельта скорости (J/m)
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse / self.mass;
    }
}

/// Результат raycast запроса к физическому миру.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Расстояние до попадания вдоль луча
    pub time_of_impact: f32,
    /// Точка попадания (world space)
    pub point: Vec3,
    /// Нормаль поверхности; None если backend не смог её дать
    pub normal: Option<Vec3>,
}

/// Raycast интерфейс физического мира.
///
/// Ground probe знает только этот trait; конкретный мир — либо Rapier
/// (см. `rapier`), либо аналитический `FlatWorld` для headless тестов.
pub trait RaycastWorld: Send + Sync + 'static {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, solid: bool)
        -> Option<RayHit>;
}

/// Resource-обёртка для не-Rapier raycast backend'а.
#[derive(Resource)]
pub struct RaycastSource(pub Box<dyn RaycastWorld>);

impl RaycastSource {
    pub fn new(world: impl RaycastWorld) -> Self {
        Self(Box::new(world))
    }
}

/// Бесконечная горизонтальная плоскость на заданной высоте.
///
/// Headless мир для тестов и demo: никакого solver'а, только raycast.
#[derive(Debug, Clone, Copy)]
pub struct FlatWorld {
    pub height: f32,
}

impl RaycastWorld for FlatWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        solid: bool,
    ) -> Option<RayHit> {
        // Origin уже под плоскостью: solid луч считается попаданием в origin
        if origin.y <= self.height {
            return solid.then_some(RayHit {
                time_of_impact: 0.0,
                point: origin,
                normal: Some(Vec3::Y),
            });
        }
        if direction.y >= 0.0 {
            return None;
        }
        let toi = (origin.y - self.height) / -direction.y;
        (toi <= max_distance).then_some(RayHit {
            time_of_impact: toi,
            point: origin + direction * toi,
            normal: Some(Vec3::Y),
        })
    }
}

/// Система: гравитация для airborne тел.
pub fn apply_gravity(
    gravity: Res<Gravity>,
    mut query: Query<(&MovementState, &mut PhysicsBody)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (state, mut body) in query.iter_mut() {
        if !state.is_grounded {
            body.velocity.y += gravity.0 * delta;
        }
    }
}

/// Система: контакт с землёй в headless режиме.
///
/// Без внешнего solver'а нисходящую скорость на земле гасим сами,
/// иначе тело утонет сквозь плоскость.
pub fn resolve_ground_contact(mut query: Query<(&MovementState, &mut PhysicsBody)>) {
    for (state, mut body) in query.iter_mut() {
        if state.is_grounded && body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }
    }
}

/// Система: velocity → Transform (headless режим, без Rapier).
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform), With<MovementState>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity * delta;
    }
}
