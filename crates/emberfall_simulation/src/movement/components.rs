//! Movement компоненты: input, конфиги, состояние контроллера.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::spring::{RelativeSpringSimulator, SpringConfig, SpringSimulator};

/// Входные данные контроллера за tick.
///
/// Для headless тестов — mock input через этот компонент.
/// Для игры — заполняется из input провайдера хоста (клавиатура, геймпад, AI).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementInput {
    /// Нормализованный move вектор: x = strafe, y = forward, оба в [-1, 1]
    pub axis: Vec2,
    /// Sprint модификатор
    pub sprint: bool,
    /// Walk модификатор (медленный шаг)
    pub walk: bool,
    /// Jump нажат (edge детектится контроллером)
    pub jump: bool,
    /// Attack нажат (edge детектится animation слоем)
    pub attack: bool,
    /// Предыдущее состояние jump (для false→true edge)
    pub(crate) jump_pressed_prev: bool,
    /// Предыдущее состояние attack
    pub(crate) attack_pressed_prev: bool,
}

/// Горизонтально спроецированный базис камеры для camera-relative движения.
///
/// Обновляется camera провайдером хоста каждый кадр. Оба вектора
/// нормализованы и лежат в горизонтальной плоскости.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CameraRig {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

/// Параметры движения персонажа.
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct MovementConfig {
    /// Скорость шага (m/s)
    pub walk_speed: f32,
    /// Скорость бега (m/s)
    pub run_speed: f32,
    /// Скорость спринта (m/s)
    pub sprint_speed: f32,
    /// Доля управляемости в воздухе (0..1)
    pub air_control: f32,
    /// Вес arcade velocity в бленде с физической (0..1):
    /// 1.0 — полностью пружинная скорость, 0.0 — чистая физика
    pub arcade_velocity_influence: f32,
    /// Предел скорости падения (m/s, положительный)
    pub max_fall_speed: f32,
    /// Camera-relative направление движения (иначе локальные оси мира)
    pub camera_relative: bool,
    /// Пружина сглаживания скорости
    pub velocity_spring: SpringConfig,
    /// Пружина поворота к orientation target
    pub rotation_spring: SpringConfig,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 1.8,
            run_speed: 4.0,
            sprint_speed: 8.0,
            air_control: 0.3,
            arcade_velocity_influence: 1.0,
            max_fall_speed: 25.0,
            camera_relative: true,
            velocity_spring: SpringConfig {
                mass: 50.0,
                damping: 0.8,
            },
            rotation_spring: SpringConfig {
                mass: 10.0,
                damping: 0.5,
            },
        }
    }
}

/// Параметры ground probe.
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct GroundProbeConfig {
    /// Длина нисходящего луча (m)
    pub ray_length: f32,
    /// Смещение старта луча вниз от позиции тела (m)
    pub ray_offset: f32,
    /// Окно после прыжка, в котором ground hit игнорируется —
    /// иначе landing edge срабатывает пока тело ещё не оторвалось
    pub jump_filter: f32,
}

impl Default for GroundProbeConfig {
    fn default() -> Self {
        Self {
            ray_length: 0.57,
            ray_offset: 0.03,
            jump_filter: 0.15,
        }
    }
}

/// Параметры прыжка: coyote time, double jump, cooldown.
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct JumpConfig {
    /// Вертикальная скорость прыжка (перезаписывает, не добавляет)
    pub jump_force: f32,
    /// Максимум прыжков до приземления (2 = double jump)
    pub max_jumps: u32,
    /// Грейс-окно после схода с земли (s)
    pub coyote_time: f32,
    /// Минимальный интервал между прыжками (s)
    pub jump_cooldown: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            jump_force: 4.0,
            max_jumps: 2,
            coyote_time: 0.15,
            jump_cooldown: 0.2,
        }
    }
}

/// Состояние контроллера движения.
///
/// Мутируется только внутри per-tick update своего контроллера;
/// наружу читается как есть (animation слой, камера, UI).
///
/// Инвариант: `is_grounded == true` ⇒ `time_since_grounded == 0.0`
/// начиная с того же тика, где grounding стал true.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MovementState {
    /// Полная скорость тела после записи этого тика
    pub velocity: Vec3,
    /// Горизонтальная составляющая скорости
    pub horizontal_velocity: Vec3,
    /// Вертикальная составляющая скорости
    pub vertical_velocity: f32,
    /// Стоим ли на земле
    pub is_grounded: bool,
    /// Нормаль поверхности под ногами (последняя известная)
    pub ground_normal: Vec3,
    /// Время с момента схода с земли (s); 0 пока grounded
    pub time_since_grounded: f32,
    /// Прыжков с последнего приземления
    pub jump_count: u32,
    /// Время с последнего прыжка (s)
    pub time_since_jump: f32,
    /// Есть ли ненулевой move input
    pub is_moving: bool,
    /// Активен ли sprint модификатор
    pub is_sprinting: bool,
    /// Активен ли walk модификатор
    pub is_walking: bool,
    /// Фактическая горизонтальная скорость (m/s)
    pub current_speed: f32,
    /// Целевая скорость по input (m/s)
    pub target_speed: f32,
    /// Направление движения (unit или ZERO при отсутствии input)
    pub move_direction: Vec3,
    /// Куда смотрит персонаж (совпадает с orientation, derived)
    pub facing_direction: Vec3,
    /// Текущая ориентация (горизонтальный unit вектор)
    pub orientation: Vec3,
    /// Целевая ориентация (сохраняется когда input пропал)
    pub orientation_target: Vec3,
    /// Угловая скорость поворота (rad/s-шкала пружины, для lean/tilt)
    pub angular_velocity: f32,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            horizontal_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            is_grounded: false,
            ground_normal: Vec3::Y,
            time_since_grounded: 0.0,
            jump_count: 0,
            time_since_jump: 1000.0, // заведомо больше cooldown
            is_moving: false,
            is_sprinting: false,
            is_walking: false,
            current_speed: 0.0,
            target_speed: 0.0,
            move_direction: Vec3::ZERO,
            facing_direction: Vec3::NEG_Z,
            orientation: Vec3::NEG_Z,
            orientation_target: Vec3::NEG_Z,
            angular_velocity: 0.0,
        }
    }
}

/// Пружины контроллера (stateful, один набор на персонажа).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CharacterSprings {
    /// Сглаживание горизонтальной скорости
    pub velocity: SpringSimulator,
    /// Поворот к orientation target (relative режим)
    pub rotation: RelativeSpringSimulator,
}

impl Default for CharacterSprings {
    fn default() -> Self {
        Self::from_config(&MovementConfig::default())
    }
}

impl CharacterSprings {
    pub fn from_config(config: &MovementConfig) -> Self {
        Self {
            velocity: SpringSimulator::new(config.velocity_spring),
            rotation: RelativeSpringSimulator::new(config.rotation_spring),
        }
    }
}
