//! Per-tick системы контроллера движения.
//!
//! Порядок в FixedUpdate строго фиксирован (`LocomotionPlugin`):
//! teleport → ground probe → gravity → направление → applyMovement →
//! jump intents → интеграция. Animation слой читает MovementState уже
//! после записи скорости — stale velocity он не видит.

use bevy::prelude::*;

use crate::logger::log_warning;
use crate::movement::{
    CameraRig, CharacterSprings, JumpIntent, MovementConfig, MovementInput, MovementState,
    TeleportIntent,
};
use crate::physics::PhysicsBody;
use crate::spring::wrap_angle;

/// Минимальный квадрат длины, ниже которого вектор считается нулевым
/// (guard перед normalize/atan2, чтобы NaN не утёк в пружины)
const EPS_SQ: f32 = 1e-8;

/// Направление движения из input'а.
///
/// Camera-relative: `forward*axis.y + right*axis.x` на горизонтальном
/// базисе камеры. Локальный режим: `(x, 0, -y)`. Нулевой input ⇒ ZERO —
/// направление не запоминается.
pub fn direction_from_input(axis: Vec2, camera_relative: bool, rig: &CameraRig) -> Vec3 {
    // Стики дают и диагонали > 1 — зажимаем в единичный круг
    let axis = if axis.length_squared() > 1.0 {
        axis.normalize()
    } else {
        axis
    };

    let raw = if camera_relative {
        rig.forward * axis.y + rig.right * axis.x
    } else {
        Vec3::new(axis.x, 0.0, -axis.y)
    };

    let flat = Vec3::new(raw.x, 0.0, raw.z);
    if flat.length_squared() < EPS_SQ {
        Vec3::ZERO
    } else {
        flat.normalize()
    }
}

/// Знаковый угол поворота между горизонтальными векторами.
///
/// Положительный = против часовой вокруг +Y; `atan2(cross.y, dot)`.
/// Вырожденные вектора дают 0 (NaN guard).
pub fn signed_horizontal_angle(from: Vec3, to: Vec3) -> f32 {
    let from = Vec3::new(from.x, 0.0, from.z);
    let to = Vec3::new(to.x, 0.0, to.z);
    if from.length_squared() < EPS_SQ || to.length_squared() < EPS_SQ {
        return 0.0;
    }
    wrap_angle(from.cross(to).y.atan2(from.dot(to)))
}

/// Система: input → move_direction + movement флаги.
pub fn calculate_move_direction(
    mut query: Query<
        (
            &MovementConfig,
            &MovementInput,
            &CameraRig,
            &mut MovementState,
        ),
        With<PhysicsBody>,
    >,
) {
    for (config, input, rig, mut state) in query.iter_mut() {
        state.move_direction = direction_from_input(input.axis, config.camera_relative, rig);
        state.is_moving = state.move_direction != Vec3::ZERO;
        // Спринт только на земле: в воздухе модификатор не действует
        state.is_sprinting = state.is_moving && state.is_grounded && input.sprint;
        state.is_walking = state.is_moving && !input.sprint && input.walk;
    }
}

/// Система: edge-детект jump input'а → JumpIntent.
pub fn emit_jump_intents(
    mut query: Query<(Entity, &mut MovementInput), With<PhysicsBody>>,
    mut intents: EventWriter<JumpIntent>,
) {
    for (entity, mut input) in query.iter_mut() {
        if input.jump && !input.jump_pressed_prev {
            intents.write(JumpIntent { entity });
        }
        input.jump_pressed_prev = input.jump;
    }
}

/// Система: applyMovement — пружины, arcade blend, fall clamp, запись тела.
///
/// Вертикальная скорость всегда берётся из живой физики (пружина её не
/// перезаписывает), кроме clamp'а падения. Скорость пишется в тело одним
/// присваиванием в конце.
pub fn apply_movement(
    mut query: Query<(
        &MovementConfig,
        &mut MovementState,
        &mut CharacterSprings,
        &mut PhysicsBody,
    )>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();

    for (config, mut state, mut springs, mut body) in query.iter_mut() {
        // a. Целевая скорость по модификаторам
        state.target_speed = if !state.is_moving {
            0.0
        } else if state.is_sprinting {
            config.sprint_speed
        } else if state.is_walking {
            config.walk_speed
        } else {
            config.run_speed
        };

        // b. Orientation target обновляется только в движении:
        //    стоя на месте персонаж сохраняет facing
        if state.is_moving {
            state.orientation_target = state.move_direction;
        }

        // c. Rotation spring (relative): остаточный угол как target,
        //    position после simulate — угловая дельта этого кадра
        let turn = signed_horizontal_angle(state.orientation, state.orientation_target);
        springs.rotation.begin_relative(turn);
        springs.rotation.simulate(dt);
        let rotated = Quat::from_rotation_y(springs.rotation.position) * state.orientation;
        state.orientation = rotated.try_normalize().unwrap_or(state.orientation);
        state.angular_velocity = springs.rotation.velocity;
        state.facing_direction = state.orientation;

        // d. Velocity spring к желаемой скорости (в воздухе — air control)
        let control = if state.is_grounded {
            1.0
        } else {
            config.air_control
        };
        springs.velocity.target = state.move_direction * state.target_speed * control;
        springs.velocity.simulate(dt);

        // e. Arcade/physics blend: горизонталь — lerp по influence,
        //    вертикаль — живая физика
        let spring_velocity = springs.velocity.position;
        let physics_velocity = body.velocity;
        let influence = config.arcade_velocity_influence.clamp(0.0, 1.0);
        let horizontal = Vec3::new(
            physics_velocity.x + (spring_velocity.x - physics_velocity.x) * influence,
            0.0,
            physics_velocity.z + (spring_velocity.z - physics_velocity.z) * influence,
        );

        // f. Fall clamp
        let vertical = physics_velocity.y.max(-config.max_fall_speed);

        // g. Одна запись в тело + derived поля
        body.velocity = Vec3::new(horizontal.x, vertical, horizontal.z);
        state.velocity = body.velocity;
        state.horizontal_velocity = horizontal;
        state.vertical_velocity = vertical;
        state.current_speed = horizontal.length();
    }
}

/// Система: телепорт — позиция, нулевая скорость, сброс velocity пружины.
///
/// Rotation пружина и ориентация сознательно не трогаются: персонаж
/// прибывает лицом туда же, куда смотрел.
pub fn handle_teleport_intents(
    mut intents: EventReader<TeleportIntent>,
    mut query: Query<(&mut Transform, &mut PhysicsBody, &mut CharacterSprings)>,
) {
    for intent in intents.read() {
        let Ok((mut transform, mut body, mut springs)) = query.get_mut(intent.entity) else {
            log_warning(&format!(
                "teleport: entity {:?} без тела, запрос пропущен",
                intent.entity
            ));
            continue;
        };

        transform.translation = intent.position;
        body.velocity = Vec3::ZERO;
        // Velocity пружина сбрасывается целиком: её position — это
        // сглаженная скорость, остаточный momentum недопустим
        springs.velocity.reset_to(Vec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_direction_camera_relative() {
        let rig = CameraRig {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        };

        let forward = direction_from_input(Vec2::new(0.0, 1.0), true, &rig);
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);

        let diagonal = direction_from_input(Vec2::new(1.0, 1.0), true, &rig);
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
        assert!(diagonal.x > 0.0 && diagonal.z < 0.0);
    }

    #[test]
    fn test_direction_local_mode() {
        let rig = CameraRig::default();
        let dir = direction_from_input(Vec2::new(0.0, 1.0), false, &rig);
        assert!((dir - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_zero_input_has_no_memory() {
        let rig = CameraRig::default();
        assert_eq!(direction_from_input(Vec2::ZERO, true, &rig), Vec3::ZERO);
    }

    #[test]
    fn test_signed_angle_quarter_turns() {
        let angle = signed_horizontal_angle(Vec3::X, Vec3::NEG_Z);
        assert!((angle - FRAC_PI_2).abs() < 1e-5);

        let angle = signed_horizontal_angle(Vec3::NEG_Z, Vec3::X);
        assert!((angle + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_signed_angle_degenerate_is_zero() {
        assert_eq!(signed_horizontal_angle(Vec3::ZERO, Vec3::X), 0.0);
        assert_eq!(signed_horizontal_angle(Vec3::X, Vec3::new(0.0, 1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_rotation_matches_signed_angle_convention() {
        // Quat::from_rotation_y(angle) должен докручивать from к to
        let from = Vec3::X;
        let to = Vec3::NEG_Z;
        let angle = signed_horizontal_angle(from, to);
        let rotated = Quat::from_rotation_y(angle) * from;
        assert!((rotated - to).length() < 1e-5);
    }
}
