//! Jump gating: coyote time, double jump, cooldown.

use bevy::prelude::*;

use crate::logger::log;
use crate::movement::{JumpConfig, JumpIntent, MovementState};
use crate::physics::PhysicsBody;

/// Пытается выполнить прыжок против живого тела.
///
/// Grant iff `(grounded || time_since_grounded < coyote || jump_count < max)
/// && time_since_jump > cooldown`. При grant'е вертикальная скорость
/// ПЕРЕЗАПИСЫВАЕТСЯ jump_force (не добавляется), grounded снимается сразу —
/// один запрос не может сработать дважды за тик.
pub fn try_jump(state: &mut MovementState, body: &mut PhysicsBody, config: &JumpConfig) -> bool {
    let window_open = state.is_grounded
        || state.time_since_grounded < config.coyote_time
        || state.jump_count < config.max_jumps;

    if !window_open || state.time_since_jump <= config.jump_cooldown {
        return false;
    }

    body.velocity.y = config.jump_force;
    state.jump_count += 1;
    state.time_since_jump = 0.0;
    state.is_grounded = false;

    // Производные поля держим в актуальном состоянии: animation слой
    // читает vertical_velocity этим же тиком
    state.velocity = body.velocity;
    state.vertical_velocity = body.velocity.y;

    true
}

/// Система: обработка JumpIntent events.
pub fn handle_jump_intents(
    mut intents: EventReader<JumpIntent>,
    mut query: Query<(&JumpConfig, &mut MovementState, &mut PhysicsBody)>,
) {
    for intent in intents.read() {
        let Ok((config, mut state, mut body)) = query.get_mut(intent.entity) else {
            // Тело ещё не прикреплено (async spawn) — no-op
            continue;
        };

        if try_jump(&mut state, &mut body, config) {
            log(&format!(
                "jump granted: entity={:?} count={}",
                intent.entity, state.jump_count
            ));
        }
    }
}
