//! Animation системы: связка MovementState → state machine → команды
//! внешнему проигрывателю.
//!
//! Выполняются после locomotion цепочки того же тика (SimulationSet),
//! так что машина всегда видит уже записанную скорость.

use bevy::prelude::*;

use crate::animation::machine::{
    AnimationCommand, AnimationStateMachine, PlayAnimation, PlayOptions, Transition,
};
use crate::animation::state::{AnimationState, ClipLibrary};
use crate::movement::{Landed, MovementInput, MovementState};

/// Минимальная скорость удара о землю для Land анимации (m/s);
/// мягкие приземления уходят сразу в локомоцию
pub const LAND_ANIMATION_MIN_IMPACT: f32 = 6.0;

fn emit(
    commands: &mut EventWriter<AnimationCommand>,
    entity: Entity,
    transition: Option<Transition>,
) {
    if let Some(t) = transition {
        commands.write(AnimationCommand {
            entity,
            from: t.from,
            to: t.to,
            fade_in: t.fade_in,
            time_scale: t.time_scale,
        });
    }
}

/// Система: жёсткие приземления играют Land.
pub fn handle_landed(
    mut landed: EventReader<Landed>,
    clips: Res<ClipLibrary>,
    time: Res<Time<Fixed>>,
    mut query: Query<&mut AnimationStateMachine>,
    mut commands: EventWriter<AnimationCommand>,
) {
    let now = time.elapsed_secs();

    for event in landed.read() {
        if event.impact_speed < LAND_ANIMATION_MIN_IMPACT {
            continue;
        }
        let Ok(mut machine) = query.get_mut(event.entity) else {
            continue;
        };
        let transition = machine.play(AnimationState::Land, PlayOptions::default(), now, &clips);
        emit(&mut commands, event.entity, transition);
    }
}

/// Система: edge-детект attack input'а → attack chain.
///
/// Повторное нажатие во время атаки ставит следующее звено цепочки в
/// очередь (Attack1 → Attack2 → Attack3); очередь сыграет на естественном
/// завершении текущего клипа.
pub fn handle_attack_input(
    clips: Res<ClipLibrary>,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut MovementInput, &mut AnimationStateMachine)>,
    mut commands: EventWriter<AnimationCommand>,
) {
    let now = time.elapsed_secs();

    for (entity, mut input, mut machine) in query.iter_mut() {
        let pressed = input.attack && !input.attack_pressed_prev;
        input.attack_pressed_prev = input.attack;
        if !pressed {
            continue;
        }

        let (state, options) = match machine.current() {
            AnimationState::Attack1 => (AnimationState::Attack2, PlayOptions::queued()),
            AnimationState::Attack2 => (AnimationState::Attack3, PlayOptions::queued()),
            _ => (AnimationState::Attack1, PlayOptions::default()),
        };

        let transition = machine.play(state, options, now, &clips);
        emit(&mut commands, entity, transition);
    }
}

/// Система: запросы внешних слоёв (combat, damage) через событие.
pub fn handle_play_requests(
    mut requests: EventReader<PlayAnimation>,
    clips: Res<ClipLibrary>,
    time: Res<Time<Fixed>>,
    mut query: Query<&mut AnimationStateMachine>,
    mut commands: EventWriter<AnimationCommand>,
) {
    let now = time.elapsed_secs();

    for request in requests.read() {
        let Ok(mut machine) = query.get_mut(request.entity) else {
            continue;
        };
        let options = PlayOptions {
            force: request.force,
            queue: request.queue,
        };
        let transition = machine.play(request.state, options, now, &clips);
        emit(&mut commands, request.entity, transition);
    }
}

/// Система: опрос завершения клипа + вывод locomotion состояния.
///
/// Порядок внутри тика: сначала естественное завершение (queued/авто-Idle),
/// затем обычный locomotion вывод через общий гейт.
pub fn drive_from_movement(
    clips: Res<ClipLibrary>,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &MovementState, &mut AnimationStateMachine)>,
    mut commands: EventWriter<AnimationCommand>,
) {
    let now = time.elapsed_secs();

    for (entity, movement, mut machine) in query.iter_mut() {
        let finished = machine.poll_finished(now, &clips);
        emit(&mut commands, entity, finished);

        let transition = machine.update_from_movement(
            movement.is_moving,
            movement.is_sprinting,
            movement.is_walking,
            movement.is_grounded,
            movement.vertical_velocity,
            now,
            &clips,
        );
        emit(&mut commands, entity, transition);
    }
}
