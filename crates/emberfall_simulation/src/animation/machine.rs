//! Animation state machine: приоритеты, lock window, очередь.
//!
//! # Правила перехода (`play`)
//!
//! 1. Lock window (`now < locked_until`) и не force: queue при запросе,
//!    иначе тихий drop.
//! 2. Тот же state и не force: no-op.
//! 3. Priority gate: численно меньший приоритет не перебивает текущий —
//!    при queue откладывается, иначе drop.
//! 4. Принятие: cross-fade команда, non-loop клип лочит машину на
//!    `duration * 0.8 / time_scale` — хвост в 20% оставлен, чтобы
//!    следующий переход начал блендиться до конца клипа.
//!
//! # Завершение клипа
//!
//! Callback'ов нет: машина опрашивается каждый тик (`poll_finished`).
//! Очередь из одного слота, last-wins (поздний queued затирает ранний).

use bevy::prelude::*;

use crate::animation::state::{AnimationState, ClipLibrary};
use crate::logger::log_warning;

/// Доля клипа, после которой lock снимается
const LOCK_TAIL_RATIO: f32 = 0.8;

/// Параметры запроса перехода.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Игнорировать lock и priority gate
    pub force: bool,
    /// Отложить запрос вместо drop'а, если сейчас нельзя
    pub queue: bool,
}

impl PlayOptions {
    pub const fn forced() -> Self {
        Self {
            force: true,
            queue: false,
        }
    }

    pub const fn queued() -> Self {
        Self {
            force: false,
            queue: true,
        }
    }
}

/// Принятый переход — cross-fade дескриптор для внешнего проигрывателя.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: AnimationState,
    pub to: AnimationState,
    pub fade_in: f32,
    pub time_scale: f32,
}

/// Event: принятый переход машины (ECS → внешний animation player).
///
/// Проигрыватель делает `crossFadeFrom(from, fade_in)` на своих clip
/// actions; машина таймингами клипа управляет сама.
#[derive(Event, Debug, Clone)]
pub struct AnimationCommand {
    pub entity: Entity,
    pub from: AnimationState,
    pub to: AnimationState,
    pub fade_in: f32,
    pub time_scale: f32,
}

/// Event: запрос анимации от внешнего слоя (combat, damage, AI).
#[derive(Event, Debug, Clone)]
pub struct PlayAnimation {
    pub entity: Entity,
    pub state: AnimationState,
    pub force: bool,
    pub queue: bool,
}

/// Машина состояний анимации персонажа.
///
/// Наружу состояние read-only через аксессоры; мутации — только через
/// `play` / `update_from_movement` / `poll_finished`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AnimationStateMachine {
    current: AnimationState,
    previous: AnimationState,
    queued: Option<AnimationState>,
    /// До этого момента переходы без force не принимаются
    locked_until: f32,
    /// Конец текущего cross-fade
    transition_end: f32,
    /// Момент естественного конца non-loop клипа
    clip_ends: Option<f32>,
}

impl Default for AnimationStateMachine {
    fn default() -> Self {
        Self {
            current: AnimationState::Idle,
            previous: AnimationState::Idle,
            queued: None,
            locked_until: 0.0,
            transition_end: 0.0,
            clip_ends: None,
        }
    }
}

impl AnimationStateMachine {
    pub fn current(&self) -> AnimationState {
        self.current
    }

    pub fn previous(&self) -> AnimationState {
        self.previous
    }

    pub fn queued_state(&self) -> Option<AnimationState> {
        self.queued
    }

    pub fn is_locked(&self, now: f32) -> bool {
        now < self.locked_until
    }

    pub fn is_transitioning(&self, now: f32) -> bool {
        now < self.transition_end
    }

    /// Запрос перехода. Возвращает принятый cross-fade (или None).
    pub fn play(
        &mut self,
        state: AnimationState,
        options: PlayOptions,
        now: f32,
        clips: &ClipLibrary,
    ) -> Option<Transition> {
        if !options.force {
            if self.is_locked(now) {
                if options.queue {
                    // Один слот, last-wins
                    self.queued = Some(state);
                }
                return None;
            }

            if state == self.current {
                return None;
            }

            if state.config().priority < self.current.config().priority {
                if options.queue {
                    self.queued = Some(state);
                }
                return None;
            }
        }

        self.accept(state, now, clips)
    }

    /// Опрос естественного завершения клипа. Вызывается каждый тик до
    /// вывода locomotion состояния.
    ///
    /// По завершении: queued state запускается мимо повторного гейта;
    /// иначе non-loop состояние без clamp возвращается в Idle.
    pub fn poll_finished(&mut self, now: f32, clips: &ClipLibrary) -> Option<Transition> {
        let ends = self.clip_ends?;
        if now < ends {
            return None;
        }
        self.clip_ends = None;

        if let Some(next) = self.queued.take() {
            return self.accept(next, now, clips);
        }

        let config = self.current.config();
        if !config.looped && !config.clamp_when_finished {
            return self.accept(AnimationState::Idle, now, clips);
        }

        None
    }

    /// Вывод состояния из locomotion сигналов, фиксированный порядок
    /// решения: jump → fall → sprint → walk → run → idle.
    ///
    /// Проходит через обычный гейт — активный non-loop (атака) локомоцией
    /// не прерывается.
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn update_from_movement(
        &mut self,
        is_moving: bool,
        is_sprinting: bool,
        is_walking: bool,
        is_grounded: bool,
        vertical_velocity: f32,
        now: f32,
        clips: &ClipLibrary,
    ) -> Option<Transition> {
        let desired = if !is_grounded && vertical_velocity > 0.5 {
            AnimationState::Jump
        } else if !is_grounded && vertical_velocity < -1.0 {
            AnimationState::Fall
        } else if is_grounded && is_moving && is_sprinting {
            AnimationState::Sprint
        } else if is_grounded && is_moving && is_walking {
            AnimationState::Walk
        } else if is_grounded && is_moving {
            AnimationState::Run
        } else {
            AnimationState::Idle
        };

        self.play(desired, PlayOptions::default(), now, clips)
    }

    fn accept(
        &mut self,
        state: AnimationState,
        now: f32,
        clips: &ClipLibrary,
    ) -> Option<Transition> {
        let Some(duration) = clips.duration(state) else {
            // Клип ещё не загружен (async race) — прежний state остаётся
            log_warning(&format!(
                "animation: клип '{}' отсутствует, остаёмся в '{}'",
                state.clip_name(),
                self.current.clip_name()
            ));
            return None;
        };

        let config = state.config();
        self.previous = self.current;
        self.current = state;
        self.transition_end = now + config.fade_in;

        if config.looped {
            self.locked_until = now;
            self.clip_ends = None;
        } else {
            let scaled = duration / config.time_scale;
            self.locked_until = now + scaled * LOCK_TAIL_RATIO;
            self.clip_ends = Some(now + scaled);
        }

        Some(Transition {
            from: self.previous,
            to: state,
            fade_in: config.fade_in,
            time_scale: config.time_scale,
        })
    }
}
