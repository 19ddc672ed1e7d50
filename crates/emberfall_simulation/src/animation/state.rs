//! Animation states + статическая конфигурация клипов.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Каталог анимационных состояний персонажа.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize,
)]
pub enum AnimationState {
    Idle,
    Walk,
    Run,
    Sprint,
    Jump,
    Fall,
    Land,
    Attack1,
    Attack2,
    Attack3,
    Skill,
    Hurt,
    Death,
    Dodge,
    Block,
}

/// Статическая конфигурация состояния.
///
/// `priority`: численно больший приоритет нельзя перебить меньшим
/// (атаку не прерывает локомоция). `clamp_when_finished`: non-loop клип
/// замирает на последнем кадре вместо авто-возврата в Idle (смерть).
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ClipConfig {
    pub looped: bool,
    pub priority: i32,
    pub fade_in: f32,
    pub clamp_when_finished: bool,
    pub time_scale: f32,
}

const fn looped(priority: i32, fade_in: f32) -> ClipConfig {
    ClipConfig {
        looped: true,
        priority,
        fade_in,
        clamp_when_finished: false,
        time_scale: 1.0,
    }
}

const fn one_shot(priority: i32, fade_in: f32) -> ClipConfig {
    ClipConfig {
        looped: false,
        priority,
        fade_in,
        clamp_when_finished: false,
        time_scale: 1.0,
    }
}

impl AnimationState {
    pub const ALL: [AnimationState; 15] = [
        AnimationState::Idle,
        AnimationState::Walk,
        AnimationState::Run,
        AnimationState::Sprint,
        AnimationState::Jump,
        AnimationState::Fall,
        AnimationState::Land,
        AnimationState::Attack1,
        AnimationState::Attack2,
        AnimationState::Attack3,
        AnimationState::Skill,
        AnimationState::Hurt,
        AnimationState::Death,
        AnimationState::Dodge,
        AnimationState::Block,
    ];

    /// Конфигурация состояния (exhaustive match — компилятор следит,
    /// что каталог и таблица не расходятся).
    ///
    /// Приоритеты: локомоция и воздушные состояния — 0 (свободно сменяют
    /// друг друга), block 1, dodge 2, атаки 3, skill 4, hurt 5, death 6.
    pub const fn config(self) -> ClipConfig {
        match self {
            AnimationState::Idle => looped(0, 0.2),
            AnimationState::Walk => looped(0, 0.2),
            AnimationState::Run => looped(0, 0.15),
            AnimationState::Sprint => looped(0, 0.15),
            AnimationState::Jump => one_shot(0, 0.1),
            AnimationState::Fall => looped(0, 0.2),
            AnimationState::Land => one_shot(0, 0.1),
            AnimationState::Block => looped(1, 0.1),
            AnimationState::Dodge => one_shot(2, 0.1),
            AnimationState::Attack1 => one_shot(3, 0.1),
            AnimationState::Attack2 => one_shot(3, 0.1),
            AnimationState::Attack3 => one_shot(3, 0.1),
            AnimationState::Skill => one_shot(4, 0.1),
            AnimationState::Hurt => one_shot(5, 0.05),
            AnimationState::Death => ClipConfig {
                looped: false,
                priority: 6,
                fade_in: 0.1,
                clamp_when_finished: true,
                time_scale: 1.0,
            },
        }
    }

    /// Имя клипа в библиотеке хоста (и в логах).
    pub const fn clip_name(self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Walk => "walk",
            AnimationState::Run => "run",
            AnimationState::Sprint => "sprint",
            AnimationState::Jump => "jump",
            AnimationState::Fall => "fall",
            AnimationState::Land => "land",
            AnimationState::Attack1 => "attack_1",
            AnimationState::Attack2 => "attack_2",
            AnimationState::Attack3 => "attack_3",
            AnimationState::Skill => "skill",
            AnimationState::Hurt => "hurt",
            AnimationState::Death => "death",
            AnimationState::Dodge => "dodge",
            AnimationState::Block => "block",
        }
    }
}

/// Длительности загруженных клипов (секунды, в масштабе time_scale = 1).
///
/// Заполняется хостом когда клипы персонажа доступны; до этого состояние
/// с отсутствующим клипом — warning + no-op (async loading race, не ошибка).
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipLibrary {
    durations: HashMap<AnimationState, f32>,
}

impl ClipLibrary {
    pub fn insert(&mut self, state: AnimationState, duration: f32) {
        self.durations.insert(state, duration);
    }

    pub fn duration(&self, state: AnimationState) -> Option<f32> {
        self.durations.get(&state).copied()
    }

    pub fn contains(&self, state: AnimationState) -> bool {
        self.durations.contains_key(&state)
    }

    /// Полная библиотека с плейсхолдер-длительностями (demo, тесты).
    pub fn with_default_durations() -> Self {
        let mut library = Self::default();
        for state in AnimationState::ALL {
            let duration = match state {
                AnimationState::Idle => 3.0,
                AnimationState::Walk | AnimationState::Run | AnimationState::Sprint => 1.0,
                AnimationState::Jump => 0.6,
                AnimationState::Fall => 1.2,
                AnimationState::Land => 0.4,
                AnimationState::Attack1 | AnimationState::Attack2 => 0.8,
                AnimationState::Attack3 => 1.1,
                AnimationState::Skill => 1.5,
                AnimationState::Hurt => 0.5,
                AnimationState::Death => 2.0,
                AnimationState::Dodge => 0.6,
                AnimationState::Block => 1.0,
            };
            library.insert(state, duration);
        }
        library
    }
}
