//! Spring simulators: сглаживание movement/rotation через mass-spring-damper.
//!
//! Используются контроллером персонажа:
//! - `SpringSimulator` (Vec3) — velocity smoothing (arcade velocity)
//! - `RelativeSpringSimulator` (угол) — поворот к orientation target
//!
//! Детерминизм: фиксированные внутренние подшаги (60 Hz) независимо от
//! вариаций кадрового dt, одинаковые входы ⇒ одинаковая траектория.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::logger::log_warning;

/// Internal integration rate (шагов на секунду симулируемого времени)
pub const SPRING_RATE: f32 = 60.0;

/// Spring tuning (mass/damping пары для velocity и rotation пружин)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SpringConfig {
    /// Инерция: больше mass — медленнее разгон к target
    pub mass: f32,
    /// Гашение скорости за подшаг (0..1, ближе к 1 — сильнее)
    pub damping: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 50.0,
            damping: 0.8,
        }
    }
}

/// Количество внутренних подшагов для кадрового dt.
///
/// dt разбивается на `round(dt * SPRING_RATE)` фиксированных шагов
/// (минимум 1), чтобы интеграция не разваливалась на нестабильном FPS.
fn substep_count(dt: f32) -> u32 {
    ((dt * SPRING_RATE).round() as i64).max(1) as u32
}

/// Пружинный интегратор для Vec3 (velocity smoothing).
///
/// За один подшаг:
/// `velocity += (target - position)/mass - damping*velocity; position += velocity`
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct SpringSimulator {
    pub position: Vec3,
    pub velocity: Vec3,
    pub target: Vec3,
    pub mass: f32,
    pub damping: f32,
}

impl Default for SpringSimulator {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl SpringSimulator {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            target: Vec3::ZERO,
            mass: config.mass,
            damping: config.damping,
        }
    }

    /// Сброс внутренней скорости пружины (position/target не трогаем).
    ///
    /// Вызывается на teleport, чтобы не тащить momentum в новую позицию.
    pub fn init(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    /// Полный сброс динамики в заданное значение (position == target == value).
    pub fn reset_to(&mut self, value: Vec3) {
        self.position = value;
        self.target = value;
        self.velocity = Vec3::ZERO;
    }

    /// Продвигает пружину на кадровый dt через фиксированные подшаги.
    ///
    /// NaN в target/dt отбрасывается с warning: испорченный spring state
    /// необратимо ломает движение entity, поэтому заражение недопустимо.
    pub fn simulate(&mut self, dt: f32) {
        if !dt.is_finite() || !self.target.is_finite() {
            log_warning(&format!(
                "SpringSimulator: non-finite input отброшен (dt={dt}, target={:?})",
                self.target
            ));
            return;
        }

        for _ in 0..substep_count(dt) {
            self.velocity += (self.target - self.position) / self.mass - self.damping * self.velocity;
            self.position += self.velocity;
        }
    }
}

/// Нормализация угла в (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    }
    if a > PI {
        a -= TAU;
    }
    a
}

/// Угловая пружина в relative режиме.
///
/// `position` — угол (радианы), после каждого подшага нормализуется в
/// (-π, π], чтобы накопленный поворот не "раскручивался" за пределы круга.
///
/// Relative контракт: перед simulate вызывается [`Self::begin_relative`] —
/// position обнуляется, target задаётся как остаточная ошибка поворота.
/// После simulate `position` равен угловой дельте этого кадра, а `velocity`
/// переживает кадры и даёт пружинную инерцию поворота.
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct RelativeSpringSimulator {
    pub position: f32,
    pub velocity: f32,
    pub target: f32,
    pub mass: f32,
    pub damping: f32,
}

impl Default for RelativeSpringSimulator {
    fn default() -> Self {
        Self::new(SpringConfig {
            mass: 10.0,
            damping: 0.5,
        })
    }
}

impl RelativeSpringSimulator {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            mass: config.mass,
            damping: config.damping,
        }
    }

    /// Сброс внутренней скорости (аналог [`SpringSimulator::init`]).
    pub fn init(&mut self) {
        self.velocity = 0.0;
    }

    /// Начало relative кадра: target — остаточный угол до цели.
    pub fn begin_relative(&mut self, remaining_angle: f32) {
        self.position = 0.0;
        self.target = wrap_angle(remaining_angle);
    }

    pub fn simulate(&mut self, dt: f32) {
        if !dt.is_finite() || !self.target.is_finite() {
            log_warning(&format!(
                "RelativeSpringSimulator: non-finite input отброшен (dt={dt}, target={})",
                self.target
            ));
            return;
        }

        for _ in 0..substep_count(dt) {
            self.velocity += (self.target - self.position) / self.mass - self.damping * self.velocity;
            self.position = wrap_angle(self.position + self.velocity);
        }
    }
}
