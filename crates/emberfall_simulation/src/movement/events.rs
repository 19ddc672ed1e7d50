//! Movement events

use bevy::prelude::*;

/// Event: намерение прыгнуть.
///
/// Генерируется:
/// - edge-детектом `MovementInput.jump` (player)
/// - AI слоем напрямую
///
/// Обрабатывается `handle_jump_intents` после applyMovement того же тика.
#[derive(Event, Debug, Clone)]
pub struct JumpIntent {
    pub entity: Entity,
}

/// Event: телепорт персонажа.
///
/// Переставляет тело и обнуляет его скорость вместе с velocity пружиной;
/// rotation пружина и ориентация не трогаются.
#[derive(Event, Debug, Clone)]
pub struct TeleportIntent {
    pub entity: Entity,
    pub position: Vec3,
}

/// Event: переход falling → grounded (edge, не level).
///
/// Отправляется ровно один раз на тике приземления.
#[derive(Event, Debug, Clone)]
pub struct Landed {
    pub entity: Entity,
    /// Скорость удара о землю (m/s, положительная)
    pub impact_speed: f32,
}
