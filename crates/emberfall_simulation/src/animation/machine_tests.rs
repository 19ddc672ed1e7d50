//! Tests for AnimationStateMachine (гейты, lock, очередь, poll).

#[cfg(test)]
mod tests {
    use super::super::machine::*;
    use super::super::state::*;

    fn machine_with_clips() -> (AnimationStateMachine, ClipLibrary) {
        (
            AnimationStateMachine::default(),
            ClipLibrary::with_default_durations(),
        )
    }

    #[test]
    fn test_priority_lock_window() {
        let (mut machine, clips) = machine_with_clips();

        // Attack1: non-loop 0.8s, lock до 0.8 * 0.8 = 0.64
        let accepted = machine.play(AnimationState::Attack1, PlayOptions::default(), 0.0, &clips);
        assert!(accepted.is_some());
        assert!(machine.is_locked(0.3));

        // Внутри lock окна idle без force не проходит
        let denied = machine.play(AnimationState::Idle, PlayOptions::default(), 0.3, &clips);
        assert!(denied.is_none());
        assert_eq!(machine.current(), AnimationState::Attack1);

        // Force пробивает lock
        let forced = machine.play(AnimationState::Hurt, PlayOptions::forced(), 0.3, &clips);
        assert!(forced.is_some());
        assert_eq!(machine.current(), AnimationState::Hurt);
    }

    #[test]
    fn test_priority_gate_defers_lower() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Attack1, PlayOptions::default(), 0.0, &clips);
        // Lock кончился (0.64), клип ещё идёт (до 0.8): хвостовое окно
        let now = 0.7;
        assert!(!machine.is_locked(now));

        // Локомоция (priority 0) < атаки (3) — drop без queue
        let denied = machine.play(AnimationState::Run, PlayOptions::default(), now, &clips);
        assert!(denied.is_none());
        assert_eq!(machine.current(), AnimationState::Attack1);

        // Равный приоритет в хвосте проходит (attack chain)
        let chained = machine.play(AnimationState::Attack2, PlayOptions::default(), now, &clips);
        assert!(chained.is_some());
        assert_eq!(machine.current(), AnimationState::Attack2);
        assert_eq!(machine.previous(), AnimationState::Attack1);
    }

    #[test]
    fn test_same_state_is_noop() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Run, PlayOptions::default(), 0.0, &clips);
        let again = machine.play(AnimationState::Run, PlayOptions::default(), 0.1, &clips);
        assert!(again.is_none());

        // Force перезапускает даже тот же state
        let forced = machine.play(AnimationState::Run, PlayOptions::forced(), 0.2, &clips);
        assert!(forced.is_some());
    }

    #[test]
    fn test_queue_last_wins() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Attack1, PlayOptions::default(), 0.0, &clips);

        // Два queued запроса в lock окне: второй затирает первый
        machine.play(AnimationState::Attack2, PlayOptions::queued(), 0.1, &clips);
        machine.play(AnimationState::Attack3, PlayOptions::queued(), 0.2, &clips);
        assert_eq!(machine.queued_state(), Some(AnimationState::Attack3));

        // До конца клипа queued не стартует
        assert!(machine.poll_finished(0.5, &clips).is_none());

        // На завершении (0.8) queued запускается мимо гейта
        let fired = machine.poll_finished(0.85, &clips).expect("queued должен сыграть");
        assert_eq!(fired.to, AnimationState::Attack3);
        assert_eq!(machine.current(), AnimationState::Attack3);
        assert_eq!(machine.queued_state(), None);
    }

    #[test]
    fn test_nonloop_auto_returns_to_idle() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Land, PlayOptions::default(), 0.0, &clips);
        // Land 0.4s
        let finished = machine.poll_finished(0.45, &clips).expect("авто-возврат");
        assert_eq!(finished.to, AnimationState::Idle);
    }

    #[test]
    fn test_clamp_when_finished_holds_pose() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Death, PlayOptions::forced(), 0.0, &clips);
        // Death (clamp) замирает на последнем кадре, в Idle не возвращается
        assert!(machine.poll_finished(5.0, &clips).is_none());
        assert_eq!(machine.current(), AnimationState::Death);
    }

    #[test]
    fn test_missing_clip_keeps_previous_state() {
        let mut machine = AnimationStateMachine::default();
        let mut clips = ClipLibrary::default();
        clips.insert(AnimationState::Idle, 3.0);
        assert!(clips.contains(AnimationState::Idle));
        assert!(!clips.contains(AnimationState::Run));

        // Run не загружен: warning + no-op
        let denied = machine.play(AnimationState::Run, PlayOptions::default(), 0.0, &clips);
        assert!(denied.is_none());
        assert_eq!(machine.current(), AnimationState::Idle);
    }

    #[test]
    fn test_update_from_movement_decision_order() {
        let (mut machine, clips) = machine_with_clips();
        let mut now = 0.0;
        let drive = |machine: &mut AnimationStateMachine,
                         moving: bool,
                         sprint: bool,
                         walk: bool,
                         grounded: bool,
                         vy: f32,
                         now: f32| {
            machine.update_from_movement(moving, sprint, walk, grounded, vy, now, &clips)
        };

        // airborne rising → Jump (jump побеждает даже при sprint флаге)
        drive(&mut machine, true, true, false, false, 2.0, now);
        assert_eq!(machine.current(), AnimationState::Jump);

        // airborne falling → Fall
        now += 1.0;
        drive(&mut machine, true, true, false, false, -3.0, now);
        assert_eq!(machine.current(), AnimationState::Fall);

        // grounded + moving + sprint → Sprint
        now += 1.0;
        drive(&mut machine, true, true, false, true, 0.0, now);
        assert_eq!(machine.current(), AnimationState::Sprint);

        // grounded + moving + walk → Walk
        now += 1.0;
        drive(&mut machine, true, false, true, true, 0.0, now);
        assert_eq!(machine.current(), AnimationState::Walk);

        // grounded + moving → Run
        now += 1.0;
        drive(&mut machine, true, false, false, true, 0.0, now);
        assert_eq!(machine.current(), AnimationState::Run);

        // стоим → Idle
        now += 1.0;
        drive(&mut machine, false, false, false, true, 0.0, now);
        assert_eq!(machine.current(), AnimationState::Idle);
    }

    #[test]
    fn test_locomotion_does_not_interrupt_attack() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Attack1, PlayOptions::default(), 0.0, &clips);

        // Весь клип локомоция отбивается (lock, затем priority gate)
        for step in 1..8 {
            let now = step as f32 * 0.1;
            machine.update_from_movement(true, false, false, true, 0.0, now, &clips);
            if now < 0.8 {
                assert_eq!(machine.current(), AnimationState::Attack1, "now={now}");
            }
        }

        // После естественного конца — авто-Idle, затем локомоция свободна
        machine.poll_finished(0.85, &clips);
        assert_eq!(machine.current(), AnimationState::Idle);
        machine.update_from_movement(true, false, false, true, 0.0, 0.9, &clips);
        assert_eq!(machine.current(), AnimationState::Run);
    }

    #[test]
    fn test_transition_window() {
        let (mut machine, clips) = machine_with_clips();

        machine.play(AnimationState::Run, PlayOptions::default(), 1.0, &clips);
        // Run fade_in 0.15
        assert!(machine.is_transitioning(1.1));
        assert!(!machine.is_transitioning(1.2));
    }
}
