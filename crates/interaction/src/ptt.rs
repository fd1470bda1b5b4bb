//! Push-to-talk bound to alt-click when the pointer is off every overlay.

use crate::config::PushToTalkConfig;
use crate::custom::{CustomInteractionFn, InteractionArgs, InteractionResult};
use raydesk_input::Hand;
use std::process::{Child, Command};
use tracing::{debug, warn};

/// Build a push-to-talk handler for `hand` that runs the configured commands.
pub fn push_to_talk(hand: Hand, config: &PushToTalkConfig) -> CustomInteractionFn {
    let down = config.down_cmd.clone();
    let up = config.up_cmd.clone();
    let mut down_launcher = CommandLauncher::default();
    let mut up_launcher = CommandLauncher::default();
    push_to_talk_with(
        hand,
        move || down_launcher.launch(down.as_deref()),
        move || up_launcher.launch(up.as_deref()),
    )
}

/// Build a push-to-talk handler with arbitrary press/release actions.
///
/// Claims every event from `hand` so no other handler sees it.
pub fn push_to_talk_with(
    hand: Hand,
    mut on_press: impl FnMut() + Send + 'static,
    mut on_release: impl FnMut() + Send + 'static,
) -> CustomInteractionFn {
    Box::new(move |args: &InteractionArgs| {
        if args.hand != hand {
            return InteractionResult::Unhandled;
        }

        if args.now.alt_click && !args.before.alt_click {
            on_press();
        } else if !args.now.alt_click && args.before.alt_click {
            on_release();
        }
        InteractionResult::HANDLED
    })
}

/// Starts commands and collects the exit status of those that finished.
#[derive(Debug, Default)]
struct CommandLauncher {
    running: Vec<Child>,
}

impl CommandLauncher {
    fn launch(&mut self, argv: Option<&[String]>) {
        self.reap();
        let Some((program, rest)) = argv.and_then(|argv| argv.split_first()) else {
            return;
        };

        match Command::new(program).args(rest).spawn() {
            Ok(child) => {
                debug!(program = %program, pid = child.id(), "Push-to-talk command started");
                self.running.push(child);
            }
            Err(err) => warn!(program = %program, %err, "Push-to-talk command failed to start"),
        }
    }

    /// Wait on exited children. Returns how many are still running.
    fn reap(&mut self) -> usize {
        self.running.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "Push-to-talk command exited");
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!(pid = child.id(), %err, "Lost track of push-to-talk command");
                false
            }
        });
        self.running.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Affine3A;
    use raydesk_input::{InputState, PointerMode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn args(hand: Hand, now: bool, before: bool) -> InteractionArgs {
        InteractionArgs {
            hand,
            mode: PointerMode::Left,
            transform: Affine3A::IDENTITY,
            now: InputState {
                alt_click: now,
                ..Default::default()
            },
            before: InputState {
                alt_click: before,
                ..Default::default()
            },
        }
    }

    #[test]
    fn press_and_release_fire_once_each() {
        let presses = Arc::new(AtomicUsize::new(0));
        let releases = Arc::new(AtomicUsize::new(0));
        let (p, r) = (Arc::clone(&presses), Arc::clone(&releases));
        let mut ptt = push_to_talk_with(
            Hand::Right,
            move || {
                p.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                r.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert!(ptt(&args(Hand::Right, true, false)).is_handled());
        assert!(ptt(&args(Hand::Right, true, true)).is_handled());
        assert!(ptt(&args(Hand::Right, false, true)).is_handled());
        assert_eq!(presses.load(Ordering::SeqCst), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn other_hand_is_ignored() {
        let mut ptt = push_to_talk_with(Hand::Left, || {}, || {});
        assert_eq!(
            ptt(&args(Hand::Right, true, false)),
            InteractionResult::Unhandled
        );
    }

    #[test]
    fn missing_command_is_a_no_op() {
        let mut ptt = push_to_talk(Hand::Left, &PushToTalkConfig::default());
        assert!(ptt(&args(Hand::Left, true, false)).is_handled());
    }

    #[test]
    fn unknown_program_is_not_tracked() {
        let mut launcher = CommandLauncher::default();
        launcher.launch(Some(["raydesk-no-such-program".to_string()].as_slice()));
        assert_eq!(launcher.reap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn finished_commands_are_reaped() {
        use std::time::{Duration, Instant};

        let mut launcher = CommandLauncher::default();
        launcher.launch(Some(["true".to_string()].as_slice()));
        launcher.launch(Some(["true".to_string()].as_slice()));
        assert!(launcher.running.len() <= 2);

        let deadline = Instant::now() + Duration::from_secs(10);
        while launcher.reap() > 0 {
            assert!(Instant::now() < deadline, "children were never reaped");
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(launcher.running.is_empty());
    }
}
