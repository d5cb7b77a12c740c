use std::rc::Rc;

use log::warn;

use super::allocator::DatumRef;
use super::script::{InstanceId, Script};
use super::{Player, ScriptError};

/// One place an event handler may live, in propagation order.
enum EventCandidate {
    Instance(InstanceId),
    Script(Rc<Script>),
}

/// Builds the propagation chain for a named event:
/// the frame script, sprite behaviors in channel order, the frame
/// behavior, then every movie script (main cast first, external casts in
/// load order).
fn global_event_candidates(player: &Player) -> Vec<EventCandidate> {
    let mut candidates = Vec::new();

    if let Some(span) = player.movie.score.get_script_in_frame(player.movie.current_frame) {
        if let Some(script_ref) = span.behavior {
            if let Some(script) = player.movie.cast_manager.get_script_by_ref(&script_ref) {
                candidates.push(EventCandidate::Script(script.clone()));
            }
        }
    }

    // Sprite behaviors in channel order, then the frame behavior.
    for instance_id in player.behavior_manager.instances_in_order() {
        candidates.push(EventCandidate::Instance(instance_id));
    }

    for script in player.movie.cast_manager.movie_scripts() {
        candidates.push(EventCandidate::Script(script));
    }

    candidates
}

fn run_candidate(
    player: &mut Player,
    candidate: &EventCandidate,
    event_name: &str,
    args: &[DatumRef],
) -> Option<Result<bool, ScriptError>> {
    match candidate {
        EventCandidate::Instance(instance_id) => {
            let script_ref = player.allocator.get_instance(*instance_id)?.script;
            let script = player.movie.cast_manager.get_script_by_ref(&script_ref)?.clone();
            if !script.has_handler(event_name) {
                return None;
            }
            Some(
                player
                    .call_handler_on_script(script, event_name, Some(*instance_id), args.to_vec())
                    .map(|result| result.passed),
            )
        }
        EventCandidate::Script(script) => {
            if !script.has_handler(event_name) {
                return None;
            }
            Some(
                player
                    .call_handler_on_script(script.clone(), event_name, None, args.to_vec())
                    .map(|result| result.passed),
            )
        }
    }
}

/// Dispatches `event_name` through the full propagation chain. Returns
/// true when some handler consumed the event. A handler that raises is
/// logged and treated as consumed; a handler that calls `pass` lets
/// propagation continue.
pub fn dispatch_global_event(
    player: &mut Player,
    event_name: &str,
    args: &[DatumRef],
) -> bool {
    player.enter_dispatch();
    let candidates = global_event_candidates(player);
    let handled = dispatch_to_candidates(player, &candidates, event_name, args);
    player.exit_dispatch();
    handled
}

/// Dispatches to an explicit list of behavior instances (a sprite's
/// attached behaviors), falling back to nothing when none handles it.
pub fn dispatch_event_to_instances(
    player: &mut Player,
    instance_ids: &[InstanceId],
    event_name: &str,
    args: &[DatumRef],
) -> bool {
    player.enter_dispatch();
    let candidates: Vec<EventCandidate> = instance_ids
        .iter()
        .map(|&id| EventCandidate::Instance(id))
        .collect();
    let handled = dispatch_to_candidates(player, &candidates, event_name, args);
    player.exit_dispatch();
    handled
}

fn dispatch_to_candidates(
    player: &mut Player,
    candidates: &[EventCandidate],
    event_name: &str,
    args: &[DatumRef],
) -> bool {
    for candidate in candidates {
        match run_candidate(player, candidate, event_name, args) {
            None => continue,
            Some(Ok(passed)) => {
                if !passed {
                    return true;
                }
                // The handler called `pass`: keep propagating.
            }
            Some(Err(err)) => {
                // Errors stop propagation; the handler counts as consumed.
                player.on_script_error(event_name, &err);
                return true;
            }
        }
    }
    false
}

/// Convenience wrapper used by builtins that send events to one sprite.
pub fn dispatch_sprite_event(
    player: &mut Player,
    sprite_number: i32,
    event_name: &str,
    args: &[DatumRef],
) -> bool {
    let instance_ids = match player.movie.score.get_sprite(sprite_number) {
        Some(sprite) => sprite.script_instance_list.clone(),
        None => {
            warn!("no sprite {sprite_number} to dispatch {event_name} to");
            return false;
        }
    };
    dispatch_event_to_instances(player, &instance_ids, event_name, args)
}
