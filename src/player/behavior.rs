use super::cast_lib::CastMemberRef;
use super::score::Score;
use super::script::InstanceId;

/// A behavior reference the score attaches to a span, waiting to be
/// bound to a live instance when its frame loads.
#[derive(Clone)]
pub struct ScoreBehaviorRef {
    pub channel: u32,
    pub script: CastMemberRef,
}

/// Tracks the behavior instances bound for the current frame: the frame
/// behavior (channel 0) and per-sprite behaviors in channel order. The
/// player rebinds it on every frame load.
pub struct BehaviorManager {
    pub frame: u32,
    pub frame_behaviors: Vec<InstanceId>,
    pub sprite_behaviors: Vec<(u32, Vec<InstanceId>)>,
}

impl BehaviorManager {
    pub fn new() -> BehaviorManager {
        BehaviorManager {
            frame: 0,
            frame_behaviors: Vec::new(),
            sprite_behaviors: Vec::new(),
        }
    }

    /// The behavior references that need instantiation at `frame`,
    /// channel-ascending, channel 0 (the frame behavior) last of its
    /// kind.
    pub fn refs_for_frame(score: &Score, frame: u32) -> Vec<ScoreBehaviorRef> {
        let mut refs = Vec::new();
        for span in score.spans_at_frame(frame) {
            if let Some(script) = span.behavior {
                refs.push(ScoreBehaviorRef {
                    channel: span.channel,
                    script,
                });
            }
        }
        if let Some(span) = score.get_script_in_frame(frame) {
            if let Some(script) = span.behavior {
                refs.push(ScoreBehaviorRef { channel: 0, script });
            }
        }
        refs
    }

    /// All bound instances in dispatch order: sprites ascending by
    /// channel, then the frame behavior.
    pub fn instances_in_order(&self) -> Vec<InstanceId> {
        let mut out = Vec::new();
        for (_, instances) in &self.sprite_behaviors {
            out.extend(instances.iter().copied());
        }
        out.extend(self.frame_behaviors.iter().copied());
        out
    }

    pub fn instances_for_channel(&self, channel: u32) -> &[InstanceId] {
        self.sprite_behaviors
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, instances)| instances.as_slice())
            .unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.frame = 0;
        self.frame_behaviors.clear();
        self.sprite_behaviors.clear();
    }

    pub fn bind_sprite(&mut self, channel: u32, instances: Vec<InstanceId>) {
        self.sprite_behaviors.push((channel, instances));
        self.sprite_behaviors.sort_by_key(|(c, _)| *c);
    }
}

impl Default for BehaviorManager {
    fn default() -> Self {
        Self::new()
    }
}
